use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinate ({x}, {y}) is out of bounds for grid size {size}")]
    OutOfBounds { x: i32, y: i32, size: usize },
}

/// A generic square 2D grid structure.
///
/// Cells are stored in a flat vector, one row after another, with the *top*
/// row first. A coordinate's `y` therefore maps to storage row `size - 1 - y`,
/// which keeps `(0, 0)` at the bottom-left corner so that moving up increases `y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new `size` x `size` grid filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `size * size` overflows `usize`.
    pub fn new(size: usize) -> Self
    where
        T: Default + Clone,
    {
        let len = size.checked_mul(size).expect("Grid size overflow");
        Grid {
            size,
            cells: vec![T::default(); len],
        }
    }

    /// Returns the side length of the grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    fn storage_to_coordinate(size: usize, row: usize, column: usize) -> Coordinate {
        Coordinate::new(column as i32, (size - 1 - row) as i32)
    }

    /// Converts a board coordinate to a flat vector index.
    ///
    /// Returns `None` if the coordinate is out of bounds.
    #[inline]
    pub fn coords_to_index(&self, location: Coordinate) -> Option<usize> {
        if self.is_valid(location) {
            let row = self.size - 1 - location.y as usize;
            Some(row * self.size + location.x as usize)
        } else {
            None
        }
    }

    /// Checks if the given coordinate lies on the grid.
    #[inline]
    pub fn is_valid(&self, location: Coordinate) -> bool {
        let size = self.size as i64;
        (0..size).contains(&i64::from(location.x)) && (0..size).contains(&i64::from(location.y))
    }

    /// Gets an immutable reference to the cell at the given coordinate.
    pub fn get(&self, location: Coordinate) -> Option<&T> {
        let index = self.coords_to_index(location)?;
        self.cells.get(index)
    }

    /// Sets the value of the cell at the given coordinate.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the coordinate is off the grid.
    pub fn set(&mut self, location: Coordinate, value: T) -> Result<(), GridError> {
        let index = self.coords_to_index(location).ok_or(GridError::OutOfBounds {
            x: location.x,
            y: location.y,
            size: self.size,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator over the cells in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator that yields `(coordinate, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Coordinate, &T)> {
        let size = self.size;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Self::storage_to_coordinate(size, index / size, index % size),
                cell,
            )
        })
    }

    /// Returns the rows of the grid, top row (highest `y`) first.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.size.max(1))
    }
}

impl<T> Index<Coordinate> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, location: Coordinate) -> &Self::Output {
        match self.coords_to_index(location) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size {}",
                location, self.size
            ),
        }
    }
}

impl<T> IndexMut<Coordinate> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, location: Coordinate) -> &mut Self::Output {
        let size = self.size;
        match self.coords_to_index(location) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size {}",
                location, size
            ),
        }
    }
}
