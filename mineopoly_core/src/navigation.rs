//! Pure helpers for reasoning about locations on the board.

use std::collections::{BTreeMap, HashMap};

use crate::{
    Coordinate, InventoryItem, PlayerColor,
    agent::Action,
    board::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, MarketLayout, TileKind},
};

/// Inputs the navigation helpers refuse to work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Coordinate {0} has a neighbor outside the coordinate range")]
    OutOfRange(Coordinate),
    #[error("Path from {start} to {destination} does not fit the coordinate range")]
    PathOverflow {
        start: Coordinate,
        destination: Coordinate,
    },
    #[error("Half board size {0} does not describe a valid board")]
    InvalidHalfBoardSize(i32),
}

/// Returns the four neighbors of `point` in the fixed order
/// `[(x + 1, y), (x - 1, y), (x, y - 1), (x, y + 1)]`.
///
/// Callers pair these positionally with other four-element sequences, so the
/// order is part of the contract.
pub fn adjacent_points(point: Coordinate) -> Result<[Coordinate; 4], NavigationError> {
    let step = |dx, dy| {
        point
            .checked_offset(dx, dy)
            .ok_or(NavigationError::OutOfRange(point))
    };
    Ok([step(1, 0)?, step(-1, 0)?, step(0, -1)?, step(0, 1)?])
}

/// Builds the canonical Manhattan path from `start` to `destination`:
/// every horizontal step first, then every vertical step.
pub fn path_to(
    start: Coordinate,
    destination: Coordinate,
) -> Result<Vec<Action>, NavigationError> {
    let overflow = || NavigationError::PathOverflow { start, destination };
    let horizontal = destination.x.checked_sub(start.x).ok_or_else(overflow)?;
    let vertical = destination.y.checked_sub(start.y).ok_or_else(overflow)?;

    let horizontal_action = if horizontal < 0 {
        Action::MoveLeft
    } else {
        Action::MoveRight
    };
    let vertical_action = if vertical < 0 {
        Action::MoveDown
    } else {
        Action::MoveUp
    };

    Ok(
        std::iter::repeat_n(horizontal_action, horizontal.unsigned_abs() as usize)
            .chain(std::iter::repeat_n(
                vertical_action,
                vertical.unsigned_abs() as usize,
            ))
            .collect(),
    )
}

/// Picks one of `color`'s two markets with a quadrant test rather than a true distance.
///
/// Red goes to its lower market only when strictly below and left of the upper one.
/// Blue goes to its upper market when at or left of it and at or above it.
/// `half_board_size` must be half of a size the board generator accepts.
pub fn find_nearest_market(
    location: Coordinate,
    color: PlayerColor,
    half_board_size: i32,
) -> Result<Coordinate, NavigationError> {
    let valid = (MIN_BOARD_SIZE / 2) as i32..=(MAX_BOARD_SIZE / 2) as i32;
    if !valid.contains(&half_board_size) {
        return Err(NavigationError::InvalidHalfBoardSize(half_board_size));
    }
    Ok(nearest_market_in(
        &MarketLayout::new(half_board_size),
        location,
        color,
    ))
}

/// Same as [`find_nearest_market`] against an already computed layout.
pub fn nearest_market_in(
    markets: &MarketLayout,
    location: Coordinate,
    color: PlayerColor,
) -> Coordinate {
    let (lower, upper) = markets.for_player(color);
    match color {
        PlayerColor::Red => {
            if location.x < upper.x && location.y < upper.y {
                lower
            } else {
                upper
            }
        }
        PlayerColor::Blue => {
            if location.x <= upper.x && location.y >= upper.y {
                upper
            } else {
                lower
            }
        }
    }
}

/// Orders `points` by path length from `start`, shortest first.
///
/// Points with equal path length keep their input order.
pub fn sort_by_path_distance(
    points: &[Coordinate],
    start: Coordinate,
) -> Result<Vec<Coordinate>, NavigationError> {
    let mut by_length: BTreeMap<usize, Vec<Coordinate>> = BTreeMap::new();
    for &destination in points {
        let length = path_to(start, destination)?.len();
        by_length.entry(length).or_default().push(destination);
    }
    Ok(by_length.into_values().flatten().collect())
}

/// True if any of `points` is one of `targets`.
pub fn is_adjacent_to_any(points: &[Coordinate], targets: &[Coordinate]) -> bool {
    points.iter().any(|point| targets.contains(point))
}

/// Returns `other_player` if it occupies one of `adjacent`.
pub fn unavailable_adjacent_tile(
    adjacent: &[Coordinate],
    other_player: Coordinate,
) -> Option<Coordinate> {
    adjacent.contains(&other_player).then_some(other_player)
}

/// True if some item on the ground lies at `location`.
pub fn can_pick_up_here(
    location: Coordinate,
    items_on_ground: &HashMap<InventoryItem, Coordinate>,
) -> bool {
    items_on_ground.values().any(|&item_location| item_location == location)
}

/// Only resource deposits can be mined.
pub fn is_minable_tile(tile: TileKind) -> bool {
    matches!(tile, TileKind::Resource { .. })
}
