use std::{f64::consts::TAU, fmt};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Coordinate, PlayerColor, ResourceKind, map::Grid};

/// Smallest board the generator accepts.
pub const MIN_BOARD_SIZE: usize = 10;

/// Largest board the generator accepts.
pub const MAX_BOARD_SIZE: usize = 4096;

/// Half of `board_size` when it is an even size within the accepted range.
pub fn half_board_size(board_size: usize) -> Option<i32> {
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) || board_size % 2 != 0 {
        return None;
    }
    i32::try_from(board_size / 2).ok()
}

/// Represents the static type of a tile on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Market {
        owner: PlayerColor,
    },
    Resource {
        kind: ResourceKind,
    },
}

/// Errors raised when a board cannot be generated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    #[error("Board size {0} is invalid: it must be even and between 10 and 4096")]
    InvalidBoardSize(usize),
    #[error("Random resource chance {0} must lie within [0, 1]")]
    InvalidResourceChance(f32),
}

/// The four market tiles around the board center.
///
/// Red owns the lower-left and upper-right cells, blue owns the other diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLayout {
    pub red_lower: Coordinate,
    pub red_upper: Coordinate,
    pub blue_lower: Coordinate,
    pub blue_upper: Coordinate,
}

impl MarketLayout {
    pub fn new(half_board_size: i32) -> Self {
        let h = half_board_size;
        Self {
            red_lower: Coordinate::new(h - 1, h - 1),
            red_upper: Coordinate::new(h, h),
            blue_lower: Coordinate::new(h, h - 1),
            blue_upper: Coordinate::new(h - 1, h),
        }
    }

    /// Returns `(lower, upper)` for the given player.
    pub fn for_player(&self, color: PlayerColor) -> (Coordinate, Coordinate) {
        match color {
            PlayerColor::Red => (self.red_lower, self.red_upper),
            PlayerColor::Blue => (self.blue_lower, self.blue_upper),
        }
    }

    /// Every market cell paired with its owner.
    pub fn all(&self) -> [(Coordinate, PlayerColor); 4] {
        [
            (self.red_lower, PlayerColor::Red),
            (self.red_upper, PlayerColor::Red),
            (self.blue_lower, PlayerColor::Blue),
            (self.blue_upper, PlayerColor::Blue),
        ]
    }
}

/// A generated Mineopoly board: the tile grid plus each player's start location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Grid<TileKind>,
    half_size: i32,
    markets: MarketLayout,
}

impl Board {
    fn empty(size: usize, half_size: i32) -> Self {
        Board {
            tiles: Grid::new(size),
            half_size,
            markets: MarketLayout::new(half_size),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.tiles.size()
    }

    /// Half the side length; the markets sit around `(half_size, half_size)`.
    #[inline]
    pub fn half_size(&self) -> i32 {
        self.half_size
    }

    /// Returns the tile at `location`, or `None` when it is off the board.
    pub fn tile_at(&self, location: Coordinate) -> Option<TileKind> {
        self.tiles.get(location).copied()
    }

    pub fn tiles(&self) -> &Grid<TileKind> {
        &self.tiles
    }

    pub fn markets(&self) -> &MarketLayout {
        &self.markets
    }

    /// Each player starts on their own lower market.
    pub fn start_location(&self, color: PlayerColor) -> Coordinate {
        self.markets.for_player(color).0
    }

    /// Replaces the tile at `location`. Used by the match harness once a deposit is mined out.
    pub(crate) fn set_tile(
        &mut self,
        location: Coordinate,
        tile: TileKind,
    ) -> Result<(), crate::map::GridError> {
        self.tiles.set(location, tile)
    }

    /// Counts the tiles satisfying `predicate`.
    pub fn count_tiles(&self, predicate: impl Fn(&TileKind) -> bool) -> usize {
        self.tiles.iter().filter(|tile| predicate(tile)).count()
    }
}

/// Renders the board top row first: `.` empty, `R`/`B` markets, `r`/`e`/`d` deposits.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.rows() {
            let line: String = row
                .iter()
                .map(|tile| match tile {
                    TileKind::Empty => '.',
                    TileKind::Market {
                        owner: PlayerColor::Red,
                    } => 'R',
                    TileKind::Market {
                        owner: PlayerColor::Blue,
                    } => 'B',
                    TileKind::Resource {
                        kind: ResourceKind::Ruby,
                    } => 'r',
                    TileKind::Resource {
                        kind: ResourceKind::Emerald,
                    } => 'e',
                    TileKind::Resource {
                        kind: ResourceKind::Diamond,
                    } => 'd',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Tunables for resource placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Probability that a deposit is swapped for a uniformly chosen kind.
    pub random_resource_chance: f32,
    /// Sampling attempts per deposit before the deposit is skipped.
    pub max_placement_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            random_resource_chance: 0.2,
            max_placement_attempts: 50,
        }
    }
}

/// Builds boards from a seed. The same seed and size always yield the same board.
#[derive(Debug)]
pub struct BoardGenerator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl BoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(seed: u64, config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let chance = config.random_resource_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(GeneratorError::InvalidResourceChance(chance));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        })
    }

    /// Generates a board by laying down empty tiles, the four markets, and then the resource rings.
    pub fn generate_board(&mut self, board_size: usize) -> Result<Board, GeneratorError> {
        let half_size =
            half_board_size(board_size).ok_or(GeneratorError::InvalidBoardSize(board_size))?;

        let mut board = Board::empty(board_size, half_size);
        for (location, owner) in board.markets.all() {
            board.tiles[location] = TileKind::Market { owner };
        }
        self.generate_resources(&mut board);
        Ok(board)
    }

    fn generate_resources(&mut self, board: &mut Board) {
        let size = board.size();
        let num_tiles = (size * size) as f64;
        let half_board_size = f64::from(board.half_size());

        for kind in ResourceKind::ALL {
            let target = (num_tiles * kind.spawn_count_ratio()).round() as usize;
            let min_radius = half_board_size * kind.min_spawn_radius_ratio();
            let max_radius = half_board_size * kind.max_spawn_radius_ratio();

            let mut skipped = 0usize;
            for _ in 0..target {
                let Some(location) = self.find_empty_location(board, min_radius, max_radius)
                else {
                    skipped += 1;
                    continue;
                };

                // Rarely spawn a deposit of another kind inside this ring
                let mut spawned = kind;
                if self.rng.random::<f32>() <= self.config.random_resource_chance {
                    spawned = ResourceKind::ALL[self.rng.random_range(0..ResourceKind::ALL.len())];
                }
                board.tiles[location] = TileKind::Resource { kind: spawned };
            }

            debug!(?kind, target, skipped, "placed resource ring");
        }
    }

    /// Samples points in the ring `[min_radius, max_radius)` around the center
    /// until one lands on an empty tile or the attempt budget runs out.
    fn find_empty_location(
        &mut self,
        board: &Board,
        min_radius: f64,
        max_radius: f64,
    ) -> Option<Coordinate> {
        let half_board_size = board.half_size();
        for _ in 0..self.config.max_placement_attempts {
            let angle = self.rng.random::<f64>() * TAU;
            let radius = self.rng.random::<f64>() * (max_radius - min_radius) + min_radius;
            let candidate = Coordinate::new(
                (radius * angle.cos()) as i32 + half_board_size,
                (radius * angle.sin()) as i32 + half_board_size,
            );
            if board.tile_at(candidate) == Some(TileKind::Empty) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Generates a board of `board_size` from `seed` using the default configuration.
pub fn generate(seed: u64, board_size: usize) -> Result<Board, GeneratorError> {
    BoardGenerator::new(seed).generate_board(board_size)
}
