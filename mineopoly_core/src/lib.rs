use serde::{Deserialize, Serialize};

pub mod agent;
pub mod board;
pub mod economy;
pub mod environment;
pub mod map;
pub mod navigation;

/// Unique identifier for entities (items on the ground, players).
pub type EntityId = usize;

/// Represents a 2D board coordinate.
///
/// The origin is the bottom-left tile; `x` grows to the right and `y` grows upward.
/// Coordinates are signed so that neighbors of edge tiles can be expressed
/// and then rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Like [`Coordinate::offset`], but `None` when the result leaves the `i32` range.
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
}

/// Kinds of minable resources, cheapest and most plentiful first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Ruby,
    Emerald,
    Diamond,
}

impl ResourceKind {
    /// Every resource kind, in generation order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Ruby,
        ResourceKind::Emerald,
        ResourceKind::Diamond,
    ];

    /// Fraction of all board tiles that should hold a deposit of this kind.
    pub fn spawn_count_ratio(self) -> f64 {
        match self {
            ResourceKind::Ruby => 0.06,
            ResourceKind::Emerald => 0.04,
            ResourceKind::Diamond => 0.02,
        }
    }

    /// Inner edge of this kind's ring, as a fraction of half the board size.
    pub fn min_spawn_radius_ratio(self) -> f64 {
        match self {
            ResourceKind::Ruby => 0.0,
            ResourceKind::Emerald => 0.4,
            ResourceKind::Diamond => 0.7,
        }
    }

    /// Outer edge of this kind's ring, as a fraction of half the board size.
    pub fn max_spawn_radius_ratio(self) -> f64 {
        match self {
            ResourceKind::Ruby => 0.5,
            ResourceKind::Emerald => 0.8,
            ResourceKind::Diamond => 1.0,
        }
    }

    /// Number of consecutive `Mine` actions needed to break a deposit.
    pub fn turns_to_mine(self) -> u32 {
        match self {
            ResourceKind::Ruby => 1,
            ResourceKind::Emerald => 2,
            ResourceKind::Diamond => 3,
        }
    }
}

/// A mined resource, either lying on the ground or carried by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: EntityId,
    pub kind: ResourceKind,
}
