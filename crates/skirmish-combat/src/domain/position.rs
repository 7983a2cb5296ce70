//! Grid coordinates, compass directions, and Chebyshev distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable cell coordinate on a combat grid.
///
/// Coordinates are signed so that neighbours of edge cells can be expressed
/// and then rejected by the grid's bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column, growing east.
    pub x: i32,
    /// Row, growing south.
    pub y: i32,
}

impl GridPosition {
    /// The top-left cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Creates a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`. Diagonal steps cost the same
    /// as orthogonal ones.
    #[must_use]
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    /// True when `other` is one of the eight surrounding cells.
    #[must_use]
    pub fn is_adjacent_to(self, other: Self) -> bool {
        self.distance_to(other) == 1
    }

    /// Returns the position shifted by `(dx, dy)`, saturating at the
    /// coordinate limits.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Returns the neighbouring position in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// All eight neighbouring positions, unclipped, in compass order
    /// starting from north.
    #[must_use]
    pub fn neighbors(self) -> [Self; 8] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

impl Default for GridPosition {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The eight compass directions a combatant can step in. North is `-y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up the grid, `-y`.
    North,
    /// `+x, -y`.
    NorthEast,
    /// Right, `+x`.
    East,
    /// `+x, +y`.
    SouthEast,
    /// Down the grid, `+y`.
    South,
    /// `-x, +y`.
    SouthWest,
    /// Left, `-x`.
    West,
    /// `-x, -y`.
    NorthWest,
}

impl Direction {
    /// Every direction, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The `(dx, dy)` step for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Parses player input such as `"north"`, `"ne"` or `"South-West"`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "n" | "north" | "up" => Some(Self::North),
            "ne" | "northeast" => Some(Self::NorthEast),
            "e" | "east" | "right" => Some(Self::East),
            "se" | "southeast" => Some(Self::SouthEast),
            "s" | "south" | "down" => Some(Self::South),
            "sw" | "southwest" => Some(Self::SouthWest),
            "w" | "west" | "left" => Some(Self::West),
            "nw" | "northwest" => Some(Self::NorthWest),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
        };
        f.write_str(name)
    }
}
