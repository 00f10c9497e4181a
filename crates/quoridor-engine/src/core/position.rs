use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the board, addressed by row (top to bottom) and column (left to right).
///
/// Ordering is row-major, which is what keeps destination lists deterministic.
///
/// On the wire a position is encoded as a pair, `{ "first": row, "second": col }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "first")]
    pub row: usize,
    #[serde(rename = "second")]
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the neighboring cell in `direction`, or `None` when it would leave
    /// a `size`×`size` board.
    #[must_use]
    pub fn step(self, direction: Direction, size: usize) -> Option<Self> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Right => (self.row, self.col + 1),
        };
        (row < size && col < size).then_some(Self { row, col })
    }

    #[must_use]
    pub fn is_within(self, size: usize) -> bool {
        self.row < size && self.col < size
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four orthogonal directions a piece can travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The two directions at right angles to this one.
    ///
    /// Used to resolve deflection jumps when a straight jump is unavailable.
    #[must_use]
    pub const fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::Up | Self::Down => [Self::Left, Self::Right],
            Self::Left | Self::Right => [Self::Up, Self::Down],
        }
    }

    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}
