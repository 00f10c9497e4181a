use serde::{Deserialize, Serialize};

use crate::OutOfBoundsError;

use super::position::Position;

/// State of one wall intersection.
///
/// A non-empty intersection anchors a wall two cells long whose top-left corner
/// touches the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intersection {
    #[default]
    Empty,
    Vertical,
    Horizontal,
}

impl Intersection {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Orientation {
    /// Blocks vertical travel across two columns.
    #[display("horizontal")]
    Horizontal,
    /// Blocks horizontal travel across two rows.
    #[display("vertical")]
    Vertical,
}

impl Orientation {
    #[must_use]
    pub const fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

impl From<Orientation> for Intersection {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::Horizontal,
            Orientation::Vertical => Self::Vertical,
        }
    }
}

/// A wall anchored at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{orientation} wall at {anchor}")]
pub struct WallPlacement {
    pub anchor: Position,
    pub orientation: Orientation,
}

impl WallPlacement {
    #[must_use]
    pub const fn new(anchor: Position, orientation: Orientation) -> Self {
        Self {
            anchor,
            orientation,
        }
    }

    #[must_use]
    pub const fn horizontal(row: usize, col: usize) -> Self {
        Self::new(Position::new(row, col), Orientation::Horizontal)
    }

    #[must_use]
    pub const fn vertical(row: usize, col: usize) -> Self {
        Self::new(Position::new(row, col), Orientation::Vertical)
    }
}

/// The `(size-1)×(size-1)` grid of wall intersections of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallGrid {
    span: usize,
    cells: Vec<Intersection>,
}

impl WallGrid {
    /// Creates an empty grid for a board with `board_size` cells per side.
    #[must_use]
    pub fn new(board_size: usize) -> Self {
        let span = board_size.saturating_sub(1);
        Self {
            span,
            cells: vec![Intersection::Empty; span * span],
        }
    }

    /// Builds a grid from row-major nested rows.
    ///
    /// Returns `None` unless the rows form a square.
    #[must_use]
    pub fn from_rows(rows: &[Vec<Intersection>]) -> Option<Self> {
        let span = rows.len();
        if rows.iter().any(|row| row.len() != span) {
            return None;
        }
        Some(Self {
            span,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    /// Number of intersections per side.
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Intersection]> {
        self.cells.chunks(self.span.max(1)).take(self.span)
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<Intersection>> {
        self.rows().map(<[Intersection]>::to_vec).collect()
    }

    /// Returns the intersection at `at`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, at: Position) -> Option<Intersection> {
        self.index(at).map(|i| self.cells[i])
    }

    pub fn set(&mut self, at: Position, value: Intersection) -> Result<(), OutOfBoundsError> {
        let i = self.index(at).ok_or(OutOfBoundsError {
            row: at.row,
            col: at.col,
            limit: self.span,
        })?;
        self.cells[i] = value;
        Ok(())
    }

    /// Number of walls anchored on the grid.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Checks whether `placement` collides with walls already on the grid.
    ///
    /// A placement collides when its anchor is out of range or already holds a
    /// wall, or when the neighbor one step along the wall's own axis holds a wall
    /// of the same orientation (the two would overlap by one cell).
    #[must_use]
    pub fn collides(&self, placement: WallPlacement) -> bool {
        let WallPlacement {
            anchor,
            orientation,
        } = placement;
        match self.get(anchor) {
            Some(Intersection::Empty) => {}
            Some(_) | None => return true,
        }
        let same = Intersection::from(orientation);
        let (before, after) = match orientation {
            Orientation::Horizontal => (
                anchor.col.checked_sub(1).map(|c| Position::new(anchor.row, c)),
                Position::new(anchor.row, anchor.col + 1),
            ),
            Orientation::Vertical => (
                anchor.row.checked_sub(1).map(|r| Position::new(r, anchor.col)),
                Position::new(anchor.row + 1, anchor.col),
            ),
        };
        before.and_then(|p| self.get(p)) == Some(same) || self.get(after) == Some(same)
    }

    fn index(&self, at: Position) -> Option<usize> {
        (at.row < self.span && at.col < self.span).then(|| at.row * self.span + at.col)
    }
}
