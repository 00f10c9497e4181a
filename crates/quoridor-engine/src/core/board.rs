use crate::OutOfBoundsError;

use super::{
    position::{Direction, Position},
    wall::{Intersection, Orientation, WallGrid, WallPlacement},
};

/// Spatial state of a game: which player occupies which cell and which
/// intersections hold walls.
///
/// `Board` only answers point queries and applies mutations it is told to make.
/// Whether a mutation is legal is decided by [`RulesEngine`](crate::RulesEngine).
///
/// # Layout
///
/// - **Cells**: `size`×`size`, each empty or holding one 0-based player index
/// - **Intersections**: `(size-1)`×`(size-1)`, see [`WallGrid`]
///
/// # Example
///
/// ```
/// use quoridor_engine::{Board, Orientation, Position};
///
/// let mut board = Board::new(9);
/// board.place_occupant(0, Position::new(4, 0)).unwrap();
/// board.set_wall(Position::new(3, 0), Orientation::Horizontal).unwrap();
///
/// assert_eq!(board.occupant_at(Position::new(4, 0)).unwrap(), Some(0));
/// assert!(board.occupant_at(Position::new(9, 0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<usize>>,
    walls: WallGrid,
}

impl Board {
    /// Creates an empty board with `size` cells per side.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            walls: WallGrid::new(size),
        }
    }

    /// Creates an empty board carrying an existing wall grid.
    ///
    /// The board size is derived from the grid, one more than its span.
    #[must_use]
    pub fn with_walls(walls: WallGrid) -> Self {
        let size = walls.span() + 1;
        Self {
            size,
            cells: vec![None; size * size],
            walls,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn walls(&self) -> &WallGrid {
        &self.walls
    }

    pub fn occupant_at(&self, at: Position) -> Result<Option<usize>, OutOfBoundsError> {
        let i = self.cell_index(at)?;
        Ok(self.cells[i])
    }

    /// Returns `true` if `at` is on the board and holds no piece.
    #[must_use]
    pub fn is_vacant(&self, at: Position) -> bool {
        matches!(self.occupant_at(at), Ok(None))
    }

    pub fn place_occupant(&mut self, player: usize, at: Position) -> Result<(), OutOfBoundsError> {
        let i = self.cell_index(at)?;
        self.cells[i] = Some(player);
        Ok(())
    }

    /// Empties the cell at `at`, returning the player that was there.
    pub fn clear_occupant(&mut self, at: Position) -> Result<Option<usize>, OutOfBoundsError> {
        let i = self.cell_index(at)?;
        Ok(self.cells[i].take())
    }

    /// Iterates over occupied cells in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (Position, usize)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.map(|player| (Position::new(i / self.size, i % self.size), player))
        })
    }

    pub fn wall_at(&self, at: Position) -> Result<Intersection, OutOfBoundsError> {
        self.walls.get(at).ok_or(OutOfBoundsError {
            row: at.row,
            col: at.col,
            limit: self.walls.span(),
        })
    }

    pub fn set_wall(
        &mut self,
        at: Position,
        orientation: Orientation,
    ) -> Result<(), OutOfBoundsError> {
        self.walls.set(at, orientation.into())
    }

    pub fn clear_wall(&mut self, at: Position) -> Result<(), OutOfBoundsError> {
        self.walls.set(at, Intersection::Empty)
    }

    /// Returns a copy of this board with `placement` added, leaving `self` untouched.
    pub fn with_wall(&self, placement: WallPlacement) -> Result<Self, OutOfBoundsError> {
        let mut board = self.clone();
        board.set_wall(placement.anchor, placement.orientation)?;
        Ok(board)
    }

    /// Checks whether a wall blocks the step from `from` in `direction`.
    ///
    /// The edge crossed by the step is bordered by up to two intersections; the
    /// step is blocked if either carries a wall perpendicular to the direction of
    /// travel. Intersections beyond the board edge never block.
    #[must_use]
    pub fn is_step_blocked(&self, from: Position, direction: Direction) -> bool {
        let Position { row, col } = from;
        let (line, blocking) = match direction {
            Direction::Up => (row.checked_sub(1), Intersection::Horizontal),
            Direction::Down => (Some(row), Intersection::Horizontal),
            Direction::Left => (col.checked_sub(1), Intersection::Vertical),
            Direction::Right => (Some(col), Intersection::Vertical),
        };
        let Some(line) = line else {
            return false;
        };
        let across = if direction.is_vertical() { col } else { row };
        [across.checked_sub(1), Some(across)]
            .into_iter()
            .flatten()
            .map(|offset| {
                if direction.is_vertical() {
                    Position::new(line, offset)
                } else {
                    Position::new(offset, line)
                }
            })
            .any(|at| self.walls.get(at) == Some(blocking))
    }

    fn cell_index(&self, at: Position) -> Result<usize, OutOfBoundsError> {
        if at.is_within(self.size) {
            Ok(at.row * self.size + at.col)
        } else {
            Err(OutOfBoundsError {
                row: at.row,
                col: at.col,
                limit: self.size,
            })
        }
    }
}
