use std::ops::Deref;

use arrayvec::ArrayVec;

use crate::{
    OutOfBoundsError,
    core::{Board, Direction, Position, WallPlacement},
};

use super::player::Player;

/// Upper bound on destinations from one cell: each of the four directions
/// yields a single step, a single straight jump, or at most two deflections.
const MAX_DESTINATIONS: usize = 8;

/// Cells a piece can reach in one turn, sorted row-major without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations(ArrayVec<Position, MAX_DESTINATIONS>);

impl Destinations {
    fn from_unsorted(mut cells: ArrayVec<Position, MAX_DESTINATIONS>) -> Self {
        cells.sort_unstable();
        let mut unique = ArrayVec::new();
        for cell in cells {
            if unique.last() != Some(&cell) {
                unique.push(cell);
            }
        }
        Self(unique)
    }

    #[must_use]
    pub fn contains(&self, at: Position) -> bool {
        self.0.binary_search(&at).is_ok()
    }
}

impl Deref for Destinations {
    type Target = [Position];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Destinations {
    type Item = Position;
    type IntoIter = arrayvec::IntoIter<Position, MAX_DESTINATIONS>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Read-only rule queries over a board and the players on it.
///
/// Nothing here mutates state. Wall legality is evaluated against a copy of the
/// board, so a preview can run alongside any other reader.
///
/// # Example
///
/// ```
/// use quoridor_engine::{Board, Player, PlayerColor, Position, RulesEngine};
///
/// let mut board = Board::new(9);
/// board.place_occupant(0, Position::new(4, 0)).unwrap();
/// board.place_occupant(1, Position::new(4, 8)).unwrap();
/// let players = [
///     Player::new("Player 1", PlayerColor::Blue, Position::new(4, 0), 10, 9),
///     Player::new("Player 2", PlayerColor::Red, Position::new(4, 8), 10, 9),
/// ];
///
/// let rules = RulesEngine::new(&board, &players);
/// let moves = rules.legal_destinations(Position::new(4, 0)).unwrap();
/// assert_eq!(
///     &moves[..],
///     [Position::new(3, 0), Position::new(4, 1), Position::new(5, 0)]
/// );
/// assert!(rules.has_path_to_goal(0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RulesEngine<'a> {
    board: &'a Board,
    players: &'a [Player],
}

impl<'a> RulesEngine<'a> {
    #[must_use]
    pub fn new(board: &'a Board, players: &'a [Player]) -> Self {
        Self { board, players }
    }

    /// Computes every cell a piece standing on `from` may move to this turn.
    ///
    /// - **Step**: an adjacent empty cell not cut off by a wall.
    /// - **Straight jump**: when the adjacent cell is occupied, the cell beyond it,
    ///   if it is on the board, empty, and not behind a wall.
    /// - **Deflection**: only when the straight jump is unavailable, the cells to
    ///   either side of the jumped piece that are empty and not behind a wall.
    pub fn legal_destinations(&self, from: Position) -> Result<Destinations, OutOfBoundsError> {
        if !from.is_within(self.board.size()) {
            return Err(OutOfBoundsError {
                row: from.row,
                col: from.col,
                limit: self.board.size(),
            });
        }
        Ok(self.destinations_from(from))
    }

    fn destinations_from(&self, from: Position) -> Destinations {
        let board = self.board;
        let size = board.size();
        let mut cells = ArrayVec::new();

        for direction in Direction::ALL {
            let Some(next) = from.step(direction, size) else {
                continue;
            };
            if board.is_step_blocked(from, direction) {
                continue;
            }
            if board.is_vacant(next) {
                cells.push(next);
                continue;
            }

            let straight = next.step(direction, size).filter(|&beyond| {
                !board.is_step_blocked(next, direction) && board.is_vacant(beyond)
            });
            if let Some(beyond) = straight {
                cells.push(beyond);
                continue;
            }

            for side in direction.perpendicular() {
                let deflected = next.step(side, size).filter(|&cell| {
                    !board.is_step_blocked(next, side) && board.is_vacant(cell)
                });
                if let Some(cell) = deflected {
                    cells.push(cell);
                }
            }
        }

        Destinations::from_unsorted(cells)
    }

    /// Checks whether `player` can still reach its goal line.
    ///
    /// Runs a depth-first search over [`Self::legal_destinations`] with an
    /// explicit stack, visiting each cell at most once. Pieces stay where they
    /// are during the search, so they only shape the edges (jumps) taken.
    ///
    /// # Panics
    ///
    /// Panics if `player` is not a seat index of this engine.
    #[must_use]
    pub fn has_path_to_goal(&self, player: usize) -> bool {
        let player = &self.players[player];
        let goal = player.goal();
        let size = self.board.size();
        let index = |at: Position| at.row * size + at.col;

        let start = player.position();
        if !start.is_within(size) {
            return false;
        }
        let mut visited = vec![false; size * size];
        let mut stack = vec![start];
        visited[index(start)] = true;

        while let Some(at) = stack.pop() {
            if goal.is_reached_by(at) {
                return true;
            }
            for next in self.destinations_from(at) {
                let seen = &mut visited[index(next)];
                if !*seen {
                    *seen = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Checks whether `placement` may be added to the board.
    ///
    /// The wall must be anchored inside the intersection grid, must not collide
    /// with an existing wall, and must leave every player a path to its goal.
    #[must_use]
    pub fn is_legal_wall_placement(&self, placement: WallPlacement) -> bool {
        if self.board.walls().collides(placement) {
            return false;
        }
        let Ok(candidate) = self.board.with_wall(placement) else {
            return false;
        };
        let rules = RulesEngine::new(&candidate, self.players);
        (0..self.players.len()).all(|player| rules.has_path_to_goal(player))
    }

    /// Returns `true` if `player` stands on its goal line.
    ///
    /// # Panics
    ///
    /// Panics if `player` is not a seat index of this engine.
    #[must_use]
    pub fn check_win(&self, player: usize) -> bool {
        self.players[player].has_won()
    }
}
