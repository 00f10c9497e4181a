use serde::{Deserialize, Serialize};

use crate::core::Position;

/// Display color of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerColor {
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
    #[display("green")]
    Green,
    #[display("yellow")]
    Yellow,
}

impl PlayerColor {
    #[must_use]
    pub const fn for_seat(seat: usize) -> Self {
        match seat {
            0 => Self::Blue,
            1 => Self::Red,
            2 => Self::Green,
            _ => Self::Yellow,
        }
    }
}

/// Whether a player wins by reaching a row or a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalAxis {
    Row,
    Column,
}

/// The line a player must reach to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Goal {
    pub axis: GoalAxis,
    pub coordinate: usize,
}

impl Goal {
    /// Derives the goal line from a player's cell.
    ///
    /// A cell on the top or bottom edge targets the opposite row; otherwise a cell
    /// on the left edge targets the right column, and any other cell targets the
    /// left column.
    ///
    /// Snapshots carry no goal, so imports run this on the player's *current*
    /// cell. Once a piece has left its starting edge the inferred goal can differ
    /// from the one assigned at setup.
    #[must_use]
    pub fn infer(from: Position, board_size: usize) -> Self {
        let last = board_size.saturating_sub(1);
        if from.row == 0 {
            Self::row(last)
        } else if from.row == last {
            Self::row(0)
        } else if from.col == 0 {
            Self::column(last)
        } else {
            Self::column(0)
        }
    }

    #[must_use]
    pub const fn row(coordinate: usize) -> Self {
        Self {
            axis: GoalAxis::Row,
            coordinate,
        }
    }

    #[must_use]
    pub const fn column(coordinate: usize) -> Self {
        Self {
            axis: GoalAxis::Column,
            coordinate,
        }
    }

    #[must_use]
    pub fn is_reached_by(self, at: Position) -> bool {
        match self.axis {
            GoalAxis::Row => at.row == self.coordinate,
            GoalAxis::Column => at.col == self.coordinate,
        }
    }
}

/// Starting cell of a seat: west, east, north, then south edge, each at the
/// middle of its edge.
#[must_use]
pub fn start_position(seat: usize, board_size: usize) -> Position {
    let mid = board_size / 2;
    let last = board_size.saturating_sub(1);
    match seat {
        0 => Position::new(mid, 0),
        1 => Position::new(mid, last),
        2 => Position::new(0, mid),
        _ => Position::new(last, mid),
    }
}

/// Walls handed to each player at setup.
///
/// Two-player games get `board_size + 1` each, three- and four-player games
/// `board_size / 2 + 1`.
#[must_use]
pub fn wall_allotment(player_count: usize, board_size: usize) -> usize {
    if player_count <= 2 {
        board_size + 1
    } else {
        board_size / 2 + 1
    }
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    color: PlayerColor,
    position: Position,
    walls_remaining: usize,
    goal: Goal,
}

impl Player {
    /// Creates a player standing on `position`, with its goal inferred from that cell.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        color: PlayerColor,
        position: Position,
        walls_remaining: usize,
        board_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            color,
            position,
            walls_remaining,
            goal: Goal::infer(position, board_size),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> PlayerColor {
        self.color
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn walls_remaining(&self) -> usize {
        self.walls_remaining
    }

    #[must_use]
    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Returns `true` once the player stands on its goal line.
    #[must_use]
    pub fn has_won(&self) -> bool {
        self.goal.is_reached_by(self.position)
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn spend_wall(&mut self) {
        self.walls_remaining = self.walls_remaining.saturating_sub(1);
    }
}
