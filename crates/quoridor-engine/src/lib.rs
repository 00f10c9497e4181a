//! Rules engine and game session for Quoridor with 2–4 players.
//!
//! - [`core`] holds the spatial model: [`Board`], [`WallGrid`], [`Position`].
//! - [`engine`] holds the rules ([`RulesEngine`]), turn sequencing
//!   ([`GameSession`]), the snapshot wire types ([`GameState`]) and the
//!   controllers a front-end drives ([`LocalGame`], [`OnlineGame`]).
//!
//! # Example
//!
//! ```
//! use quoridor_engine::{GameSession, SessionSeed, WallPlacement};
//!
//! let mut session = GameSession::with_seed(SessionSeed::from_u128(7));
//! session.prepare_game(2).unwrap();
//! session.start_game();
//!
//! let current = session.current_player().unwrap().position();
//! let targets = session.legal_destinations(current).unwrap();
//! session.request_move(targets[0]).unwrap();
//!
//! assert!(session.is_legal_wall_placement(WallPlacement::horizontal(0, 0)));
//! session.request_wall(WallPlacement::horizontal(0, 0)).unwrap();
//! assert!(!session.is_legal_wall_placement(WallPlacement::horizontal(0, 0)));
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A cell or intersection coordinate outside its grid.
///
/// `limit` is the exclusive upper bound that was exceeded: the board size for
/// cells, the intersection span (board size - 1) for walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("position ({row}, {col}) is outside the grid (limit {limit})")]
pub struct OutOfBoundsError {
    pub row: usize,
    pub col: usize,
    pub limit: usize,
}

/// Errors raised while configuring a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SetupError {
    #[display("player count must be between 2 and 4, got {_0}")]
    InvalidPlayerCount(#[error(not(source))] usize),
    #[display("board size must be an odd number of at least 3, got {_0}")]
    InvalidBoardSize(#[error(not(source))] usize),
    #[display("cannot set up a new game while the current one is {_0}")]
    IllegalState(#[error(not(source))] SessionState),
}

/// Reasons a move or wall placement was refused.
///
/// The session is left unchanged whenever one of these is returned, so callers
/// can simply ask the player again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum ActionError {
    #[display("no action is accepted while the game is {_0}")]
    IllegalState(#[error(not(source))] SessionState),
    #[display("{_0}")]
    #[from]
    OutOfBounds(OutOfBoundsError),
    #[display("{_0} is not a legal destination")]
    IllegalMove(#[error(not(source))] Position),
    #[display("{_0} is not a legal placement")]
    IllegalWallPlacement(#[error(not(source))] WallPlacement),
    #[display("no walls remaining")]
    NoWallsRemaining,
}
