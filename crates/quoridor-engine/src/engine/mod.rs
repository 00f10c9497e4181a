//! Rules, turn sequencing and the ways a front-end reaches a game.
//!
//! [`RulesEngine`] answers legality questions over a board without mutating
//! it. [`GameSession`] owns one game and applies validated actions.
//! [`LocalGame`] and [`OnlineGame`] put the same [`GameController`] surface
//! over a local session and over a [`GameService`] respectively, exchanging
//! [`GameState`] snapshots with the latter.

pub use self::{
    controller::*, game_session::*, online::*, player::*, rules::*, service::*, snapshot::*,
};

pub(crate) mod controller;
pub(crate) mod game_session;
pub(crate) mod online;
pub(crate) mod player;
pub(crate) mod rules;
pub(crate) mod service;
pub(crate) mod snapshot;
