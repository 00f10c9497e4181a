use crate::{
    ActionError,
    core::{Position, WallPlacement},
};

use super::{
    game_session::{GameSession, SessionState},
    rules::Destinations,
    snapshot::{LobbyGameState, PlayerState, RunningGameState},
};

/// What a front-end should currently show.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameView {
    /// No state has been received yet.
    Loading,
    Lobby(LobbyGameState),
    Running(RunningGameState),
    Finished { winner: String },
}

impl GameView {
    #[must_use]
    pub fn running(&self) -> Option<&RunningGameState> {
        match self {
            Self::Running(state) => Some(state),
            Self::Loading | Self::Lobby(_) | Self::Finished { .. } => None,
        }
    }
}

/// The surface a front-end drives, whether the game is played locally or
/// hosted by a [`GameService`](super::GameService).
pub trait GameController {
    type Error;

    fn request_move(&mut self, to: Position) -> Result<(), Self::Error>;

    fn request_wall(&mut self, placement: WallPlacement) -> Result<(), Self::Error>;

    fn view(&self) -> GameView;

    /// Pulls the latest state from wherever the game lives.
    fn refresh(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Returns `true` if requests from this controller act for `player`.
    fn acts_for(&self, _player: &PlayerState) -> bool {
        true
    }

    /// Cells the piece on `at` may move to, computed without touching the game.
    fn legal_destinations(&self, at: Position) -> Result<Destinations, Self::Error>;

    /// Previews a wall placement without touching the game.
    fn is_legal_wall_placement(&self, placement: WallPlacement) -> bool;

    fn winner(&self) -> Option<String> {
        match self.view() {
            GameView::Finished { winner } => Some(winner),
            GameView::Loading | GameView::Lobby(_) | GameView::Running(_) => None,
        }
    }
}

/// A game played entirely in this process.
#[derive(Debug, Clone)]
pub struct LocalGame {
    id: String,
    session: GameSession,
}

impl LocalGame {
    #[must_use]
    pub fn new(id: impl Into<String>, session: GameSession) -> Self {
        Self {
            id: id.into(),
            session,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> GameSession {
        self.session
    }
}

impl GameController for LocalGame {
    type Error = ActionError;

    fn request_move(&mut self, to: Position) -> Result<(), Self::Error> {
        self.session.request_move(to).map(|_| ())
    }

    fn request_wall(&mut self, placement: WallPlacement) -> Result<(), Self::Error> {
        self.session.request_wall(placement).map(|_| ())
    }

    fn view(&self) -> GameView {
        match self.session.state() {
            SessionState::Unconfigured => GameView::Loading,
            SessionState::Configured => {
                let players: Vec<_> = self
                    .session
                    .players()
                    .iter()
                    .map(|p| p.name().to_owned())
                    .collect();
                GameView::Lobby(LobbyGameState {
                    id: self.id.clone(),
                    host: players.first().cloned().unwrap_or_default(),
                    players,
                })
            }
            SessionState::InProgress => GameView::Running(self.session.to_snapshot(&self.id)),
            SessionState::Finished { .. } => GameView::Finished {
                winner: self
                    .session
                    .winner()
                    .map(|p| p.name().to_owned())
                    .unwrap_or_default(),
            },
        }
    }

    fn legal_destinations(&self, at: Position) -> Result<Destinations, Self::Error> {
        Ok(self.session.legal_destinations(at)?)
    }

    fn is_legal_wall_placement(&self, placement: WallPlacement) -> bool {
        self.session.is_legal_wall_placement(placement)
    }
}
