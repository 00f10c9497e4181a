use tracing::{debug, instrument};

use crate::{
    ActionError,
    core::{Position, WallPlacement},
};

use super::{
    controller::{GameController, GameView},
    game_session::GameSession,
    rules::Destinations,
    service::{GameService, ServiceError},
    snapshot::{GameState, MoveRequest, PlayerState, WallRequest},
};

/// A game hosted by a [`GameService`], seen from one seat.
///
/// Holds the last state the service returned. Every call that reaches the
/// service replaces it; [`refresh`](GameController::refresh) polls once.
/// Move and wall previews are computed locally from the cached snapshot and
/// never reach the service.
///
/// # Example
///
/// ```
/// use quoridor_engine::{GameController, InMemoryGameService, OnlineGame};
///
/// let service = InMemoryGameService::new();
/// let mut host = OnlineGame::new(&service);
/// let mut guest = OnlineGame::new(&service);
///
/// let code = host.create("ann").unwrap().to_owned();
/// guest.join(&code, "bo").unwrap();
/// host.start().unwrap();
/// guest.refresh().unwrap();
/// assert!(guest.view().is_running());
/// ```
#[derive(Debug)]
pub struct OnlineGame<S> {
    service: S,
    seat: Option<Seat>,
    view: GameView,
}

#[derive(Debug, Clone)]
struct Seat {
    game_id: String,
    name: String,
}

impl<S> OnlineGame<S>
where
    S: GameService,
{
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            seat: None,
            view: GameView::Loading,
        }
    }

    #[must_use]
    pub fn game_id(&self) -> Option<&str> {
        self.seat.as_ref().map(|seat| seat.game_id.as_str())
    }

    #[must_use]
    pub fn player_name(&self) -> Option<&str> {
        self.seat.as_ref().map(|seat| seat.name.as_str())
    }

    /// Opens a new lobby hosted by `name` and returns its join code.
    #[instrument(skip(self))]
    pub fn create(&mut self, name: &str) -> Result<&str, ServiceError> {
        let state = self.service.create_game(name)?;
        self.seat = Some(Seat {
            game_id: state.id().to_owned(),
            name: name.to_owned(),
        });
        self.apply(state);
        Ok(self.game_id().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub fn join(&mut self, game_id: &str, name: &str) -> Result<(), ServiceError> {
        let state = self.service.join_game(game_id, name)?;
        self.seat = Some(Seat {
            game_id: game_id.to_owned(),
            name: name.to_owned(),
        });
        self.apply(state);
        Ok(())
    }

    /// Leaves the lobby and forgets the game.
    #[instrument(skip(self))]
    pub fn quit(&mut self) -> Result<(), ServiceError> {
        let seat = self.seat()?.clone();
        self.service.quit_game(&seat.game_id, &seat.name)?;
        self.seat = None;
        self.view = GameView::Loading;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), ServiceError> {
        let seat = self.seat()?;
        let state = self.service.start_game(&seat.game_id, &seat.name)?;
        self.apply(state);
        Ok(())
    }

    /// Returns `true` if the cached snapshot says it is this seat's turn.
    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.view
            .running()
            .and_then(|state| state.current_player())
            .is_some_and(|player| self.acts_for(player))
    }

    fn seat(&self) -> Result<&Seat, ServiceError> {
        self.seat.as_ref().ok_or(ServiceError::NotJoined)
    }

    fn apply(&mut self, state: GameState) {
        debug!(game_id = state.id(), "state received");
        self.view = match state {
            GameState::Lobby(lobby) => GameView::Lobby(lobby),
            GameState::Running(running) => GameView::Running(running),
            GameState::Finished(finished) => GameView::Finished {
                winner: finished.winner,
            },
        };
    }

    /// Rebuilds a session from the cached snapshot for local rules queries.
    fn preview(&self) -> Result<GameSession, ServiceError> {
        let Some(state) = self.view.running() else {
            let game_id = self.game_id().unwrap_or_default().to_owned();
            return Err(ServiceError::NotRunning(game_id));
        };
        Ok(GameSession::from_snapshot(state)?)
    }
}

impl<S> GameController for OnlineGame<S>
where
    S: GameService,
{
    type Error = ServiceError;

    fn request_move(&mut self, to: Position) -> Result<(), Self::Error> {
        let seat = self.seat()?;
        let state = self
            .service
            .submit_move(&seat.game_id, &seat.name, MoveRequest { to })?;
        self.apply(state);
        Ok(())
    }

    fn request_wall(&mut self, placement: WallPlacement) -> Result<(), Self::Error> {
        let seat = self.seat()?;
        let request = WallRequest::from(placement);
        let state = self
            .service
            .submit_wall(&seat.game_id, &seat.name, request)?;
        self.apply(state);
        Ok(())
    }

    fn view(&self) -> GameView {
        self.view.clone()
    }

    fn refresh(&mut self) -> Result<(), Self::Error> {
        let state = self.service.fetch_game(&self.seat()?.game_id)?;
        self.apply(state);
        Ok(())
    }

    fn acts_for(&self, player: &PlayerState) -> bool {
        self.player_name() == Some(player.name.as_str())
    }

    fn legal_destinations(&self, at: Position) -> Result<Destinations, Self::Error> {
        let session = self.preview()?;
        Ok(session.legal_destinations(at).map_err(ActionError::from)?)
    }

    fn is_legal_wall_placement(&self, placement: WallPlacement) -> bool {
        self.preview()
            .is_ok_and(|session| session.is_legal_wall_placement(placement))
    }
}
