use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::{debug, info, instrument, warn};

use crate::{ActionError, SetupError};

use super::{
    game_session::{GameConfig, GameSession, SessionSeed},
    snapshot::{
        FinishedGameState, GameState, LobbyGameState, MoveRequest, SnapshotError, WallRequest,
    },
};

/// Length of the join codes handed out by [`InMemoryGameService`].
pub const GAME_CODE_LEN: usize = 6;

/// Failures reported by a [`GameService`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ServiceError {
    #[display("no game with id {_0}")]
    UnknownGame(#[error(not(source))] String),
    #[display("{_0} is already taken in this game")]
    NameTaken(#[error(not(source))] String),
    #[display("the lobby is full")]
    LobbyFull,
    #[display("{_0} is not seated in this game")]
    NotInGame(#[error(not(source))] String),
    #[display("only the host can start the game")]
    NotHost,
    #[display("at least 2 players are needed, {_0} joined")]
    NotEnoughPlayers(#[error(not(source))] usize),
    #[display("it is not your turn")]
    NotYourTurn,
    #[display("game {_0} is not in the lobby")]
    NotInLobby(#[error(not(source))] String),
    #[display("game {_0} is not running")]
    NotRunning(#[error(not(source))] String),
    #[display("no game has been created or joined")]
    NotJoined,
    #[display("{_0}")]
    #[from]
    Setup(SetupError),
    #[display("{_0}")]
    #[from]
    Rejected(ActionError),
    #[display("{_0}")]
    #[from]
    Snapshot(SnapshotError),
}

/// Authoritative host of games, addressed by game id and player name.
///
/// Every call returns the game's state after the call took effect.
pub trait GameService {
    /// Opens a lobby hosted by `host`.
    fn create_game(&self, host: &str) -> Result<GameState, ServiceError>;

    fn join_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError>;

    /// Leaves a lobby. Returns `None` once the last player has left and the
    /// game is gone.
    fn quit_game(&self, game_id: &str, player: &str) -> Result<Option<GameState>, ServiceError>;

    /// Starts the game; only the host may do this.
    fn start_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError>;

    fn fetch_game(&self, game_id: &str) -> Result<GameState, ServiceError>;

    fn submit_move(
        &self,
        game_id: &str,
        player: &str,
        request: MoveRequest,
    ) -> Result<GameState, ServiceError>;

    fn submit_wall(
        &self,
        game_id: &str,
        player: &str,
        request: WallRequest,
    ) -> Result<GameState, ServiceError>;
}

impl<S> GameService for &S
where
    S: GameService + ?Sized,
{
    fn create_game(&self, host: &str) -> Result<GameState, ServiceError> {
        (**self).create_game(host)
    }

    fn join_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        (**self).join_game(game_id, player)
    }

    fn quit_game(&self, game_id: &str, player: &str) -> Result<Option<GameState>, ServiceError> {
        (**self).quit_game(game_id, player)
    }

    fn start_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        (**self).start_game(game_id, player)
    }

    fn fetch_game(&self, game_id: &str) -> Result<GameState, ServiceError> {
        (**self).fetch_game(game_id)
    }

    fn submit_move(
        &self,
        game_id: &str,
        player: &str,
        request: MoveRequest,
    ) -> Result<GameState, ServiceError> {
        (**self).submit_move(game_id, player, request)
    }

    fn submit_wall(
        &self,
        game_id: &str,
        player: &str,
        request: WallRequest,
    ) -> Result<GameState, ServiceError> {
        (**self).submit_wall(game_id, player, request)
    }
}

impl<S> GameService for Arc<S>
where
    S: GameService + ?Sized,
{
    fn create_game(&self, host: &str) -> Result<GameState, ServiceError> {
        (**self).create_game(host)
    }

    fn join_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        (**self).join_game(game_id, player)
    }

    fn quit_game(&self, game_id: &str, player: &str) -> Result<Option<GameState>, ServiceError> {
        (**self).quit_game(game_id, player)
    }

    fn start_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        (**self).start_game(game_id, player)
    }

    fn fetch_game(&self, game_id: &str) -> Result<GameState, ServiceError> {
        (**self).fetch_game(game_id)
    }

    fn submit_move(
        &self,
        game_id: &str,
        player: &str,
        request: MoveRequest,
    ) -> Result<GameState, ServiceError> {
        (**self).submit_move(game_id, player, request)
    }

    fn submit_wall(
        &self,
        game_id: &str,
        player: &str,
        request: WallRequest,
    ) -> Result<GameState, ServiceError> {
        (**self).submit_wall(game_id, player, request)
    }
}

#[derive(Debug, Clone)]
enum HostedGame {
    Lobby { host: String, players: Vec<String> },
    Running(GameSession),
    Finished { winner: String },
}

impl HostedGame {
    fn state(&self, id: &str) -> GameState {
        let id = id.to_owned();
        match self {
            Self::Lobby { host, players } => GameState::Lobby(LobbyGameState {
                id,
                host: host.clone(),
                players: players.clone(),
            }),
            Self::Running(session) => GameState::Running(session.to_snapshot(id)),
            Self::Finished { winner } => GameState::Finished(FinishedGameState {
                id,
                winner: winner.clone(),
            }),
        }
    }
}

#[derive(Debug)]
struct Inner {
    config: GameConfig,
    games: HashMap<String, HostedGame>,
    rng: Pcg32,
}

impl Inner {
    fn game_mut(&mut self, game_id: &str) -> Result<&mut HostedGame, ServiceError> {
        self.games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::UnknownGame(game_id.to_owned()))
    }

    fn fresh_code(&mut self) -> String {
        loop {
            let code: String = (0..GAME_CODE_LEN)
                .map(|_| char::from(self.rng.random_range(b'A'..=b'Z')))
                .collect();
            if !self.games.contains_key(&code) {
                return code;
            }
        }
    }
}

/// A thread-safe [`GameService`] that keeps every game in memory.
///
/// Games are addressed by random six-letter codes. A lobby accepts 2 to 4
/// uniquely named players; only its host can start it, and once running only
/// the player whose turn it is may act.
///
/// Games are never evicted: a finished game stays in memory, and keeps
/// answering [`GameService::fetch_game`] with its winner, until the service
/// is dropped. Emptied lobbies are the only games removed.
///
/// # Example
///
/// ```
/// use quoridor_engine::{GameService, GameState, InMemoryGameService, SessionSeed};
///
/// let service = InMemoryGameService::with_seed(SessionSeed::from_u128(3));
/// let lobby = service.create_game("ann").unwrap();
/// service.join_game(lobby.id(), "bo").unwrap();
/// let running = service.start_game(lobby.id(), "ann").unwrap();
///
/// let GameState::Running(snapshot) = running else {
///     panic!("game did not start");
/// };
/// assert_eq!(snapshot.players.len(), 2);
/// assert_eq!(snapshot.players[1].name, "bo");
/// ```
#[derive(Debug)]
pub struct InMemoryGameService {
    inner: Mutex<Inner>,
}

impl Default for InMemoryGameService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameService {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but game codes and starting players follow `seed`.
    #[must_use]
    pub fn with_seed(seed: SessionSeed) -> Self {
        Self::unchecked(GameConfig::default(), seed)
    }

    /// Hosts every game on a board described by `config`.
    pub fn with_config(config: GameConfig, seed: SessionSeed) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self::unchecked(config, seed))
    }

    fn unchecked(config: GameConfig, seed: SessionSeed) -> Self {
        Self {
            inner: Mutex::new(Inner {
                config,
                games: HashMap::new(),
                rng: Pcg32::from_seed(seed.to_bytes()),
            }),
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    fn with_running<F>(&self, game_id: &str, player: &str, f: F) -> Result<GameState, ServiceError>
    where
        F: FnOnce(&mut GameSession) -> Result<(), ActionError>,
    {
        self.with_inner(|inner| {
            let game = inner.game_mut(game_id)?;
            let HostedGame::Running(session) = &mut *game else {
                return Err(ServiceError::NotRunning(game_id.to_owned()));
            };
            if !session.players().iter().any(|p| p.name() == player) {
                return Err(ServiceError::NotInGame(player.to_owned()));
            }
            if session.current_player().map(|p| p.name()) != Some(player) {
                debug!(player, "action out of turn");
                return Err(ServiceError::NotYourTurn);
            }
            f(session).inspect_err(|e| warn!(player, error = %e, "action rejected"))?;
            if let Some(winner) = session.winner().map(|w| w.name().to_owned()) {
                info!(winner = %winner, "game finished");
                *game = HostedGame::Finished { winner };
            }
            Ok(game.state(game_id))
        })
    }
}

impl GameService for InMemoryGameService {
    #[instrument(skip(self))]
    fn create_game(&self, host: &str) -> Result<GameState, ServiceError> {
        self.with_inner(|inner| {
            let id = inner.fresh_code();
            let game = HostedGame::Lobby {
                host: host.to_owned(),
                players: vec![host.to_owned()],
            };
            let state = game.state(&id);
            inner.games.insert(id.clone(), game);
            info!(game_id = %id, "lobby opened");
            Ok(state)
        })
    }

    #[instrument(skip(self))]
    fn join_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        self.with_inner(|inner| {
            let game = inner.game_mut(game_id)?;
            let HostedGame::Lobby { players, .. } = &mut *game else {
                return Err(ServiceError::NotInLobby(game_id.to_owned()));
            };
            if players.iter().any(|p| p == player) {
                return Err(ServiceError::NameTaken(player.to_owned()));
            }
            if players.len() >= 4 {
                return Err(ServiceError::LobbyFull);
            }
            players.push(player.to_owned());
            info!(seats = players.len(), "player joined");
            Ok(game.state(game_id))
        })
    }

    #[instrument(skip(self))]
    fn quit_game(&self, game_id: &str, player: &str) -> Result<Option<GameState>, ServiceError> {
        self.with_inner(|inner| {
            let game = inner.game_mut(game_id)?;
            let HostedGame::Lobby { host, players } = &mut *game else {
                return Err(ServiceError::NotInLobby(game_id.to_owned()));
            };
            let seat = players
                .iter()
                .position(|p| p == player)
                .ok_or_else(|| ServiceError::NotInGame(player.to_owned()))?;
            players.remove(seat);
            let Some(next_host) = players.first() else {
                inner.games.remove(game_id);
                info!("lobby closed");
                return Ok(None);
            };
            if *host == player {
                *host = next_host.clone();
            }
            info!(host = %host, "player left");
            Ok(Some(game.state(game_id)))
        })
    }

    #[instrument(skip(self))]
    fn start_game(&self, game_id: &str, player: &str) -> Result<GameState, ServiceError> {
        self.with_inner(|inner| {
            let seed = inner.rng.random();
            let config = inner.config;
            let game = inner.game_mut(game_id)?;
            let HostedGame::Lobby { host, players } = &mut *game else {
                return Err(ServiceError::NotInLobby(game_id.to_owned()));
            };
            if *host != player {
                return Err(ServiceError::NotHost);
            }
            if players.len() < 2 {
                return Err(ServiceError::NotEnoughPlayers(players.len()));
            }
            let mut session = GameSession::with_config(config, seed)?;
            session.prepare_named_game(players.clone())?;
            session.start_game();
            *game = HostedGame::Running(session);
            info!("game started");
            Ok(game.state(game_id))
        })
    }

    #[instrument(skip(self))]
    fn fetch_game(&self, game_id: &str) -> Result<GameState, ServiceError> {
        self.with_inner(|inner| Ok(inner.game_mut(game_id)?.state(game_id)))
    }

    #[instrument(skip(self))]
    fn submit_move(
        &self,
        game_id: &str,
        player: &str,
        request: MoveRequest,
    ) -> Result<GameState, ServiceError> {
        self.with_running(game_id, player, |session| {
            session.request_move(request.to).map(|_| ())
        })
    }

    #[instrument(skip(self))]
    fn submit_wall(
        &self,
        game_id: &str,
        player: &str,
        request: WallRequest,
    ) -> Result<GameState, ServiceError> {
        self.with_running(game_id, player, |session| {
            session.request_wall(request.placement()).map(|_| ())
        })
    }
}
