use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::{
    ActionError, OutOfBoundsError, SetupError,
    core::{Board, DEFAULT_BOARD_SIZE, Position, WallPlacement},
};

use super::{
    player::{Player, PlayerColor, start_position, wall_allotment},
    rules::{Destinations, RulesEngine},
};

/// Lifecycle of a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum SessionState {
    #[display("unconfigured")]
    Unconfigured,
    #[display("configured")]
    Configured,
    #[display("in progress")]
    InProgress,
    #[display("finished")]
    Finished { winner: usize },
}

/// What an accepted action led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TurnOutcome {
    /// The turn passed to `next_player`.
    Continue { next_player: usize },
    /// The acting player reached its goal line.
    Won { winner: usize },
}

/// Board settings of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
        }
    }
}

impl GameConfig {
    /// Checks that every seat has a mid-edge starting cell.
    pub fn validate(&self) -> Result<(), SetupError> {
        let size = self.board_size;
        if size < 3 || size % 2 == 0 {
            return Err(SetupError::InvalidBoardSize(size));
        }
        Ok(())
    }
}

/// Seed for the session's random starting-player choice.
///
/// Serialized as a 32-digit hex string. The same seed picks the same starting
/// players, which keeps tests and replays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSeed([u8; 16]);

impl SessionSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for SessionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for SessionSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 32 {
            return Err(format!(
                "invalid hex: expected 1 to 32 characters, got {}",
                s.len()
            ));
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| format!("invalid hex: {s} ({e})"))?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for SessionSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `SessionSeed` values with `rng.random()`.
impl Distribution<SessionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SessionSeed(seed)
    }
}

/// A single game: board, players, turn order and win state.
///
/// # States
///
/// `Unconfigured` → [`prepare_game`](Self::prepare_game) → `Configured` →
/// [`start_game`](Self::start_game) → `InProgress` → (a player reaches its
/// goal) → `Finished`.
///
/// Every action is validated in full before anything is mutated; a rejected
/// action returns an [`ActionError`] and leaves the session as it was.
///
/// # Example
///
/// ```
/// use quoridor_engine::{GameSession, SessionSeed, SessionState};
///
/// let mut session = GameSession::with_seed(SessionSeed::from_u128(1));
/// assert!(session.prepare_game(5).is_err());
///
/// session.prepare_game(4).unwrap();
/// session.start_game();
/// assert_eq!(session.state(), SessionState::InProgress);
/// assert_eq!(session.players().len(), 4);
/// assert_eq!(session.players()[0].walls_remaining(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    players: Vec<Player>,
    current_player: usize,
    state: SessionState,
    rng: Pcg32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates an unconfigured session on a standard board with a random seed.
    ///
    /// For a deterministic starting player, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: SessionSeed) -> Self {
        Self::unconfigured(GameConfig::default(), seed)
    }

    pub fn with_config(config: GameConfig, seed: SessionSeed) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self::unconfigured(config, seed))
    }

    fn unconfigured(config: GameConfig, seed: SessionSeed) -> Self {
        Self {
            config,
            board: Board::new(config.board_size),
            players: Vec::new(),
            current_player: 0,
            state: SessionState::Unconfigured,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Assembles a running session from already-validated parts.
    pub(crate) fn in_progress(board: Board, players: Vec<Player>, current_player: usize) -> Self {
        Self {
            config: GameConfig {
                board_size: board.size(),
            },
            board,
            players,
            current_player,
            state: SessionState::InProgress,
            rng: Pcg32::from_seed(rand::rng().random::<SessionSeed>().0),
        }
    }

    /// Keeps this session's random state while taking every other field from `other`.
    pub(crate) fn replace_position(&mut self, other: Self) {
        let rng = self.rng.clone();
        *self = Self { rng, ..other };
    }

    #[must_use]
    pub fn config(&self) -> GameConfig {
        self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn current_player_index(&self) -> usize {
        self.current_player
    }

    /// Returns the player whose turn it is, if any players are seated.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        match self.state {
            SessionState::Finished { winner } => self.players.get(winner),
            SessionState::Unconfigured | SessionState::Configured | SessionState::InProgress => {
                None
            }
        }
    }

    #[must_use]
    pub fn rules(&self) -> RulesEngine<'_> {
        RulesEngine::new(&self.board, &self.players)
    }

    /// Seats `player_count` players named `Player 1`, `Player 2`, ...
    pub fn prepare_game(&mut self, player_count: usize) -> Result<(), SetupError> {
        if !(2..=4).contains(&player_count) {
            return Err(SetupError::InvalidPlayerCount(player_count));
        }
        let names = (1..=player_count).map(|n| format!("Player {n}")).collect();
        self.prepare_named_game(names)
    }

    /// Resets the board and seats one player per name, in turn order.
    ///
    /// Allowed before a game starts and after one has finished.
    pub fn prepare_named_game(&mut self, names: Vec<String>) -> Result<(), SetupError> {
        if self.state.is_in_progress() {
            return Err(SetupError::IllegalState(self.state));
        }
        let player_count = names.len();
        if !(2..=4).contains(&player_count) {
            return Err(SetupError::InvalidPlayerCount(player_count));
        }

        let size = self.config.board_size;
        let walls = wall_allotment(player_count, size);
        let mut board = Board::new(size);
        let mut players = Vec::with_capacity(player_count);
        for (seat, name) in names.into_iter().enumerate() {
            let start = start_position(seat, size);
            board
                .place_occupant(seat, start)
                .map_err(|_| SetupError::InvalidBoardSize(size))?;
            players.push(Player::new(name, PlayerColor::for_seat(seat), start, walls, size));
        }

        self.board = board;
        self.players = players;
        self.current_player = 0;
        self.state = SessionState::Configured;
        info!(player_count, board_size = size, "game prepared");
        Ok(())
    }

    /// Picks a uniformly random starting player and begins play.
    ///
    /// # Panics
    ///
    /// Panics unless the session is configured: calling this before
    /// [`Self::prepare_game`] is a bug in the caller.
    pub fn start_game(&mut self) {
        assert!(
            !self.players.is_empty() && self.state.is_configured(),
            "tried to start a game that is {} with {} players",
            self.state,
            self.players.len()
        );
        self.current_player = self.rng.random_range(0..self.players.len());
        self.state = SessionState::InProgress;
        info!(first_player = self.current_player, "game started");
    }

    /// Cells the piece on `at` may move to this turn.
    pub fn legal_destinations(&self, at: Position) -> Result<Destinations, OutOfBoundsError> {
        self.rules().legal_destinations(at)
    }

    /// Previews whether the current board accepts `placement`.
    ///
    /// Ignores whose turn it is and how many walls they hold.
    #[must_use]
    pub fn is_legal_wall_placement(&self, placement: WallPlacement) -> bool {
        self.rules().is_legal_wall_placement(placement)
    }

    /// Moves the current player's piece to `target`.
    ///
    /// Reaching the goal line finishes the game without passing the turn.
    pub fn request_move(&mut self, target: Position) -> Result<TurnOutcome, ActionError> {
        let player = self.acting_player()?;
        let from = self.players[player].position();
        if !target.is_within(self.board.size()) {
            return Err(OutOfBoundsError {
                row: target.row,
                col: target.col,
                limit: self.board.size(),
            }
            .into());
        }
        if !self.legal_destinations(from)?.contains(target) {
            debug!(player, %from, %target, "move rejected");
            return Err(ActionError::IllegalMove(target));
        }

        self.board.clear_occupant(from)?;
        self.board.place_occupant(player, target)?;
        self.players[player].set_position(target);
        debug!(player, %from, %target, "move accepted");

        if self.rules().check_win(player) {
            self.state = SessionState::Finished { winner: player };
            info!(winner = player, name = self.players[player].name(), "game won");
            return Ok(TurnOutcome::Won { winner: player });
        }
        Ok(self.advance_turn())
    }

    /// Places a wall for the current player and passes the turn.
    pub fn request_wall(&mut self, placement: WallPlacement) -> Result<TurnOutcome, ActionError> {
        let player = self.acting_player()?;
        if self.players[player].walls_remaining() == 0 {
            debug!(player, %placement, "wall rejected: none remaining");
            return Err(ActionError::NoWallsRemaining);
        }
        if !self.is_legal_wall_placement(placement) {
            debug!(player, %placement, "wall rejected");
            return Err(ActionError::IllegalWallPlacement(placement));
        }

        self.board.set_wall(placement.anchor, placement.orientation)?;
        self.players[player].spend_wall();
        debug!(
            player,
            %placement,
            walls_remaining = self.players[player].walls_remaining(),
            "wall accepted"
        );
        Ok(self.advance_turn())
    }

    fn acting_player(&self) -> Result<usize, ActionError> {
        match self.state {
            SessionState::InProgress => Ok(self.current_player),
            SessionState::Unconfigured
            | SessionState::Configured
            | SessionState::Finished { .. } => Err(ActionError::IllegalState(self.state)),
        }
    }

    fn advance_turn(&mut self) -> TurnOutcome {
        self.current_player = (self.current_player + 1) % self.players.len();
        TurnOutcome::Continue {
            next_player: self.current_player,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::Intersection;

    use super::*;

    fn started(player_count: usize, seed: u128) -> GameSession {
        let mut session = GameSession::with_seed(SessionSeed::from_u128(seed));
        session.prepare_game(player_count).unwrap();
        session.start_game();
        session
    }

    /// A two-player game where seat 0 moves first.
    fn seat_zero_first() -> GameSession {
        (0..)
            .map(|seed| started(2, seed))
            .find(|session| session.current_player_index() == 0)
            .unwrap()
    }

    #[test]
    fn test_prepare_rejects_bad_player_counts() {
        let mut session = GameSession::new();
        assert_eq!(
            session.prepare_game(1),
            Err(SetupError::InvalidPlayerCount(1))
        );
        assert_eq!(
            session.prepare_game(5),
            Err(SetupError::InvalidPlayerCount(5))
        );
        assert!(session.state().is_unconfigured());
    }

    #[test]
    fn test_prepare_seats_players() {
        let mut session = GameSession::new();
        session.prepare_game(3).unwrap();
        assert!(session.state().is_configured());

        let players = session.players();
        assert_eq!(players.len(), 3);
        assert_eq!(players[2].name(), "Player 3");
        assert_eq!(players[2].color(), PlayerColor::Green);
        assert_eq!(players[2].position(), Position::new(0, 4));
        assert!(players.iter().all(|p| p.walls_remaining() == 5));

        let occupants: Vec<_> = session.board().occupants().collect();
        assert_eq!(occupants.len(), 3);
        for (seat, player) in players.iter().enumerate() {
            assert_eq!(
                session.board().occupant_at(player.position()).unwrap(),
                Some(seat)
            );
        }
    }

    #[test]
    fn test_config_validation() {
        let seed = SessionSeed::from_u128(0);
        assert!(GameSession::with_config(GameConfig { board_size: 8 }, seed).is_err());
        assert!(GameSession::with_config(GameConfig { board_size: 1 }, seed).is_err());

        let mut session = GameSession::with_config(GameConfig { board_size: 5 }, seed).unwrap();
        session.prepare_game(2).unwrap();
        assert_eq!(session.board().size(), 5);
        assert_eq!(session.players()[1].position(), Position::new(2, 4));
        assert_eq!(session.players()[0].walls_remaining(), 6);
    }

    #[test]
    #[should_panic(expected = "tried to start a game")]
    fn test_start_without_players_panics() {
        GameSession::new().start_game();
    }

    #[test]
    fn test_start_is_seeded() {
        let first: Vec<_> = (0..8)
            .map(|seed| started(4, seed).current_player_index())
            .collect();
        let again: Vec<_> = (0..8)
            .map(|seed| started(4, seed).current_player_index())
            .collect();
        assert_eq!(first, again);
        assert!(first.iter().all(|&i| i < 4));
    }

    #[test]
    fn test_every_player_has_a_path_after_start() {
        let session = started(4, 3);
        let rules = session.rules();
        assert!((0..4).all(|player| rules.has_path_to_goal(player)));
    }

    #[test]
    fn test_actions_before_start_are_rejected() {
        let mut session = GameSession::new();
        session.prepare_game(2).unwrap();
        assert_eq!(
            session.request_move(Position::new(3, 0)),
            Err(ActionError::IllegalState(SessionState::Configured))
        );
        assert_eq!(
            session.request_wall(WallPlacement::horizontal(0, 0)),
            Err(ActionError::IllegalState(SessionState::Configured))
        );
    }

    #[test]
    fn test_move_rotates_turn() {
        let mut session = seat_zero_first();
        let outcome = session.request_move(Position::new(3, 0)).unwrap();
        assert_eq!(outcome, TurnOutcome::Continue { next_player: 1 });
        assert_eq!(session.players()[0].position(), Position::new(3, 0));
        assert_eq!(session.board().occupant_at(Position::new(4, 0)).unwrap(), None);
        assert_eq!(
            session.board().occupant_at(Position::new(3, 0)).unwrap(),
            Some(0)
        );
    }

    #[test]
    fn test_illegal_move_leaves_state_untouched() {
        let mut session = seat_zero_first();
        let before = (session.board().clone(), session.players().to_vec());
        assert_eq!(
            session.request_move(Position::new(4, 2)),
            Err(ActionError::IllegalMove(Position::new(4, 2)))
        );
        assert!(matches!(
            session.request_move(Position::new(4, 9)),
            Err(ActionError::OutOfBounds(_))
        ));
        assert_eq!((session.board().clone(), session.players().to_vec()), before);
        assert_eq!(session.current_player_index(), 0);
    }

    #[test]
    fn test_wall_spends_allotment_and_rotates_turn() {
        let mut session = seat_zero_first();
        let wall = WallPlacement::vertical(3, 3);
        let outcome = session.request_wall(wall).unwrap();
        assert_eq!(outcome, TurnOutcome::Continue { next_player: 1 });
        assert_eq!(session.players()[0].walls_remaining(), 9);
        assert_eq!(
            session.board().wall_at(Position::new(3, 3)).unwrap(),
            Intersection::Vertical
        );

        // Placing the same wall again is rejected.
        assert!(!session.is_legal_wall_placement(wall));
        assert_eq!(
            session.request_wall(wall),
            Err(ActionError::IllegalWallPlacement(wall))
        );
        assert_eq!(session.players()[1].walls_remaining(), 10);
        assert_eq!(session.current_player_index(), 1);
    }

    #[test]
    fn test_wall_that_strands_another_seat_is_rejected() {
        let mut session = (0..)
            .map(|seed| started(3, seed))
            .find(|session| session.current_player_index() == 1)
            .unwrap();
        assert_eq!(session.players()[2].position(), Position::new(0, 4));

        // Seats 1 and 2 box in (0, 3) and (0, 4) on three sides.
        session.request_wall(WallPlacement::horizontal(0, 3)).unwrap();
        session.request_wall(WallPlacement::vertical(0, 2)).unwrap();
        assert_eq!(session.current_player_index(), 0);
        assert!(session.rules().has_path_to_goal(2));

        // Seat 0 still reaches its own goal, but the wall would close the box.
        let closing = WallPlacement::vertical(0, 4);
        assert!(!session.board().walls().collides(closing));
        let before = session.to_snapshot("TEST");
        assert_eq!(
            session.request_wall(closing),
            Err(ActionError::IllegalWallPlacement(closing))
        );
        assert_eq!(session.to_snapshot("TEST"), before);
        assert_eq!(session.players()[0].walls_remaining(), 5);
        assert_eq!(session.current_player_index(), 0);
        let rules = session.rules();
        assert!((0..3).all(|player| rules.has_path_to_goal(player)));
    }

    #[test]
    fn test_no_walls_remaining() {
        let mut session = seat_zero_first();
        // Horizontal walls only block vertical steps, so both east-west goals stay reachable.
        let walls = (0..8)
            .flat_map(|row| [0, 2, 4, 6].map(|col| WallPlacement::horizontal(row, col)));
        for wall in walls.take(20) {
            session.request_wall(wall).unwrap();
        }
        assert_eq!(session.players()[0].walls_remaining(), 0);
        assert_eq!(session.players()[1].walls_remaining(), 0);
        assert_eq!(session.current_player_index(), 0);

        let spare = WallPlacement::vertical(7, 7);
        assert!(session.is_legal_wall_placement(spare));
        assert_eq!(
            session.request_wall(spare),
            Err(ActionError::NoWallsRemaining)
        );
    }

    /// Walks seat 0 north to row 0 and then east to its goal column while
    /// seat 1 steps back and forth.
    fn play_until_seat_zero_wins(session: &mut GameSession) -> Option<TurnOutcome> {
        let route = [(3, 0), (2, 0), (1, 0), (0, 0)]
            .into_iter()
            .chain((1..=8).map(|col| (0, col)));
        let mut shuffle = [(3, 8), (4, 8)].into_iter().cycle();
        let mut outcome = None;
        for (row, col) in route {
            outcome = Some(session.request_move(Position::new(row, col)).unwrap());
            if session.state().is_finished() {
                break;
            }
            let (row, col) = shuffle.next().unwrap();
            session.request_move(Position::new(row, col)).unwrap();
        }
        outcome
    }

    #[test]
    fn test_reaching_goal_finishes_game() {
        let mut session = seat_zero_first();
        let outcome = play_until_seat_zero_wins(&mut session);

        assert_eq!(outcome, Some(TurnOutcome::Won { winner: 0 }));
        assert_eq!(session.state(), SessionState::Finished { winner: 0 });
        assert_eq!(session.winner().map(Player::name), Some("Player 1"));
        assert_eq!(session.players()[0].position(), Position::new(0, 8));
        // The turn does not pass to the loser.
        assert_eq!(session.current_player_index(), 0);

        let finished = SessionState::Finished { winner: 0 };
        assert_eq!(
            session.request_move(Position::new(1, 8)),
            Err(ActionError::IllegalState(finished))
        );
        assert_eq!(
            session.request_wall(WallPlacement::vertical(5, 5)),
            Err(ActionError::IllegalState(finished))
        );
    }

    #[test]
    fn test_prepare_only_outside_running_game() {
        let mut session = seat_zero_first();
        session.request_wall(WallPlacement::vertical(3, 3)).unwrap();
        assert_eq!(
            session.prepare_game(2),
            Err(SetupError::IllegalState(SessionState::InProgress))
        );
        session.request_wall(WallPlacement::vertical(5, 5)).unwrap();

        play_until_seat_zero_wins(&mut session);
        assert!(session.state().is_finished());
        session.prepare_game(3).unwrap();
        assert!(session.state().is_configured());
        assert_eq!(session.board().walls().wall_count(), 0);
        assert_eq!(session.players()[0].position(), Position::new(4, 0));
        assert!(session.winner().is_none());
    }

    #[test]
    fn test_seed_hex_round_trip() {
        let seed = SessionSeed::from_u128(0xdead_beef);
        let text = seed.to_string();
        assert_eq!(text, "000000000000000000000000deadbeef");
        assert_eq!(text.parse::<SessionSeed>().unwrap(), seed);
        assert_eq!("beef".parse::<SessionSeed>().unwrap(), SessionSeed::from_u128(0xbeef));
        assert!("xyz".parse::<SessionSeed>().is_err());

        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, format!("\"{text}\""));
    }
}
