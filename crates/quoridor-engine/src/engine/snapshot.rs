use serde::{Deserialize, Serialize};

use crate::{
    OutOfBoundsError, SetupError,
    core::{Board, Intersection, Orientation, Position, WallGrid, WallPlacement},
};

use super::{
    game_session::{GameConfig, GameSession},
    player::{Player, PlayerColor},
};

/// One player as carried by a [`RunningGameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub position: Position,
    pub walls: usize,
    pub color: PlayerColor,
}

/// Snapshot of a game in progress.
///
/// The snapshot has no goal field; importing infers each goal from the
/// player's current cell (see [`Goal::infer`](super::Goal::infer)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningGameState {
    pub id: String,
    pub players: Vec<PlayerState>,
    pub current_player_index: usize,
    /// Intersection grid, `board_size - 1` rows of `board_size - 1` entries.
    pub placed_walls: Vec<Vec<Intersection>>,
}

impl RunningGameState {
    /// Size of the board this snapshot describes.
    #[must_use]
    pub fn board_size(&self) -> usize {
        self.placed_walls.len() + 1
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerState> {
        self.players.get(self.current_player_index)
    }
}

/// A game waiting for its host to start it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyGameState {
    pub id: String,
    pub host: String,
    pub players: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGameState {
    pub id: String,
    pub winner: String,
}

/// Externally visible state of a hosted game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Lobby(LobbyGameState),
    Running(RunningGameState),
    Finished(FinishedGameState),
}

impl GameState {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Lobby(lobby) => &lobby.id,
            Self::Running(running) => &running.id,
            Self::Finished(finished) => &finished.id,
        }
    }
}

/// Body of a move submitted to a game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub to: Position,
}

/// Body of a wall placement submitted to a game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRequest {
    pub target: Position,
    pub horizontal: bool,
}

impl WallRequest {
    #[must_use]
    pub fn placement(self) -> WallPlacement {
        WallPlacement::new(self.target, Orientation::from_horizontal(self.horizontal))
    }
}

impl From<WallPlacement> for WallRequest {
    fn from(placement: WallPlacement) -> Self {
        Self {
            target: placement.anchor,
            horizontal: placement.orientation.is_horizontal(),
        }
    }
}

/// Reasons a [`RunningGameState`] cannot be turned into a session.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SnapshotError {
    #[display("{_0}")]
    #[from]
    Setup(SetupError),
    #[display("wall grid must be square")]
    MalformedWalls,
    #[display("{_0}")]
    #[from]
    OutOfBounds(OutOfBoundsError),
    #[display("more than one player stands on {_0}")]
    SharedCell(#[error(not(source))] Position),
    #[display("current player index {_0} does not name a player")]
    InvalidCurrentPlayer(#[error(not(source))] usize),
}

impl GameSession {
    /// Exports the board, players and turn as a snapshot named `id`.
    #[must_use]
    pub fn to_snapshot(&self, id: impl Into<String>) -> RunningGameState {
        RunningGameState {
            id: id.into(),
            players: self
                .players()
                .iter()
                .map(|player| PlayerState {
                    name: player.name().to_owned(),
                    position: player.position(),
                    walls: player.walls_remaining(),
                    color: player.color(),
                })
                .collect(),
            current_player_index: self.current_player_index(),
            placed_walls: self.board().walls().to_rows(),
        }
    }

    /// Rebuilds a running session from a snapshot.
    ///
    /// Goals are inferred from the players' current cells, since the snapshot
    /// does not record them.
    pub fn from_snapshot(state: &RunningGameState) -> Result<Self, SnapshotError> {
        let size = state.board_size();
        GameConfig { board_size: size }.validate()?;
        let player_count = state.players.len();
        if !(2..=4).contains(&player_count) {
            return Err(SetupError::InvalidPlayerCount(player_count).into());
        }
        if state.current_player_index >= player_count {
            return Err(SnapshotError::InvalidCurrentPlayer(state.current_player_index));
        }

        let walls =
            WallGrid::from_rows(&state.placed_walls).ok_or(SnapshotError::MalformedWalls)?;
        let mut board = Board::with_walls(walls);
        let mut players = Vec::with_capacity(player_count);
        for (seat, player) in state.players.iter().enumerate() {
            let at = player.position;
            if board.occupant_at(at)?.is_some() {
                return Err(SnapshotError::SharedCell(at));
            }
            board.place_occupant(seat, at)?;
            players.push(Player::new(
                player.name.clone(),
                player.color,
                at,
                player.walls,
                size,
            ));
        }

        Ok(Self::in_progress(board, players, state.current_player_index))
    }

    /// Replaces this session's board, players and turn with a snapshot's.
    ///
    /// On error the session is left unchanged.
    pub fn import_snapshot(&mut self, state: &RunningGameState) -> Result<(), SnapshotError> {
        let imported = Self::from_snapshot(state)?;
        self.replace_position(imported);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::engine::{
        Goal,
        game_session::{SessionSeed, SessionState},
    };

    use super::*;

    fn running_session() -> GameSession {
        let mut session = GameSession::with_seed(SessionSeed::from_u128(11));
        session.prepare_game(3).unwrap();
        session.start_game();
        let mover = session.current_player().unwrap().position();
        let target = session.legal_destinations(mover).unwrap()[0];
        session.request_move(target).unwrap();
        session.request_wall(WallPlacement::vertical(2, 5)).unwrap();
        session
    }

    #[test]
    fn test_snapshot_round_trip() {
        let session = running_session();
        let snapshot = session.to_snapshot("ABCDEF");
        assert_eq!(snapshot.board_size(), 9);

        let restored = GameSession::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.board(), session.board());
        assert_eq!(
            restored.current_player_index(),
            session.current_player_index()
        );
        assert_eq!(restored.state(), SessionState::InProgress);
        for (a, b) in restored.players().iter().zip(session.players()) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.color(), b.color());
            assert_eq!(a.position(), b.position());
            assert_eq!(a.walls_remaining(), b.walls_remaining());
        }
        assert_eq!(restored.to_snapshot("ABCDEF"), snapshot);
    }

    #[test]
    fn test_import_keeps_session_on_error() {
        let mut session = running_session();
        let before = session.to_snapshot("X");

        let mut broken = before.clone();
        broken.current_player_index = 7;
        assert_eq!(
            session.import_snapshot(&broken),
            Err(SnapshotError::InvalidCurrentPlayer(7))
        );
        assert_eq!(session.to_snapshot("X"), before);

        let mut moved = before.clone();
        moved.players[0].walls = 0;
        session.import_snapshot(&moved).unwrap();
        assert_eq!(session.players()[0].walls_remaining(), 0);
    }

    #[test]
    fn test_import_rejects_malformed_snapshots() {
        let base = running_session().to_snapshot("X");

        let mut shared = base.clone();
        shared.players[1].position = shared.players[0].position;
        assert_eq!(
            GameSession::from_snapshot(&shared).unwrap_err(),
            SnapshotError::SharedCell(shared.players[0].position)
        );

        let mut outside = base.clone();
        outside.players[2].position = Position::new(9, 0);
        assert!(matches!(
            GameSession::from_snapshot(&outside),
            Err(SnapshotError::OutOfBounds(_))
        ));

        let mut ragged = base.clone();
        ragged.placed_walls[3].pop();
        assert_eq!(
            GameSession::from_snapshot(&ragged).unwrap_err(),
            SnapshotError::MalformedWalls
        );

        let mut lonely = base.clone();
        lonely.players.truncate(1);
        lonely.current_player_index = 0;
        assert_eq!(
            GameSession::from_snapshot(&lonely).unwrap_err(),
            SnapshotError::Setup(SetupError::InvalidPlayerCount(1))
        );

        let mut even = base;
        even.placed_walls.pop();
        for row in &mut even.placed_walls {
            row.pop();
        }
        assert_eq!(
            GameSession::from_snapshot(&even).unwrap_err(),
            SnapshotError::Setup(SetupError::InvalidBoardSize(8))
        );
    }

    #[test]
    fn test_import_infers_goal_from_current_cell() {
        let mut session = GameSession::with_seed(SessionSeed::from_u128(0));
        session.prepare_game(2).unwrap();
        let mut snapshot = session.to_snapshot("X");
        // Seat 0 started on the west edge but now stands on the north edge.
        snapshot.players[0].position = Position::new(0, 3);

        let restored = GameSession::from_snapshot(&snapshot).unwrap();
        let goal = restored.players()[0].goal();
        assert_eq!(goal, Goal::row(8));
    }

    #[test]
    fn test_running_state_wire_format() {
        let mut session = GameSession::with_seed(SessionSeed::from_u128(0));
        session.prepare_game(2).unwrap();
        let mut snapshot = session.to_snapshot("QWERTY");
        snapshot.placed_walls[0][1] = Orientation::Horizontal.into();
        let value = serde_json::to_value(GameState::Running(snapshot.clone())).unwrap();

        assert_eq!(value["phase"], "RUNNING");
        assert_eq!(value["id"], "QWERTY");
        assert_eq!(value["currentPlayerIndex"], 0);
        assert_eq!(
            value["players"][1],
            json!({
                "name": "Player 2",
                "position": { "first": 4, "second": 8 },
                "walls": 10,
                "color": "RED",
            })
        );
        assert_eq!(value["placedWalls"][0][0], "EMPTY");
        assert_eq!(value["placedWalls"][0][1], "HORIZONTAL");
        assert_eq!(value["placedWalls"].as_array().unwrap().len(), 8);

        let parsed: GameState = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, GameState::Running(snapshot));
    }

    #[test]
    fn test_lobby_and_finished_wire_format() {
        let lobby: GameState = serde_json::from_value(json!({
            "phase": "LOBBY",
            "id": "ABCDEF",
            "host": "ann",
            "players": ["ann", "bo"],
        }))
        .unwrap();
        assert!(lobby.is_lobby());
        assert_eq!(lobby.id(), "ABCDEF");

        let finished = GameState::Finished(FinishedGameState {
            id: "ABCDEF".into(),
            winner: "bo".into(),
        });
        assert_eq!(
            serde_json::to_value(&finished).unwrap(),
            json!({ "phase": "FINISHED", "id": "ABCDEF", "winner": "bo" })
        );
    }

    #[test]
    fn test_wall_request() {
        let placement = WallPlacement::horizontal(2, 6);
        let request = WallRequest::from(placement);
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({ "target": { "first": 2, "second": 6 }, "horizontal": true })
        );
        assert_eq!(request.placement(), placement);

        let vertical = WallRequest {
            target: Position::new(1, 1),
            horizontal: false,
        };
        assert_eq!(vertical.placement(), WallPlacement::vertical(1, 1));
    }
}
