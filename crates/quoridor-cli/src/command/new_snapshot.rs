use std::path::PathBuf;

use quoridor_engine::{GameConfig, GameSession, GameState, SessionSeed};
use tracing::info;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct NewSnapshotArg {
    /// Number of players (2 to 4)
    #[arg(long, default_value_t = 2)]
    players: usize,
    /// Cells per side of the board (odd, at least 3)
    #[arg(long, default_value_t = GameConfig::default().board_size)]
    board_size: usize,
    /// Seed for picking the starting player, as hex
    #[arg(long)]
    seed: Option<SessionSeed>,
    /// Id recorded in the snapshot
    #[arg(long, default_value = "LOCAL")]
    id: String,
    /// Output file path; stdout if omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &NewSnapshotArg) -> anyhow::Result<()> {
    let NewSnapshotArg {
        players,
        board_size,
        seed,
        id,
        output,
    } = arg;

    let config = GameConfig {
        board_size: *board_size,
    };
    let mut session = GameSession::with_config(config, seed.unwrap_or_else(rand::random))?;
    session.prepare_game(*players)?;
    session.start_game();
    info!(players, first_player = session.current_player_index(), "game created");

    util::write_json(&GameState::Running(session.to_snapshot(id)), output.as_deref())
}
