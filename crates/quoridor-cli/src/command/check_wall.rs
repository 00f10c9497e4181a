use std::{io::Write, path::PathBuf};

use quoridor_engine::{GameSession, Orientation, Position, RunningGameState, WallPlacement};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CheckWallArg {
    /// Path to a snapshot file (JSON) holding a running game
    snapshot: PathBuf,
    /// Intersection row, starting at 1
    row: usize,
    /// Intersection column, starting at 1
    col: usize,
    /// Check a horizontal wall
    #[arg(long, conflicts_with = "vertical", required_unless_present = "vertical")]
    horizontal: bool,
    /// Check a vertical wall
    #[arg(long)]
    vertical: bool,
}

pub(crate) fn run(arg: &CheckWallArg) -> anyhow::Result<()> {
    let CheckWallArg {
        snapshot,
        row,
        col,
        horizontal,
        vertical: _,
    } = arg;

    let (Some(row), Some(col)) = (row.checked_sub(1), col.checked_sub(1)) else {
        anyhow::bail!("coordinates start at 1");
    };
    let state = util::read_running_snapshot(snapshot)?;
    let placement = WallPlacement::new(
        Position::new(row, col),
        Orientation::from_horizontal(*horizontal),
    );
    check(&state, placement, std::io::stdout().lock())
}

fn check<W>(state: &RunningGameState, placement: WallPlacement, mut out: W) -> anyhow::Result<()>
where
    W: Write,
{
    let session = GameSession::from_snapshot(state)?;
    let verdict = if session.is_legal_wall_placement(placement) {
        "legal"
    } else {
        "illegal"
    };
    writeln!(out, "{placement} is {verdict}")?;
    Ok(())
}
