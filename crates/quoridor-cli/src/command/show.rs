use std::{io::Write, path::PathBuf};

use quoridor_engine::{GameSession, GameState, RunningGameState};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Path to a snapshot file (JSON)
    snapshot: PathBuf,
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let ShowArg { snapshot } = arg;
    let state = util::read_snapshot_file(snapshot)?;
    describe(&state, std::io::stdout().lock())
}

fn describe<W>(state: &GameState, mut out: W) -> anyhow::Result<()>
where
    W: Write,
{
    match state {
        GameState::Lobby(lobby) => {
            writeln!(out, "game {} is waiting in the lobby", lobby.id)?;
            writeln!(out, "host: {}", lobby.host)?;
            writeln!(out, "players: {}", lobby.players.join(", "))?;
        }
        GameState::Running(running) => describe_running(running, &mut out)?,
        GameState::Finished(finished) => {
            writeln!(out, "game {} is over, {} won", finished.id, finished.winner)?;
        }
    }
    Ok(())
}

fn describe_running<W>(state: &RunningGameState, mut out: W) -> anyhow::Result<()>
where
    W: Write,
{
    let session = GameSession::from_snapshot(state)?;
    writeln!(out, "game {}", state.id)?;
    writeln!(out, "{}", session.board())?;
    for (seat, player) in state.players.iter().enumerate() {
        let marker = if seat == state.current_player_index {
            '>'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker} {} {} ({}) at {}, {} walls left",
            seat + 1,
            player.name,
            player.color,
            util::one_based(player.position),
            player.walls
        )?;
    }

    let current = &state.players[state.current_player_index];
    let moves: Vec<_> = session
        .legal_destinations(current.position)?
        .iter()
        .map(|&at| util::one_based(at))
        .collect();
    writeln!(out, "{} can move to: {}", current.name, moves.join(", "))?;
    Ok(())
}
