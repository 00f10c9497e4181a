use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{
    check_wall::CheckWallArg, new_snapshot::NewSnapshotArg, play::PlayArg, show::ShowArg,
};

mod check_wall;
mod new_snapshot;
mod play;
mod show;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a hot-seat game in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Print a saved game snapshot and the legal moves of the player to act
    Show(#[clap(flatten)] ShowArg),
    /// Check whether a wall could be placed in a saved game
    CheckWall(#[clap(flatten)] CheckWallArg),
    /// Write the snapshot of a freshly started game as JSON
    NewSnapshot(#[clap(flatten)] NewSnapshotArg),
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();

    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Show(arg) => show::run(&arg)?,
        Mode::CheckWall(arg) => check_wall::run(&arg)?,
        Mode::NewSnapshot(arg) => new_snapshot::run(&arg)?,
    }
    Ok(())
}

/// Logs to stderr so diagnostics never mix with game output.
///
/// Defaults to `warn`; set `RUST_LOG` (e.g. `RUST_LOG=quoridor_engine=debug`)
/// for more.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}
