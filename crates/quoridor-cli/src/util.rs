use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use quoridor_engine::{GameState, Position, RunningGameState};

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_pretty(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_pretty(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a saved game state from a JSON file
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_snapshot_file<P>(path: P) -> anyhow::Result<GameState>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse snapshot JSON file: {}", path.display()))
}

/// Like [`read_snapshot_file`], but only accepts a game in progress.
pub fn read_running_snapshot<P>(path: P) -> anyhow::Result<RunningGameState>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match read_snapshot_file(path)? {
        GameState::Running(state) => Ok(state),
        GameState::Lobby(_) | GameState::Finished(_) => {
            anyhow::bail!("{} does not hold a running game", path.display())
        }
    }
}

/// Formats a cell the way players type it: 1-based `row col`.
pub fn one_based(at: Position) -> String {
    format!("{} {}", at.row + 1, at.col + 1)
}
