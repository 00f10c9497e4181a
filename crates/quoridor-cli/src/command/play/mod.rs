use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use quoridor_engine::{
    GameController, GameSession, GameState, GameView, InMemoryGameService, LocalGame,
    OnlineGame, SessionSeed,
};
use tracing::info;

use crate::{config::GameSettings, util};

use self::input::{Command, HELP};

mod input;

/// Id under which a local game is saved.
const LOCAL_GAME_ID: &str = "LOCAL";

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Number of players (2 to 4)
    #[arg(long)]
    players: Option<usize>,
    /// Cells per side of the board (odd, at least 3)
    #[arg(long)]
    board_size: Option<usize>,
    /// Seed for picking the starting player, as hex
    #[arg(long)]
    seed: Option<SessionSeed>,
    /// TOML file with `board_size`, `players` and `seed`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resume a game saved with `save`
    #[arg(long, conflicts_with = "via_service")]
    load: Option<PathBuf>,
    /// Route every action through an in-memory game service
    #[arg(long)]
    via_service: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        players,
        board_size,
        seed,
        config,
        load,
        via_service,
    } = arg;

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    if let Some(path) = load {
        let mut games = [resume(path)?];
        return play(&mut games, stdin, stdout);
    }

    let settings = GameSettings::resolve(config.as_deref(), *board_size, *players, *seed)?;
    if *via_service {
        let service = match settings.seed {
            Some(seed) => InMemoryGameService::with_config(settings.config, seed)?,
            None => InMemoryGameService::with_config(settings.config, rand::random())?,
        };
        let mut seats = seat_players(&service, settings.players)?;
        play(&mut seats, stdin, stdout)
    } else {
        let mut session = match settings.seed {
            Some(seed) => GameSession::with_config(settings.config, seed)?,
            None => GameSession::with_config(settings.config, rand::random())?,
        };
        session.prepare_game(settings.players)?;
        session.start_game();
        let mut games = [LocalGame::new(LOCAL_GAME_ID, session)];
        play(&mut games, stdin, stdout)
    }
}

/// Loads a game saved with `save` so play can continue where it stopped.
fn resume(path: &Path) -> anyhow::Result<LocalGame> {
    let state = util::read_running_snapshot(path)?;
    let session = GameSession::from_snapshot(&state)
        .with_context(|| format!("Failed to resume game from {}", path.display()))?;
    info!(path = %path.display(), "game resumed");
    Ok(LocalGame::new(state.id, session))
}

/// Opens a lobby on `service`, seats `Player 1` to `Player N` and starts it.
fn seat_players(
    service: &InMemoryGameService,
    players: usize,
) -> anyhow::Result<Vec<OnlineGame<&InMemoryGameService>>> {
    let mut host = OnlineGame::new(service);
    let code = host.create("Player 1")?.to_owned();
    let mut seats = vec![];
    for n in 2..=players {
        let mut guest = OnlineGame::new(service);
        guest.join(&code, &format!("Player {n}"))?;
        seats.push(guest);
    }
    host.start()?;
    info!(game_id = %code, players, "hosted game started");
    seats.insert(0, host);
    Ok(seats)
}

/// Runs the read-eval loop until the game ends, input runs out or a player quits.
///
/// Each turn is read by whichever controller acts for the current player.
fn play<C, R, W>(controllers: &mut [C], input: R, mut out: W) -> anyhow::Result<()>
where
    C: GameController,
    C::Error: Error + Send + Sync + 'static,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    let mut show_board = true;
    writeln!(out, "type `help` for commands")?;

    loop {
        for controller in controllers.iter_mut() {
            controller.refresh()?;
        }
        let Some(first) = controllers.first() else {
            anyhow::bail!("no players to play with");
        };
        let state = match first.view() {
            GameView::Running(state) => state,
            GameView::Finished { winner } => {
                writeln!(out, "{winner} wins!")?;
                return Ok(());
            }
            GameView::Loading | GameView::Lobby(_) => anyhow::bail!("the game has not started"),
        };
        let board = GameSession::from_snapshot(&state)?.board().clone();
        let player = state
            .current_player()
            .context("snapshot has no current player")?;
        let controller = controllers
            .iter_mut()
            .find(|c| c.acts_for(player))
            .context("no seat acts for the current player")?;

        if show_board {
            writeln!(out, "{board}")?;
            show_board = false;
        }
        write!(
            out,
            "{} ({}, {} walls left)> ",
            player.name, player.color, player.walls
        )?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            return Ok(());
        };
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        match command {
            Command::Move(to) => match controller.request_move(to) {
                Ok(()) => show_board = true,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Wall(placement) => match controller.request_wall(placement) {
                Ok(()) => show_board = true,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Moves => {
                let cells: Vec<_> = controller
                    .legal_destinations(player.position)?
                    .iter()
                    .map(|&at| util::one_based(at))
                    .collect();
                writeln!(out, "{}", cells.join(", "))?;
            }
            Command::Board => writeln!(out, "{board}")?,
            Command::Save(path) => {
                util::write_json(&GameState::Running(state.clone()), Some(&path))?;
                writeln!(out, "saved to {}", path.display())?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use quoridor_engine::{Intersection, RunningGameState, WallPlacement};

    use super::*;

    fn local_game(players: usize, seed: u128) -> LocalGame {
        let mut session = GameSession::with_seed(SessionSeed::from_u128(seed));
        session.prepare_game(players).unwrap();
        session.start_game();
        LocalGame::new(LOCAL_GAME_ID, session)
    }

    fn running_state<C: GameController>(controller: &C) -> RunningGameState {
        controller.view().running().cloned().unwrap()
    }

    fn run_script<C>(controllers: &mut [C], script: &str) -> String
    where
        C: GameController,
        C::Error: Error + Send + Sync + 'static,
    {
        let mut out = Vec::new();
        play(controllers, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_walls_and_errors_are_reported() {
        let mut games = [local_game(2, 1)];
        let output = run_script(&mut games, "wall h 1 1\nwall h 1 1\nmove 9 9\nfly\nquit\n");

        assert!(output.contains("horizontal wall at (0, 0) is not a legal placement"));
        assert!(output.contains("(8, 8) is not a legal destination"));
        assert!(output.contains("unknown command `fly`"));
        let state = running_state(&games[0]);
        let walls: usize = state.players.iter().map(|p| p.walls).sum();
        assert_eq!(walls, 19);
    }

    #[test]
    fn test_moves_lists_one_based_cells() {
        let mut games = [local_game(2, 2)];
        let at = running_state(&games[0]).current_player().unwrap().position;
        let output = run_script(&mut games, "moves\n");

        let expected: Vec<_> = games[0]
            .legal_destinations(at)
            .unwrap()
            .iter()
            .map(|&cell| util::one_based(cell))
            .collect();
        assert!(output.contains(&expected.join(", ")));
        // The board was printed once, before the first prompt.
        assert_eq!(output.matches('└').count(), 1);
    }

    #[test]
    fn test_game_runs_to_a_winner() {
        let mut games = [local_game(2, 3)];
        // Seat 0 walks east along row 5 while seat 1 steps between rows 6 and 7.
        let east: Vec<_> = (2..=9).map(|col| format!("move 5 {col}")).collect();
        let shuffle: Vec<_> = (0..8)
            .map(|i| format!("move {} 9", if i % 2 == 0 { 6 } else { 7 }))
            .collect();
        let seat_zero_first = games[0].session().current_player_index() == 0;
        let mut script = String::new();
        for (a, b) in east.iter().zip(&shuffle) {
            let (first, second) = if seat_zero_first { (a, b) } else { (b, a) };
            script.push_str(&format!("{first}\n{second}\n"));
        }

        let output = run_script(&mut games, &script);
        assert!(output.contains("Player 1 wins!"));
        assert_eq!(games[0].winner().as_deref(), Some("Player 1"));
    }

    #[test]
    fn test_saved_game_resumes() {
        let path = std::env::temp_dir()
            .join(format!("quoridor-resume-{}.json", std::process::id()));
        let mut games = [local_game(2, 5)];
        let first = running_state(&games[0]).current_player_index;
        let script = format!("wall v 3 3\nsave {}\nquit\n", path.display());
        let output = run_script(&mut games, &script);
        assert!(output.contains("saved to"));

        let mut resumed = [resume(&path).unwrap()];
        std::fs::remove_file(&path).unwrap();
        let state = running_state(&resumed[0]);
        assert_eq!(state, running_state(&games[0]));
        assert_eq!(state.current_player_index, 1 - first);
        assert_eq!(state.placed_walls[2][2], Intersection::Vertical);

        // The wall is still there, and the other seat is on turn.
        let output = run_script(&mut resumed, "wall v 3 3\nquit\n");
        assert!(output.contains("vertical wall at (2, 2) is not a legal placement"));
        let player = state.current_player().unwrap();
        assert!(output.contains(&format!("{} ({}, 10 walls left)> ", player.name, player.color)));
    }

    #[test]
    fn test_service_seats_take_turns() {
        let service = InMemoryGameService::with_seed(SessionSeed::from_u128(4));
        let mut seats = seat_players(&service, 3).unwrap();
        assert_eq!(seats.len(), 3);

        let before = running_state(&seats[0]);
        let output = run_script(&mut seats, "wall v 2 2\nwall v 6 6\nboard\n");
        assert!(!output.contains("not your turn"));

        let after = running_state(&seats[0]);
        let walls =
            |state: &RunningGameState| -> usize { state.players.iter().map(|p| p.walls).sum() };
        assert_eq!(walls(&before) - walls(&after), 2);
        assert_eq!(
            after.current_player_index,
            (before.current_player_index + 2) % 3
        );
        assert_eq!(after.placed_walls[1][1], Intersection::Vertical);
        assert!(!seats[0].is_legal_wall_placement(WallPlacement::vertical(1, 1)));
    }
}
