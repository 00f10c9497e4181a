use std::path::PathBuf;

use quoridor_engine::{Orientation, Position, WallPlacement};

pub(super) const HELP: &str = "\
commands (rows and columns start at 1):
  move R C        move your piece to row R, column C
  wall h|v R C    place a horizontal or vertical wall at intersection R, C
  moves           list the cells you can move to
  board           show the board again
  save FILE       write the game to FILE as JSON
  help            show this message
  quit            leave the game";

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Command {
    Move(Position),
    Wall(WallPlacement),
    Moves,
    Board,
    Save(PathBuf),
    Help,
    Quit,
}

impl Command {
    pub(super) fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err("type a command, or `help`".to_owned());
        };
        let args: Vec<&str> = words.collect();
        let command = match (keyword, args.as_slice()) {
            ("move" | "m", [row, col]) => Self::Move(parse_cell(row, col)?),
            ("wall" | "w", [orientation, row, col]) => {
                let orientation = match *orientation {
                    "h" | "horizontal" => Orientation::Horizontal,
                    "v" | "vertical" => Orientation::Vertical,
                    other => return Err(format!("unknown wall orientation `{other}`")),
                };
                Self::Wall(WallPlacement::new(parse_cell(row, col)?, orientation))
            }
            ("moves", []) => Self::Moves,
            ("board", []) => Self::Board,
            ("save", [path]) => Self::Save(PathBuf::from(path)),
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("move" | "m" | "wall" | "w" | "moves" | "board" | "save" | "help" | "quit", _) => {
                return Err(format!("wrong arguments for `{keyword}`, see `help`"));
            }
            _ => return Err(format!("unknown command `{keyword}`, see `help`")),
        };
        Ok(command)
    }
}

fn parse_cell(row: &str, col: &str) -> Result<Position, String> {
    Ok(Position::new(parse_coordinate(row)?, parse_coordinate(col)?))
}

fn parse_coordinate(text: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| format!("`{text}` is not a coordinate (they start at 1)"))
}
