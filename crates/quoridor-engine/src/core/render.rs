use std::fmt::{self, Write as _};

use super::{
    board::Board,
    position::{Direction, Position},
    wall::Intersection,
};

/// Draws the board with box-drawing characters.
///
/// Rows and columns are labelled 1-based, pieces show their 1-based seat
/// number, and wall segments are drawn with double lines (`║`, `═`). A wall's
/// anchor intersection is drawn as `╫` (vertical) or `╪` (horizontal).
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();

        let mut header = String::from("   ");
        for col in 1..=n {
            write!(header, "{col:<2}")?;
        }
        writeln!(f, "{}", header.trim_end())?;
        writeln!(f, "  ┌{}─┐", "─┬".repeat(n.saturating_sub(1)))?;

        for row in 0..n {
            let mut line = format!("{:>2}│", row + 1);
            for col in 0..n {
                let at = Position::new(row, col);
                line.push(cell_symbol(self, at));
                let blocked = col + 1 < n && self.is_step_blocked(at, Direction::Right);
                line.push(if blocked { '║' } else { '│' });
            }
            writeln!(f, "{line}")?;

            if row + 1 < n {
                let mut line = String::from("  ├");
                for col in 0..n {
                    let at = Position::new(row, col);
                    let blocked = self.is_step_blocked(at, Direction::Down);
                    line.push(if blocked { '═' } else { '─' });
                    line.push(match self.walls().get(at) {
                        _ if col + 1 == n => '┤',
                        Some(Intersection::Horizontal) => '╪',
                        Some(Intersection::Vertical) => '╫',
                        Some(Intersection::Empty) | None => '┼',
                    });
                }
                writeln!(f, "{line}")?;
            }
        }

        write!(f, "  └{}─┘", "─┴".repeat(n.saturating_sub(1)))
    }
}

fn cell_symbol(board: &Board, at: Position) -> char {
    match board.occupant_at(at) {
        Ok(Some(player)) => u32::try_from(player + 1)
            .ok()
            .and_then(|seat| char::from_digit(seat, 10))
            .unwrap_or('?'),
        Ok(None) | Err(_) => ' ',
    }
}

#[cfg(test)]
mod tests {
    use crate::core::wall::Orientation;

    use super::*;

    #[test]
    fn test_render_small_board() {
        let mut board = Board::new(3);
        board.place_occupant(0, Position::new(1, 0)).unwrap();
        board.place_occupant(1, Position::new(1, 2)).unwrap();
        board.set_wall(Position::new(0, 0), Orientation::Horizontal).unwrap();
        board.set_wall(Position::new(1, 1), Orientation::Vertical).unwrap();

        let expected = [
            "   1 2 3",
            "  ┌─┬─┬─┐",
            " 1│ │ │ │",
            "  ├═╪═┼─┤",
            " 2│1│ ║2│",
            "  ├─┼─╫─┤",
            " 3│ │ ║ │",
            "  └─┴─┴─┘",
        ]
        .join("\n");
        assert_eq!(board.to_string(), expected);
    }

    #[test]
    fn test_render_has_one_line_per_row_and_edge() {
        let board = Board::new(9);
        // header + top + 9 rows + 8 separators + bottom
        assert_eq!(board.to_string().lines().count(), 20);
    }
}
