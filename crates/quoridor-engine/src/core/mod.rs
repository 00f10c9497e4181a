pub use self::{board::*, position::*, wall::*};

pub(crate) mod board;
pub(crate) mod position;
mod render;
pub(crate) mod wall;

/// Cells per side of a standard board.
pub const DEFAULT_BOARD_SIZE: usize = 9;
