//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from board storage
//! so the controller can run them after every mutation without side effects.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::{Board, Symbol};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Terminal condition of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// A symbol holds three in a line.
    Won(Symbol),
    /// The board is full and no line is complete.
    Draw,
    /// Play continues.
    Undetermined,
}

impl Verdict {
    /// True for `Won` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Verdict::Undetermined)
    }
}

/// Evaluates the board. Wins take priority over a full board.
#[instrument(level = "trace")]
pub fn evaluate(board: &Board) -> Verdict {
    if let Some(symbol) = check_winner(board) {
        return Verdict::Won(symbol);
    }
    if is_full(board) {
        return Verdict::Draw;
    }
    Verdict::Undetermined
}
