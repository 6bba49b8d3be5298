//! Move prompt construction.

use parley_tictactoe::{Board, Coord, Symbol};
use std::fmt::Write;

/// System prompt sent with every move request.
pub const MOVE_SYSTEM_PROMPT: &str = "You are playing Tic-Tac-Toe. \
Answer with a single legal move written as (row, col) and nothing else.";

/// Builds the move request for the oracle.
///
/// The text is a pure function of its inputs: the oracle's symbol, the board
/// as an ASCII grid and the legal moves one per line as `(row, col)`.
pub fn move_prompt(symbol: Symbol, board: &Board, legal: &[Coord]) -> String {
    let mut prompt = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "You are playing Tic-Tac-Toe as {symbol}.");
    let _ = writeln!(prompt, "Rows and columns are numbered 0 to 2; '-' is an empty cell.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Current board:");
    let _ = writeln!(prompt, "{}", board.to_ascii());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Legal moves:");
    for coord in legal {
        let _ = writeln!(prompt, "{coord}");
    }
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "Reply with exactly one of the legal moves in the form (row, col)."
    );
    prompt
}
