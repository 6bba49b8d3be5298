//! Win detection logic for tic-tac-toe.

use crate::{Board, Cell, Coord, Symbol};
use tracing::instrument;

/// The eight winning lines as `(row, col)` triples.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(symbol)` if the symbol has three in a row,
/// `None` otherwise.
#[instrument(level = "trace")]
pub fn check_winner(board: &Board) -> Option<Symbol> {
    let cell = |(row, col): (usize, usize)| {
        Coord::new(row, col)
            .map(|at| board.get(at))
            .unwrap_or(Cell::Empty)
    };

    for [a, b, c] in LINES {
        let first = cell(a);
        if let Cell::Marked(symbol) = first
            && first == cell(b)
            && first == cell(c)
        {
            return Some(symbol);
        }
    }

    None
}
