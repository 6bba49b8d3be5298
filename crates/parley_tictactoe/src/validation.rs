//! Legality checks for proposed moves.

use crate::{Board, Coord, Game, GameStatus};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Which seat a move comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Side {
    /// The human.
    Player,
    /// The text-generation oracle.
    Oracle,
}

/// Returns true when `side` may mark `(row, col)` right now.
///
/// The game must be in progress, the indices on the board, the cell empty and
/// the turn must belong to `side`.
#[instrument(level = "debug", skip(game), fields(game_id = %game.id(), status = ?game.status()))]
pub fn is_legal(game: &Game, row: usize, col: usize, side: Side) -> bool {
    if game.status() != GameStatus::InProgress {
        trace!("Game not in progress");
        return false;
    }

    let Some(at) = Coord::new(row, col) else {
        trace!("Coordinate off the board");
        return false;
    };

    if !game.board().is_empty(at) {
        trace!("Cell occupied");
        return false;
    }

    let mover = match side {
        Side::Player => game.player_symbol(),
        Side::Oracle => game.oracle_symbol(),
    };
    game.current_turn() == mover
}

/// Empty cells in row-major order.
pub fn legal_moves(board: &Board) -> Vec<Coord> {
    Coord::all().filter(|at| board.is_empty(*at)).collect()
}
