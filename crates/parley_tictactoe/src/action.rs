//! First-class move records.
//!
//! A move is the recorded placement of a symbol. Once pushed onto a game's
//! history it is never edited, only popped by an undo.

use crate::{Coord, Symbol};
use serde::{Deserialize, Serialize};

/// A placement recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    coord: Coord,
    symbol: Symbol,
    sequence: usize,
}

impl Move {
    pub(crate) fn new(coord: Coord, symbol: Symbol, sequence: usize) -> Self {
        Self {
            coord,
            symbol,
            sequence,
        }
    }

    /// Where the mark was placed.
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Row of the placement.
    pub fn row(&self) -> usize {
        self.coord.row()
    }

    /// Column of the placement.
    pub fn col(&self) -> usize {
        self.coord.col()
    }

    /// The symbol that moved.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// 1-based position in the history.
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} -> {}", self.sequence, self.symbol, self.coord)
    }
}

/// Error that can occur when applying or reverting a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(Coord),

    /// The game is no longer in progress.
    #[display("Game is already over")]
    GameOver,

    /// Undo needs at least two moves on the stack.
    #[display("Not enough moves to undo ({} recorded)", _0)]
    NothingToUndo(usize),

    /// Undo is only allowed when the given symbol is to move.
    #[display("Undo is not allowed while {} is to move", _0)]
    UndoOutOfTurn(Symbol),
}

impl std::error::Error for MoveError {}
