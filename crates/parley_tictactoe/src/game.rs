//! Game state: board, turn, status and move history.
//!
//! [`Game`] enforces the structural invariants (empty target cell, strict
//! alternation, monotonic status). Whose seat may act is decided by
//! [`crate::validation`] before a caller reaches [`Game::place`].

use crate::rules::{self, Verdict};
use crate::{Board, Cell, Coord, Move, MoveError, Symbol};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Lifecycle status of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum GameStatus {
    /// Moves are accepted.
    InProgress,
    /// A symbol completed a line.
    Won,
    /// The board filled with no line.
    Draw,
    /// Stopped before a result.
    Aborted,
}

impl GameStatus {
    /// True for `Won`, `Draw` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Result recorded on a decided game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// This symbol won.
    Symbol(Symbol),
    /// Nobody won.
    Draw,
}

/// One game between the human and the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: String,
    board: Board,
    player_symbol: Symbol,
    current_turn: Symbol,
    status: GameStatus,
    winner: Option<Winner>,
    history: Vec<Move>,
}

impl Game {
    /// Creates an empty game. X always moves first.
    #[instrument(skip(id))]
    pub fn new(id: impl Into<String>, player_symbol: Symbol) -> Self {
        Self {
            id: id.into(),
            board: Board::new(),
            player_symbol,
            current_turn: Symbol::X,
            status: GameStatus::InProgress,
            winner: None,
            history: Vec::new(),
        }
    }

    /// Identifier assigned at creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The human's symbol.
    pub fn player_symbol(&self) -> Symbol {
        self.player_symbol
    }

    /// The oracle's symbol, always the complement of the player's.
    pub fn oracle_symbol(&self) -> Symbol {
        self.player_symbol.opponent()
    }

    /// Symbol allowed to move next.
    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Set exactly when the status is `Won` or `Draw`.
    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Moves in the order they were played.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// True when the player's symbol is to move on a live game.
    pub fn is_player_turn(&self) -> bool {
        self.status == GameStatus::InProgress && self.current_turn == self.player_symbol
    }

    /// Marks `at` for the symbol to move, then evaluates the board.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] when the game is terminal and
    /// [`MoveError::CellOccupied`] when the cell already holds a mark.
    #[instrument(skip(self), fields(game_id = %self.id, symbol = %self.current_turn))]
    pub fn place(&mut self, at: Coord) -> Result<Move, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if !self.board.is_empty(at) {
            return Err(MoveError::CellOccupied(at));
        }

        let mv = Move::new(at, self.current_turn, self.history.len() + 1);
        self.board.set(at, Cell::Marked(mv.symbol()));
        self.history.push(mv);
        self.current_turn = mv.symbol().opponent();

        match rules::evaluate(&self.board) {
            Verdict::Won(symbol) => {
                self.status = GameStatus::Won;
                self.winner = Some(Winner::Symbol(symbol));
            }
            Verdict::Draw => {
                self.status = GameStatus::Draw;
                self.winner = Some(Winner::Draw);
            }
            Verdict::Undetermined => {}
        }

        debug!(%mv, status = %self.status, "Move applied");
        Ok(mv)
    }

    /// Reverts the oracle's last reply and the player's move before it.
    ///
    /// # Errors
    ///
    /// Fails when the game is terminal, fewer than two moves were played, or
    /// the oracle is to move.
    #[instrument(skip(self), fields(game_id = %self.id, moves = self.history.len()))]
    pub fn undo_last_two(&mut self) -> Result<[Move; 2], MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if self.current_turn != self.player_symbol {
            return Err(MoveError::UndoOutOfTurn(self.current_turn));
        }
        let len = self.history.len();
        if len < 2 {
            return Err(MoveError::NothingToUndo(len));
        }

        let reply = self.history.remove(len - 1);
        let played = self.history.remove(len - 2);
        for mv in [reply, played] {
            self.board.set(mv.coord(), Cell::Empty);
        }
        self.current_turn = self.player_symbol;
        self.status = GameStatus::InProgress;
        self.winner = None;

        debug!(remaining = self.history.len(), "Undid last two moves");
        Ok([reply, played])
    }

    /// Stops a live game without a result. Returns false if already terminal.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn abort(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = GameStatus::Aborted;
        self.winner = None;
        true
    }
}
