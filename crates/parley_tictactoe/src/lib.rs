//! Pure tic-tac-toe game logic.
//!
//! - [`Board`], [`Cell`], [`Coord`] and [`Symbol`] describe the grid.
//! - [`Game`] owns the board, turn, status and [`Move`] history.
//! - [`rules::evaluate`] decides terminal conditions.
//! - [`validation`] answers whether a seat may move at a coordinate.
//!
//! Nothing here performs I/O or awaits; the async turn protocol lives in
//! `parley_games`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
pub mod rules;
mod types;
pub mod validation;

pub use action::{Move, MoveError};
pub use game::{Game, GameStatus, Winner};
pub use rules::Verdict;
pub use types::{Board, Cell, Coord, SIDE, Symbol};
pub use validation::{Side, is_legal, legal_moves};
