//! Parsing of free-text oracle replies into moves.
//!
//! Two stages, first match wins:
//! 1. the first `(r, c)`-like pattern in the trimmed reply, if it is legal;
//! 2. the first legal move whose literal `"(r, c)"` or `"r,c"` appears anywhere.

use parley_tictactoe::Coord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Optional `(`, digit, optional spaces, `,`, optional spaces, digit, optional `)`.
static MOVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?([0-9])\s*,\s*([0-9])\)?").expect("move pattern is a valid literal regex")
});

/// Which parsing stage produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ParseStage {
    /// The regex matched a legal pair.
    Pattern,
    /// A legal move's literal text appeared in the reply.
    Literal,
}

/// Interprets `reply` as one of `legal`, or `None`.
pub fn parse_reply(reply: &str, legal: &[Coord]) -> Option<(Coord, ParseStage)> {
    if let Some(coord) = match_pattern(reply, legal) {
        return Some((coord, ParseStage::Pattern));
    }
    match_literal(reply, legal).map(|coord| (coord, ParseStage::Literal))
}

/// Stage one: first regex match, accepted only if legal.
pub fn match_pattern(reply: &str, legal: &[Coord]) -> Option<Coord> {
    let captures = MOVE_PATTERN.captures(reply.trim())?;
    let digit = |i: usize| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<usize>().ok())
    };
    let coord = Coord::new(digit(1)?, digit(2)?)?;
    let accepted = legal.contains(&coord);
    trace!(%coord, accepted, "Pattern matched");
    accepted.then_some(coord)
}

/// Stage two: first legal move, in list order, whose literal appears.
pub fn match_literal(reply: &str, legal: &[Coord]) -> Option<Coord> {
    legal.iter().copied().find(|coord| {
        let spaced = format!("({}, {})", coord.row(), coord.col());
        let compact = format!("{},{}", coord.row(), coord.col());
        reply.contains(&spaced) || reply.contains(&compact)
    })
}
