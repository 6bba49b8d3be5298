//! Turns oracle free text into a legal move, always.
//!
//! Each resolution asks the oracle up to `attempts` times with the same
//! prompt. Call failures, timeouts and unusable replies all burn an attempt.
//! When every attempt is spent, a legal move is drawn uniformly from the dice.

use crate::dice::Dice;
use crate::oracle::{GenerateRequest, GenerationOracle, OracleError};
use crate::prompt::{MOVE_SYSTEM_PROMPT, move_prompt};
use crate::reply::{ParseStage, parse_reply};
use derive_getters::Getters;
use derive_setters::Setters;
use parley_tictactoe::{Board, Coord, Symbol, legal_moves};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Oracle calls per resolution before falling back.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Output budget for a move reply; replies are expected to be a few tokens.
pub const DEFAULT_MAX_OUTPUT_LENGTH: u32 = 16;

/// Tuning for [`OpponentMoveResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct ResolverSettings {
    /// Oracle calls before the random fallback. Values below 1 act as 1.
    attempts: usize,
    /// Output budget passed to the oracle.
    max_output_length: u32,
    /// Wall-clock limit per oracle call; `None` waits indefinitely.
    #[setters(strip_option)]
    timeout: Option<Duration>,
    /// Backend override forwarded to the oracle.
    #[setters(strip_option)]
    api_override: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
            timeout: None,
            api_override: None,
        }
    }
}

/// Where a resolved move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSource {
    /// Parsed from the reply to the given 1-based attempt.
    Parsed {
        /// Attempt that produced the reply.
        attempt: usize,
        /// Parsing stage that matched.
        stage: ParseStage,
    },
    /// Drawn at random after every attempt failed.
    Fallback,
}

/// A legal move chosen for the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Cell to mark.
    pub coord: Coord,
    /// How it was obtained.
    pub source: MoveSource,
}

/// Resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ResolveError {
    /// The board has no empty cell.
    #[display("No legal moves available")]
    NoLegalMoves,
}

impl std::error::Error for ResolveError {}

/// Negotiates the oracle's move.
#[derive(Clone)]
pub struct OpponentMoveResolver {
    oracle: Arc<dyn GenerationOracle>,
    dice: Dice,
    settings: ResolverSettings,
}

impl OpponentMoveResolver {
    /// Creates a resolver over an oracle and a dice handle.
    pub fn new(oracle: Arc<dyn GenerationOracle>, dice: Dice, settings: ResolverSettings) -> Self {
        Self {
            oracle,
            dice,
            settings,
        }
    }

    /// Resolver settings.
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Picks a legal move for `symbol` on `board`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoLegalMoves`] only for a full board.
    #[instrument(skip(self, board, symbol), fields(symbol = %symbol))]
    pub async fn resolve(&self, board: &Board, symbol: Symbol) -> Result<Resolution, ResolveError> {
        let legal = legal_moves(board);
        if legal.is_empty() {
            warn!("Asked to resolve a move on a full board");
            return Err(ResolveError::NoLegalMoves);
        }

        let request = self.request_for(symbol, board, &legal);
        let attempts = self.settings.attempts.max(1);

        for attempt in 1..=attempts {
            match self.ask(&request).await {
                Ok(reply) => match parse_reply(&reply, &legal) {
                    Some((coord, stage)) => {
                        info!(attempt, %coord, %stage, "Oracle move accepted");
                        return Ok(Resolution {
                            coord,
                            source: MoveSource::Parsed { attempt, stage },
                        });
                    }
                    None => warn!(attempt, reply = %reply, "Oracle reply held no legal move"),
                },
                Err(e) => warn!(attempt, error = %e, "Oracle call failed"),
            }
        }

        let coord = self
            .dice
            .choose(&legal)
            .copied()
            .ok_or(ResolveError::NoLegalMoves)?;
        info!(attempts, %coord, "Attempts exhausted, playing random legal move");
        Ok(Resolution {
            coord,
            source: MoveSource::Fallback,
        })
    }

    fn request_for(&self, symbol: Symbol, board: &Board, legal: &[Coord]) -> GenerateRequest {
        let request = GenerateRequest::new(move_prompt(symbol, board, legal))
            .with_system_prompt_override(MOVE_SYSTEM_PROMPT.to_string())
            .with_max_output_length(self.settings.max_output_length);
        match &self.settings.api_override {
            Some(api) => request.with_api_override(api.clone()),
            None => request,
        }
    }

    async fn ask(&self, request: &GenerateRequest) -> Result<String, OracleError> {
        let call = self.oracle.generate(request);
        match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                debug!(?limit, "Oracle call timed out");
                OracleError::new(format!("Oracle did not answer within {:?}", limit))
            })?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for OpponentMoveResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpponentMoveResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
