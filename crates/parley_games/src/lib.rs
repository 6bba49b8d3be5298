//! Parley Games library - tic-tac-toe against a free-text oracle
//!
//! The oracle is any text generator (usually an LLM). Its replies are never
//! trusted: every move it proposes is parsed, checked against the legal moves
//! and, after a bounded number of attempts, replaced by a random legal move.
//!
//! # Architecture
//!
//! - **Controller**: [`GameController`] owns the game and runs the turn protocol
//! - **Resolver**: [`OpponentMoveResolver`] negotiates the oracle's move
//! - **Oracle**: [`GenerationOracle`] seam, with [`LlmOracle`] over OpenAI / Anthropic
//! - **Bridge**: [`ChatBridge`] seam to the host UI, with [`ConsoleBridge`] for terminals
//!
//! # Example
//!
//! ```no_run
//! use parley_games::{
//!     ConsoleBridge, ControllerSettings, Dice, GameController, LaunchSequence,
//!     OpponentMoveResolver, ResolverSettings, SilentOracle, SymbolChoice,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let oracle = Arc::new(SilentOracle);
//! let dice = Dice::seeded(7);
//! let resolver = OpponentMoveResolver::new(oracle.clone(), dice.clone(), ResolverSettings::default());
//! let bridge = Arc::new(ConsoleBridge::new(std::io::stdout(), oracle, "Oracle"));
//! let controller = GameController::new(
//!     resolver,
//!     bridge,
//!     dice,
//!     LaunchSequence::new(),
//!     ControllerSettings::default(),
//! );
//!
//! controller.start(SymbolChoice::X).await?;
//! controller.submit_player_move(1, 1).await;
//! controller.settle().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bridge;
mod config;
mod console;
mod controller;
mod dice;
mod instance;
mod llm_client;
mod oracle;
mod prompt;
mod reply;
mod resolver;
mod template;

// Crate-level exports - Turn controller
pub use controller::{
    ControllerError, ControllerSettings, GameController, Phase, SymbolChoice, final_message,
    outcome_text,
};

// Crate-level exports - Move negotiation
pub use prompt::{MOVE_SYSTEM_PROMPT, move_prompt};
pub use reply::{ParseStage, match_literal, match_pattern, parse_reply};
pub use resolver::{
    DEFAULT_ATTEMPTS, DEFAULT_MAX_OUTPUT_LENGTH, MoveSource, OpponentMoveResolver, Resolution,
    ResolveError, ResolverSettings,
};

// Crate-level exports - Oracle and LLM client
pub use llm_client::{CallOverrides, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use oracle::{GenerateRequest, GenerationOracle, LlmOracle, OracleError, SilentOracle};

// Crate-level exports - Host surface
pub use bridge::{BindError, BridgeError, ChatBridge, ContainerHandle, ContainerRequest};
pub use console::{
    CONSOLE_HELP, ConsoleBridge, ConsoleCommand, DEFAULT_COMMENTARY_TOKENS, parse_command,
    render_grid,
};
pub use instance::{DISPLAY_ORDER_BASE, INSTANCE_PREFIX, InstanceId, LaunchSequence};

// Crate-level exports - Support
pub use config::{ConfigError, ParleyConfig};
pub use dice::{Dice, RandomSource, SeededRandom};
pub use template::{DEFAULT_COMMENTARY_TEMPLATE, Template, TemplateContext, Variable};

// Crate-level exports - Game types (tic-tac-toe)
pub use parley_tictactoe::{
    Board, Cell, Coord, Game, GameStatus, Move, MoveError, Side, Symbol, Winner, is_legal,
    legal_moves,
};
