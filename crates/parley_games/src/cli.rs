//! Command-line interface for parley.

use clap::{Parser, Subcommand};
use parley_games::{Symbol, SymbolChoice};
use std::path::PathBuf;

/// Parley - tic-tac-toe against an LLM that answers in free text
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Play tic-tac-toe against an LLM oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game in the terminal
    Play {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Your symbol: x, o or random (overrides the config file)
        #[arg(long)]
        symbol: Option<SymbolChoice>,

        /// Seed for symbol assignment, fallback moves and template picks
        #[arg(long)]
        seed: Option<u64>,

        /// Play without an LLM; every oracle move is random
        #[arg(long)]
        offline: bool,
    },

    /// Print the move prompt the oracle would receive for a board
    Prompt {
        /// Board rows separated by '/', e.g. "X--/-O-/---"
        #[arg(long)]
        board: String,

        /// Symbol the oracle plays
        #[arg(long, default_value = "o")]
        symbol: Symbol,
    },
}
