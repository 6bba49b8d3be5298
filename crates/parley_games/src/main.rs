//! Parley - terminal host
//!
//! Plays one game of tic-tac-toe against a configured LLM (or offline against
//! random moves), reading commands from stdin.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use parley_games::{
    Board, CONSOLE_HELP, ConsoleBridge, ConsoleCommand, Dice, GameController, GenerationOracle,
    LaunchSequence, LlmClient, LlmOracle, OpponentMoveResolver, ParleyConfig, Phase,
    SilentOracle, Symbol, SymbolChoice, legal_moves, move_prompt, parse_command,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,parley_games=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            symbol,
            seed,
            offline,
        } => run_play(config, symbol, seed, offline).await,
        Command::Prompt { board, symbol } => run_prompt(&board, symbol),
    }
}

/// Plays one game on stdin/stdout.
#[instrument(skip(config_path, symbol))]
async fn run_play(
    config_path: Option<PathBuf>,
    symbol: Option<SymbolChoice>,
    seed: Option<u64>,
    offline: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ParleyConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ParleyConfig::default(),
    };
    let config = match symbol {
        Some(choice) => config.with_symbol(choice),
        None => config,
    };

    let dice = seed.map_or_else(Dice::from_entropy, Dice::seeded);
    let oracle: Arc<dyn GenerationOracle> = if offline {
        info!("Offline mode, oracle moves will be random");
        Arc::new(SilentOracle)
    } else {
        let llm = config.create_llm_config()?;
        info!(provider = %llm.provider(), model = %llm.model(), "Using LLM oracle");
        Arc::new(LlmOracle::new(LlmClient::new(llm)))
    };

    let resolver =
        OpponentMoveResolver::new(oracle.clone(), dice.clone(), config.resolver_settings());
    let bridge = Arc::new(
        ConsoleBridge::new(std::io::stdout(), oracle, config.oracle_name().clone())
            .with_commentary_tokens(*config.llm_max_tokens()),
    );
    let controller = GameController::new(
        resolver,
        bridge.clone(),
        dice,
        LaunchSequence::new(),
        config.controller_settings(),
    );

    let player_symbol = controller.start(*config.symbol()).await?;
    bridge.emit(&format!("You play {player_symbol}."));
    controller.settle().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !is_over(controller.phase()) {
        let Some(line) = lines.next_line().await? else {
            info!("Input closed, aborting game");
            controller.abort().await;
            break;
        };

        match parse_command(&line) {
            Some(ConsoleCommand::Move { row, col }) => {
                if !controller.submit_player_move(row, col).await {
                    bridge.emit("That move is not available right now.");
                }
            }
            Some(ConsoleCommand::Undo) => {
                if !controller.undo_last_two_moves() {
                    bridge.emit("Nothing to undo.");
                }
            }
            Some(ConsoleCommand::Abort) | Some(ConsoleCommand::Quit) => {
                controller.abort().await;
            }
            Some(ConsoleCommand::Help) => bridge.emit(CONSOLE_HELP),
            None => {
                warn!(line = %line, "Unrecognized input");
                bridge.emit(CONSOLE_HELP);
            }
        }
        controller.settle().await;
    }

    controller.settle().await;
    let purged = bridge.purge_orphaned_prompts();
    info!(phase = %controller.phase(), purged, "Session finished");
    Ok(())
}

fn is_over(phase: Phase) -> bool {
    matches!(phase, Phase::Won | Phase::Draw | Phase::Aborted)
}

/// Prints the oracle prompt for a board.
fn run_prompt(layout: &str, symbol: Symbol) -> Result<()> {
    let board = Board::from_layout(layout)
        .with_context(|| format!("invalid board layout {layout:?}; expected e.g. \"X--/-O-/---\""))?;
    println!("{}", move_prompt(symbol, &board, &legal_moves(&board)));
    Ok(())
}
