//! Terminal host: a [`ChatBridge`] that writes to any [`Write`] sink.
//!
//! Commentary prompts are answered by the same oracle that plays and the reply
//! is printed under the oracle's name. Outstanding prompt keys are tracked so
//! leftovers from vanished games can be purged the way a chat host would on
//! chat change.

use crate::bridge::{BindError, BridgeError, ChatBridge, ContainerHandle, ContainerRequest};
use crate::instance::InstanceId;
use crate::oracle::{GenerateRequest, GenerationOracle};
use async_trait::async_trait;
use parley_tictactoe::{Board, SIDE};
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

/// Output budget for a commentary reply.
pub const DEFAULT_COMMENTARY_TOKENS: u32 = 150;

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Click on a cell.
    Move {
        /// Row, 0-based.
        row: usize,
        /// Column, 0-based.
        col: usize,
    },
    /// Take back the last two moves.
    Undo,
    /// Stop the game without a result.
    Abort,
    /// Abort and leave.
    Quit,
    /// Print the command list.
    Help,
}

/// Help text for [`ConsoleCommand`].
pub const CONSOLE_HELP: &str = "Commands: `row col` (e.g. `1 2`), undo, abort, quit, help";

/// Parses one input line. Accepts `1 2`, `1,2` and `(1, 2)` for moves.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "undo" | "u" => return Some(ConsoleCommand::Undo),
        "abort" | "a" => return Some(ConsoleCommand::Abort),
        "quit" | "q" | "exit" => return Some(ConsoleCommand::Quit),
        "help" | "h" | "?" => return Some(ConsoleCommand::Help),
        _ => {}
    }

    let digits: Vec<usize> = line
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match digits.as_slice() {
        [row, col] => Some(ConsoleCommand::Move {
            row: *row,
            col: *col,
        }),
        _ => None,
    }
}

/// Board as the console shows it, with row and column indices.
pub fn render_grid(board: &Board) -> String {
    let header: Vec<String> = (0..SIDE).map(|col| col.to_string()).collect();
    let mut lines = vec![format!("   {}", header.join(" "))];
    for (index, row) in board.rows().iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|cell| cell.glyph().to_string()).collect();
        lines.push(format!("{index}  {}", cells.join(" ")));
    }
    lines.join("\n")
}

/// Console implementation of [`ChatBridge`].
pub struct ConsoleBridge<W> {
    out: Mutex<W>,
    oracle: Arc<dyn GenerationOracle>,
    oracle_name: String,
    commentary_tokens: u32,
    pending: Mutex<BTreeSet<String>>,
}

impl<W: Write + Send> ConsoleBridge<W> {
    /// Creates a bridge writing to `out`.
    pub fn new(out: W, oracle: Arc<dyn GenerationOracle>, oracle_name: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            oracle,
            oracle_name: oracle_name.into(),
            commentary_tokens: DEFAULT_COMMENTARY_TOKENS,
            pending: Mutex::new(BTreeSet::new()),
        }
    }

    /// Sets the output budget for commentary replies.
    pub fn with_commentary_tokens(mut self, tokens: u32) -> Self {
        self.commentary_tokens = tokens;
        self
    }

    /// Prompt keys injected and not yet retracted.
    pub fn pending_prompts(&self) -> Vec<String> {
        self.pending().iter().cloned().collect()
    }

    /// Drops every outstanding prompt that belongs to a game instance.
    /// Returns how many were removed.
    #[instrument(skip(self))]
    pub fn purge_orphaned_prompts(&self) -> usize {
        let mut pending = self.pending();
        let before = pending.len();
        pending.retain(|key| !InstanceId::is_instance_key(key));
        let purged = before - pending.len();
        debug!(purged, "Purged orphaned prompts");
        purged
    }

    /// Writes one block of text followed by a newline.
    pub fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(error = %e, "Console write failed");
        }
    }

    fn pending(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send + 'static> ChatBridge for ConsoleBridge<W> {
    #[instrument(skip(self, request), fields(instance_id = %request.instance_id))]
    async fn bind(&self, request: &ContainerRequest) -> Result<ContainerHandle, BindError> {
        if request.instance_id.as_str().is_empty() {
            return Err(BindError::new("empty instance id"));
        }
        let handle = ContainerHandle::new(format!("console-{}", request.display_order));
        self.emit(&format!(
            "=== Tic-Tac-Toe {} (slot {}) ===",
            request.instance_id, request.display_order
        ));
        Ok(handle)
    }

    fn render_board(&self, _container: &ContainerHandle, board: &Board, accepting_input: bool) {
        let mut text = render_grid(board);
        if accepting_input {
            text.push('\n');
            text.push_str(CONSOLE_HELP);
        }
        self.emit(&text);
    }

    fn update_status(&self, _container: &ContainerHandle, top: &str, bottom: &str) {
        self.emit(&format!("{top} | {bottom}"));
    }

    fn set_final_message(&self, _container: &ContainerHandle, text: &str) {
        self.emit(text);
    }

    #[instrument(skip(self, text))]
    async fn inject_ephemeral_prompt(&self, id: &str, text: &str) -> Result<(), BridgeError> {
        self.pending().insert(id.to_string());

        let request = GenerateRequest::new(text.to_string())
            .with_quiet_to_loud(true)
            .with_max_output_length(self.commentary_tokens);
        let reply = self
            .oracle
            .generate(&request)
            .await
            .map_err(|e| BridgeError::new(format!("Commentary generation failed: {}", e)))?;

        let reply = reply.trim();
        if !reply.is_empty() {
            self.emit(&format!("{}: {}", self.oracle_name, reply));
        }
        Ok(())
    }

    fn retract_ephemeral_prompt(&self, id: &str) {
        if !self.pending().remove(id) {
            debug!(id, "Retracting a prompt that was not pending");
        }
    }
}

impl<W> std::fmt::Debug for ConsoleBridge<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleBridge")
            .field("oracle_name", &self.oracle_name)
            .field("commentary_tokens", &self.commentary_tokens)
            .finish_non_exhaustive()
    }
}
