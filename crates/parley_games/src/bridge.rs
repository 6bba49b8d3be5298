//! Host chat surface consumed by the controller.
//!
//! The host owns rendering, the chat log and prompt injection. Clicks on a
//! rendered cell must be routed back into
//! [`GameController::submit_player_move`](crate::GameController::submit_player_move).

use crate::instance::InstanceId;
use async_trait::async_trait;
use derive_more::{Display, Error};
use derive_new::new;
use parley_tictactoe::Board;

/// What the controller asks the host to create for a new game.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ContainerRequest {
    /// Id of the game being launched.
    pub instance_id: InstanceId,
    /// Stacking slot among launched games.
    pub display_order: u64,
}

/// Opaque reference to the host surface bound to one game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, new)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    /// Host-assigned key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The host could not locate or create the game's surface.
#[derive(Debug, Clone, Display, Error)]
#[display("Failed to bind to host: {} at {}:{}", message, file, line)]
pub struct BindError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BindError {
    /// Creates a new bind error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A host operation other than binding failed.
#[derive(Debug, Clone, Display, Error)]
#[display("Bridge error: {} at {}:{}", message, file, line)]
pub struct BridgeError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BridgeError {
    /// Creates a new bridge error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Rendering, persistence and prompt-injection surface of the host.
#[async_trait]
pub trait ChatBridge: Send + Sync {
    /// Locates or creates the surface for a new game.
    async fn bind(&self, request: &ContainerRequest) -> Result<ContainerHandle, BindError>;

    /// Draws the nine cells. `accepting_input` is true while the human may click.
    fn render_board(&self, container: &ContainerHandle, board: &Board, accepting_input: bool);

    /// Shows turn or outcome text.
    fn update_status(&self, container: &ContainerHandle, top: &str, bottom: &str);

    /// Replaces the game's chat entry with its one-line summary.
    fn set_final_message(&self, container: &ContainerHandle, text: &str);

    /// Inserts a one-shot prompt and lets the host generate from it.
    async fn inject_ephemeral_prompt(&self, id: &str, text: &str) -> Result<(), BridgeError>;

    /// Removes a prompt added by [`ChatBridge::inject_ephemeral_prompt`].
    fn retract_ephemeral_prompt(&self, id: &str);
}
