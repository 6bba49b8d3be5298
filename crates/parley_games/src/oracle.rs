//! The text-generation oracle seen by the engine.
//!
//! The engine only needs "prompt in, untrusted text out". [`GenerationOracle`]
//! is that seam; [`LlmOracle`] fills it with a hosted model.

use crate::llm_client::{CallOverrides, LlmClient, LlmError};
use async_trait::async_trait;
use derive_more::{Display, Error};
use derive_new::new;
use derive_setters::Setters;
use tracing::{debug, instrument};

/// Arguments of one oracle call.
#[derive(Debug, Clone, PartialEq, Eq, Setters, new)]
#[setters(prefix = "with_")]
pub struct GenerateRequest {
    /// Text the oracle answers.
    pub prompt: String,
    /// Alternative backend for this call (a model name for [`LlmOracle`]).
    #[new(default)]
    #[setters(strip_option)]
    pub api_override: Option<String>,
    /// Ask the host to format the prompt as an instruction.
    #[new(default)]
    pub instruct_override: bool,
    /// Ask the host to surface a normally quiet generation.
    #[new(default)]
    pub quiet_to_loud: bool,
    /// Replaces the host's system prompt for this call.
    #[new(default)]
    #[setters(strip_option)]
    pub system_prompt_override: Option<String>,
    /// Output budget in tokens.
    #[new(value = "64")]
    pub max_output_length: u32,
}

/// Oracle call failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
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

impl From<LlmError> for OracleError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        Self::new(err.message)
    }
}

/// External async text generator whose replies are untrusted free text.
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    /// Produces a reply for the request.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, OracleError>;
}

/// System prompt used when a request carries no override.
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Oracle backed by [`LlmClient`].
///
/// `api_override` selects a different model for the call. `instruct_override`
/// and `quiet_to_loud` only matter to chat hosts and are ignored here.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    /// Wraps a configured client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationOracle for LlmOracle {
    #[instrument(skip(self, request), fields(max_output_length = request.max_output_length))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String, OracleError> {
        let system_prompt = request
            .system_prompt_override
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let overrides = CallOverrides {
            model: request.api_override.clone(),
            max_tokens: Some(request.max_output_length),
        };
        debug!(
            instruct_override = request.instruct_override,
            quiet_to_loud = request.quiet_to_loud,
            "Forwarding request to LLM"
        );
        let reply = self
            .client
            .generate(system_prompt, &request.prompt, &overrides)
            .await?;
        Ok(reply)
    }
}

/// Oracle that never answers with anything useful.
///
/// Used for offline play: every move falls through to the random fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentOracle;

#[async_trait]
impl GenerationOracle for SilentOracle {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, OracleError> {
        Ok(String::new())
    }
}
