//! Game configuration loaded from TOML.

use crate::controller::{ControllerSettings, SymbolChoice};
use crate::llm_client::{LlmConfig, LlmProvider};
use crate::resolver::{DEFAULT_ATTEMPTS, DEFAULT_MAX_OUTPUT_LENGTH, ResolverSettings};
use crate::template::{DEFAULT_COMMENTARY_TEMPLATE, Template};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Everything a game session needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// Display name of the human.
    #[serde(default = "default_player_name")]
    player_name: String,

    /// Display name of the oracle.
    #[serde(default = "default_oracle_name")]
    oracle_name: String,

    /// Symbol the human plays.
    #[serde(default)]
    symbol: SymbolChoice,

    /// Pause before the oracle starts a turn, in milliseconds.
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,

    /// Oracle calls per move before the random fallback.
    #[serde(default = "default_attempts")]
    attempts: usize,

    /// Output budget for a move reply.
    #[serde(default = "default_max_output_length")]
    max_output_length: u32,

    /// Per-call oracle timeout in seconds; unset waits indefinitely.
    #[serde(default)]
    oracle_timeout_secs: Option<u64>,

    /// Model used for move calls instead of `llm_model`.
    #[serde(default)]
    api_override: Option<String>,

    /// Commentary request sent after a decided game.
    #[serde(default = "default_commentary_template")]
    commentary_template: String,

    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-20241022").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for commentary replies.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,
}

fn default_player_name() -> String {
    "You".to_string()
}

fn default_oracle_name() -> String {
    "Oracle".to_string()
}

fn default_thinking_delay_ms() -> u64 {
    600
}

fn default_attempts() -> usize {
    DEFAULT_ATTEMPTS
}

fn default_max_output_length() -> u32 {
    DEFAULT_MAX_OUTPUT_LENGTH
}

fn default_commentary_template() -> String {
    DEFAULT_COMMENTARY_TEMPLATE.to_string()
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            oracle_name: default_oracle_name(),
            symbol: SymbolChoice::default(),
            thinking_delay_ms: default_thinking_delay_ms(),
            attempts: default_attempts(),
            max_output_length: default_max_output_length(),
            oracle_timeout_secs: None,
            api_override: None,
            commentary_template: default_commentary_template(),
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
        }
    }
}

impl ParleyConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(player = %config.player_name, oracle = %config.oracle_name, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.attempts == 0 {
            return Err(ConfigError::new("attempts must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Overrides the symbol choice (command-line flags win over the file).
    pub fn with_symbol(mut self, symbol: SymbolChoice) -> Self {
        self.symbol = symbol;
        self
    }

    /// Resolver tuning derived from this config.
    pub fn resolver_settings(&self) -> ResolverSettings {
        let settings = ResolverSettings::default()
            .with_attempts(self.attempts)
            .with_max_output_length(self.max_output_length);
        let settings = match self.oracle_timeout_secs {
            Some(secs) => settings.with_timeout(Duration::from_secs(secs)),
            None => settings,
        };
        match &self.api_override {
            Some(api) => settings.with_api_override(api.clone()),
            None => settings,
        }
    }

    /// Controller settings derived from this config.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings::default()
            .with_player_name(self.player_name.clone())
            .with_oracle_name(self.oracle_name.clone())
            .with_thinking_delay(Duration::from_millis(self.thinking_delay_ms))
            .with_commentary(Template::parse(&self.commentary_template))
    }

    /// Creates LLM configuration from this config.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let api_key = match self.llm_provider {
            LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            LlmProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
                ConfigError::new("ANTHROPIC_API_KEY environment variable not set".to_string())
            })?,
        };

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
