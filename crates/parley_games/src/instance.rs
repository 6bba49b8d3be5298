//! Per-game identifiers and host display ordering.

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every game instance id.
pub const INSTANCE_PREFIX: &str = "parley-tictactoe-";

const TOKEN_LEN: usize = 11;

/// First display-order slot handed to hosts.
pub const DISPLAY_ORDER_BASE: u64 = 20_000;

/// Unique id of one launched game; also keys its ephemeral prompts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generates a fresh id from the thread RNG.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("{INSTANCE_PREFIX}{token}"))
    }

    /// The id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the commentary prompt injected for this game.
    pub fn commentary_key(&self) -> String {
        format!("{}-commentary", self.0)
    }

    /// True when `key` ends with a game instance id.
    ///
    /// Hosts use this on chat change to purge ephemeral prompts left behind
    /// by games whose UI no longer exists.
    pub fn is_instance_key(key: &str) -> bool {
        let Some(start) = key.rfind(INSTANCE_PREFIX) else {
            return false;
        };
        let token = &key[start + INSTANCE_PREFIX.len()..];
        let token = token.strip_suffix("-commentary").unwrap_or(token);
        !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    }
}

/// Monotonic launch counter shared by the controllers of one host.
///
/// Only affects where the host stacks each game's container.
#[derive(Debug, Clone, Default)]
pub struct LaunchSequence {
    launched: Arc<AtomicU64>,
}

impl LaunchSequence {
    /// Starts counting from zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a launch and returns its display order.
    pub fn next_display_order(&self) -> u64 {
        DISPLAY_ORDER_BASE + self.launched.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Launches recorded so far.
    pub fn launched(&self) -> u64 {
        self.launched.load(Ordering::Relaxed)
    }
}
