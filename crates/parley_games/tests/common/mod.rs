//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parley_games::{
    BindError, Board, BridgeError, ChatBridge, ContainerHandle, ContainerRequest,
    ControllerSettings, Dice, GameController, GenerateRequest, GenerationOracle, LaunchSequence,
    OpponentMoveResolver, OracleError, RandomSource, ResolverSettings,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Oracle that replays a script, then repeats a fallback reply forever.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    fallback: String,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedOracle {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Self::with_results(replies.iter().map(|r| Ok(r.to_string())).collect(), "I pass")
    }

    pub fn always(reply: &str) -> Arc<Self> {
        Self::with_results(Vec::new(), reply)
    }

    pub fn with_results(script: Vec<Result<String, OracleError>>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: fallback.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationOracle for ScriptedOracle {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Oracle that blocks every call until released.
pub struct GatedOracle {
    reply: String,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedOracle {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl GenerationOracle for GatedOracle {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, OracleError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}

/// Oracle that answers well after any reasonable timeout.
pub struct SlowOracle {
    pub delay: Duration,
    pub calls: Mutex<usize>,
}

#[async_trait]
impl GenerationOracle for SlowOracle {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, OracleError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(self.delay).await;
        Ok("(0, 0)".to_string())
    }
}

/// Random source that cycles through fixed indices.
pub struct ScriptedRandom {
    picks: Vec<usize>,
    next: usize,
}

impl ScriptedRandom {
    pub fn dice(picks: &[usize]) -> Dice {
        Dice::new(Self {
            picks: picks.to_vec(),
            next: 0,
        })
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        let pick = self.picks[self.next % self.picks.len()];
        self.next += 1;
        pick % len
    }
}

/// Everything the controller asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Bound(ContainerRequest),
    Rendered { board: Board, accepting_input: bool },
    Status { top: String, bottom: String },
    Final(String),
    Injected { id: String, text: String },
    Retracted(String),
}

/// Bridge that records calls; optionally refuses to bind or inject.
#[derive(Default)]
pub struct RecordingBridge {
    events: Mutex<Vec<HostEvent>>,
    refuse_bind: bool,
    refuse_inject: bool,
}

impl RecordingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing_bind() -> Arc<Self> {
        Arc::new(Self {
            refuse_bind: true,
            ..Self::default()
        })
    }

    pub fn refusing_inject() -> Arc<Self> {
        Arc::new(Self {
            refuse_inject: true,
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn finals(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Final(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn injected(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Injected { id, text } => Some((id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn retracted(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Retracted(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(String, String)> {
        self.events().into_iter().rev().find_map(|e| match e {
            HostEvent::Status { top, bottom } => Some((top, bottom)),
            _ => None,
        })
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ChatBridge for RecordingBridge {
    async fn bind(&self, request: &ContainerRequest) -> Result<ContainerHandle, BindError> {
        if self.refuse_bind {
            return Err(BindError::new("no chat is open"));
        }
        self.record(HostEvent::Bound(request.clone()));
        Ok(ContainerHandle::new(format!("slot-{}", request.display_order)))
    }

    fn render_board(&self, _container: &ContainerHandle, board: &Board, accepting_input: bool) {
        self.record(HostEvent::Rendered {
            board: board.clone(),
            accepting_input,
        });
    }

    fn update_status(&self, _container: &ContainerHandle, top: &str, bottom: &str) {
        self.record(HostEvent::Status {
            top: top.to_string(),
            bottom: bottom.to_string(),
        });
    }

    fn set_final_message(&self, _container: &ContainerHandle, text: &str) {
        self.record(HostEvent::Final(text.to_string()));
    }

    async fn inject_ephemeral_prompt(&self, id: &str, text: &str) -> Result<(), BridgeError> {
        self.record(HostEvent::Injected {
            id: id.to_string(),
            text: text.to_string(),
        });
        if self.refuse_inject {
            return Err(BridgeError::new("generation refused"));
        }
        Ok(())
    }

    fn retract_ephemeral_prompt(&self, id: &str) {
        self.record(HostEvent::Retracted(id.to_string()));
    }
}

/// Controller with no thinking delay and named seats.
pub fn controller(
    oracle: Arc<dyn GenerationOracle>,
    bridge: Arc<dyn ChatBridge>,
    dice: Dice,
) -> GameController {
    let resolver = OpponentMoveResolver::new(oracle, dice.clone(), ResolverSettings::default());
    let settings = ControllerSettings::default()
        .with_player_name("Alex".to_string())
        .with_oracle_name("Sera".to_string())
        .with_thinking_delay(Duration::ZERO);
    GameController::new(resolver, bridge, dice, LaunchSequence::new(), settings)
}
