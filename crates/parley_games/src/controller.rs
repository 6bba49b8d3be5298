//! Turn controller: the only component that mutates a [`Game`].
//!
//! # Concurrency
//!
//! The controller is a cheap cloneable handle over shared state. The session
//! sits behind a `std::sync::Mutex` whose guard is never held across an
//! `.await`; every suspension point (thinking delay, oracle call, host
//! injection) happens with the lock released, and every resume re-checks the
//! status, the turn and the history length before touching the game.
//!
//! A player click that lands while an oracle move is pending is rejected, not
//! queued. Aborting during a pending move lets the oracle call finish and then
//! drops its result.

use crate::bridge::{BindError, ChatBridge, ContainerHandle, ContainerRequest};
use crate::dice::Dice;
use crate::instance::{InstanceId, LaunchSequence};
use crate::resolver::{OpponentMoveResolver, Resolution, ResolveError};
use crate::template::{Template, TemplateContext};
use derive_getters::Getters;
use derive_setters::Setters;
use parley_tictactoe::{
    Board, Coord, Game, GameStatus, Side, Symbol, Winner, is_legal,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Symbol requested for the human at start.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SymbolChoice {
    /// Play X and move first.
    X,
    /// Play O.
    O,
    /// Coin flip.
    #[default]
    Random,
}

impl SymbolChoice {
    /// Settles the choice, flipping a coin for `Random`.
    pub fn resolve(self, dice: &Dice) -> Symbol {
        match self {
            SymbolChoice::X => Symbol::X,
            SymbolChoice::O => Symbol::O,
            SymbolChoice::Random => {
                if dice.coin_flip() {
                    Symbol::X
                } else {
                    Symbol::O
                }
            }
        }
    }
}

/// Presentation and pacing settings.
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct ControllerSettings {
    /// Label of the human in outcome text.
    player_name: String,
    /// Label of the oracle in outcome text.
    oracle_name: String,
    /// Pause before each oracle turn.
    thinking_delay: Duration,
    /// Commentary request rendered after a decided game.
    commentary: Template,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            player_name: "You".to_string(),
            oracle_name: "Oracle".to_string(),
            thinking_delay: Duration::from_millis(600),
            commentary: Template::default(),
        }
    }
}

/// Controller state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Phase {
    /// `start` has not succeeded yet.
    NotStarted,
    /// Moves are accepted.
    InProgress,
    /// Decided by a line.
    Won,
    /// Decided by a full board.
    Draw,
    /// Stopped without a result.
    Aborted,
}

impl From<GameStatus> for Phase {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::InProgress => Phase::InProgress,
            GameStatus::Won => Phase::Won,
            GameStatus::Draw => Phase::Draw,
            GameStatus::Aborted => Phase::Aborted,
        }
    }
}

/// Failure reported by [`GameController::start`].
#[derive(Debug, Clone, derive_more::Display)]
pub enum ControllerError {
    /// A game already exists or is being started.
    #[display("Game already started")]
    AlreadyStarted,
    /// The host could not provide a surface.
    #[display("{}", _0)]
    HostBind(BindError),
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::HostBind(e) => Some(e),
            ControllerError::AlreadyStarted => None,
        }
    }
}

/// Outcome sentence for a finished game.
pub fn outcome_text(game: &Game, player_name: &str, oracle_name: &str) -> String {
    match game.winner() {
        Some(Winner::Symbol(symbol)) if symbol == game.player_symbol() => {
            format!("{player_name} wins")
        }
        Some(Winner::Symbol(_)) => format!("{oracle_name} wins"),
        Some(Winner::Draw) => "the game is a draw".to_string(),
        None => "the game was inconclusive".to_string(),
    }
}

/// One-line chat summary written when a game ends.
pub fn final_message(game: &Game, player_name: &str, oracle_name: &str) -> String {
    format!(
        "[{} ({}) played Tic-Tac-Toe against {} ({}). Outcome: {}]",
        player_name,
        game.player_symbol(),
        oracle_name,
        game.oracle_symbol(),
        outcome_text(game, player_name, oracle_name)
    )
}

#[derive(Debug, Default)]
struct Session {
    game: Option<Game>,
    instance_id: Option<InstanceId>,
    container: Option<ContainerHandle>,
    starting: bool,
    resolving: bool,
    finalized: bool,
    in_flight: Option<JoinHandle<()>>,
}

/// Everything `finalize` needs, claimed once under the lock.
struct Finale {
    game: Game,
    instance_id: InstanceId,
    container: ContainerHandle,
}

struct Shared {
    resolver: OpponentMoveResolver,
    bridge: Arc<dyn ChatBridge>,
    dice: Dice,
    sequence: LaunchSequence,
    settings: ControllerSettings,
    session: Mutex<Session>,
}

/// Orchestrates one game between the human and the oracle.
#[derive(Clone)]
pub struct GameController {
    shared: Arc<Shared>,
}

impl GameController {
    /// Creates a controller in the `NotStarted` phase.
    pub fn new(
        resolver: OpponentMoveResolver,
        bridge: Arc<dyn ChatBridge>,
        dice: Dice,
        sequence: LaunchSequence,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                bridge,
                dice,
                sequence,
                settings,
                session: Mutex::new(Session::default()),
            }),
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &ControllerSettings {
        &self.shared.settings
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.session()
            .game
            .as_ref()
            .map_or(Phase::NotStarted, |game| game.status().into())
    }

    /// Copy of the game, if started.
    pub fn snapshot(&self) -> Option<Game> {
        self.session().game.clone()
    }

    /// Id of the running game, if started.
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.session().instance_id.clone()
    }

    /// True while an oracle move is scheduled or being resolved.
    pub fn is_resolving(&self) -> bool {
        self.session().resolving
    }

    /// Binds to the host and starts a game; returns the human's symbol.
    ///
    /// Schedules the oracle's first move when the oracle holds X.
    ///
    /// # Errors
    ///
    /// [`ControllerError::AlreadyStarted`] on a second call, and
    /// [`ControllerError::HostBind`] when the host has no surface for the game.
    /// After a bind failure the controller stays `NotStarted`.
    #[instrument(skip(self))]
    pub async fn start(&self, choice: SymbolChoice) -> Result<Symbol, ControllerError> {
        {
            let mut session = self.session();
            if session.game.is_some() || session.starting {
                warn!("Start requested on a started controller");
                return Err(ControllerError::AlreadyStarted);
            }
            session.starting = true;
        }

        let player_symbol = choice.resolve(&self.shared.dice);
        let instance_id = InstanceId::generate();
        let request =
            ContainerRequest::new(instance_id.clone(), self.shared.sequence.next_display_order());

        let container = match self.shared.bridge.bind(&request).await {
            Ok(container) => container,
            Err(e) => {
                error!(error = %e, instance_id = %instance_id, "Host bind failed");
                self.session().starting = false;
                return Err(ControllerError::HostBind(e));
            }
        };

        let mut session = self.session();
        session.starting = false;
        let game = Game::new(instance_id.as_str(), player_symbol);
        let oracle_first = game.oracle_symbol() == Symbol::X;
        session.game = Some(game);
        session.instance_id = Some(instance_id.clone());
        session.container = Some(container);
        self.publish(&session);

        info!(%instance_id, %player_symbol, oracle_first, "Game started");
        if oracle_first {
            self.schedule_oracle_turn(&mut session);
        }
        Ok(player_symbol)
    }

    /// Applies a human move. Returns false, changing nothing, when the move is
    /// not legal right now (wrong turn, occupied, off-board, finished, or an
    /// oracle move pending).
    #[instrument(skip(self))]
    pub async fn submit_player_move(&self, row: usize, col: usize) -> bool {
        let finale = {
            let mut session = self.session();
            if session.resolving {
                debug!("Oracle move pending, ignoring input");
                return false;
            }
            let Some(game) = session.game.as_mut() else {
                debug!("No game, ignoring input");
                return false;
            };
            if !is_legal(game, row, col, Side::Player) {
                debug!("Illegal player move ignored");
                return false;
            }
            let Some(at) = Coord::new(row, col) else {
                return false;
            };
            if let Err(e) = game.place(at) {
                warn!(error = %e, "Validated move rejected by game");
                return false;
            }
            let live = game.status() == GameStatus::InProgress;
            self.publish(&session);

            if live {
                self.schedule_oracle_turn(&mut session);
                None
            } else {
                self.claim_finale(&mut session)
            }
        };

        if let Some(finale) = finale {
            self.finalize(finale).await;
        }
        true
    }

    /// Takes back the oracle's last move and the human's move before it.
    ///
    /// Only on a live game, on the human's turn, with nothing pending and at
    /// least two moves played. Returns whether anything changed.
    #[instrument(skip(self))]
    pub fn undo_last_two_moves(&self) -> bool {
        let mut session = self.session();
        if session.resolving {
            debug!("Oracle move pending, undo ignored");
            return false;
        }
        let Some(game) = session.game.as_mut() else {
            return false;
        };
        if !game.is_player_turn() {
            debug!("Undo outside the player's turn ignored");
            return false;
        }
        match game.undo_last_two() {
            Ok([reply, played]) => {
                info!(%reply, %played, "Undid last two moves");
                self.publish(&session);
                true
            }
            Err(e) => {
                debug!(error = %e, "Undo ignored");
                false
            }
        }
    }

    /// Stops a live game with no winner. A second call is a no-op.
    #[instrument(skip(self))]
    pub async fn abort(&self) -> bool {
        let finale = {
            let mut session = self.session();
            let Some(game) = session.game.as_mut() else {
                return false;
            };
            if !game.abort() {
                return false;
            }
            info!(pending = session.resolving, "Game aborted");
            self.publish(&session);
            self.claim_finale(&mut session)
        };

        if let Some(finale) = finale {
            self.finalize(finale).await;
        }
        true
    }

    /// Waits until no oracle task is in flight.
    pub async fn settle(&self) {
        loop {
            let handle = self.session().in_flight.take();
            let Some(handle) = handle else {
                break;
            };
            if let Err(e) = handle.await {
                error!(error = %e, "Oracle task failed");
            }
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.shared
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_oracle_turn(&self, session: &mut Session) {
        let Some(game) = session.game.as_ref() else {
            return;
        };
        let epoch = game.history().len();
        session.resolving = true;
        self.publish(session);

        let this = self.clone();
        let handle = tokio::spawn(async move { this.resolve_oracle_move(epoch).await });
        session.in_flight = Some(handle);
        debug!(epoch, "Oracle turn scheduled");
    }

    /// Runs one oracle turn scheduled when the history had `epoch` moves.
    #[instrument(skip(self))]
    async fn resolve_oracle_move(&self, epoch: usize) {
        let delay = self.shared.settings.thinking_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let Some((board, symbol)) = self.oracle_turn_snapshot(epoch) else {
            self.session().resolving = false;
            return;
        };

        let resolution = self.shared.resolver.resolve(&board, symbol).await;

        if let Some(finale) = self.apply_oracle_resolution(epoch, resolution) {
            self.finalize(finale).await;
        }
    }

    fn oracle_turn_snapshot(&self, epoch: usize) -> Option<(Board, Symbol)> {
        let session = self.session();
        let game = session.game.as_ref()?;
        let current = game.status() == GameStatus::InProgress
            && game.current_turn() == game.oracle_symbol()
            && game.history().len() == epoch;
        if !current {
            info!(status = %game.status(), "Oracle turn no longer current");
            return None;
        }
        Some((game.board().clone(), game.oracle_symbol()))
    }

    fn apply_oracle_resolution(
        &self,
        epoch: usize,
        resolution: Result<Resolution, ResolveError>,
    ) -> Option<Finale> {
        let mut session = self.session();
        session.resolving = false;

        let resolution = match resolution {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(error = %e, "Oracle move could not be resolved");
                self.publish(&session);
                return None;
            }
        };

        let coord = resolution.coord;
        let game = session.game.as_mut()?;
        if game.history().len() != epoch || !is_legal(game, coord.row(), coord.col(), Side::Oracle)
        {
            info!(%coord, status = %game.status(), "Discarding oracle move, game changed meanwhile");
            self.publish(&session);
            return None;
        }
        if let Err(e) = game.place(coord) {
            warn!(error = %e, "Resolved oracle move rejected by game");
            return None;
        }
        debug!(source = ?resolution.source, "Oracle move applied");

        self.publish(&session);
        self.claim_finale(&mut session)
    }

    fn claim_finale(&self, session: &mut Session) -> Option<Finale> {
        let game = session.game.as_ref()?;
        if !game.status().is_terminal() || session.finalized {
            return None;
        }
        let finale = Finale {
            game: game.clone(),
            instance_id: session.instance_id.clone()?,
            container: session.container.clone()?,
        };
        session.finalized = true;
        Some(finale)
    }

    #[instrument(skip(self, finale), fields(instance_id = %finale.instance_id, status = %finale.game.status()))]
    async fn finalize(&self, finale: Finale) {
        let settings = &self.shared.settings;
        let bridge = &self.shared.bridge;
        let game = &finale.game;

        let summary = final_message(game, &settings.player_name, &settings.oracle_name);
        bridge.set_final_message(&finale.container, &summary);
        info!(%summary, "Game finalized");

        if game.status() == GameStatus::Aborted {
            debug!("No commentary for an inconclusive game");
            return;
        }

        let context = TemplateContext::new(
            settings.oracle_name.clone(),
            settings.player_name.clone(),
            game.player_symbol(),
            game.oracle_symbol(),
            outcome_text(game, &settings.player_name, &settings.oracle_name),
        );
        let prompt = settings.commentary.render(&context, &self.shared.dice);
        let key = finale.instance_id.commentary_key();

        if let Err(e) = bridge.inject_ephemeral_prompt(&key, &prompt).await {
            warn!(error = %e, "Commentary request failed");
        }
        bridge.retract_ephemeral_prompt(&key);
    }

    fn publish(&self, session: &Session) {
        let (Some(game), Some(container)) = (session.game.as_ref(), session.container.as_ref())
        else {
            return;
        };
        let settings = &self.shared.settings;
        let accepting_input = game.is_player_turn() && !session.resolving;
        self.shared
            .bridge
            .render_board(container, game.board(), accepting_input);

        let top = format!(
            "{} ({}) vs {} ({})",
            settings.player_name,
            game.player_symbol(),
            settings.oracle_name,
            game.oracle_symbol()
        );
        let bottom = if game.status().is_terminal() {
            format!(
                "Game over: {}",
                outcome_text(game, &settings.player_name, &settings.oracle_name)
            )
        } else if game.current_turn() == game.player_symbol() {
            "Your turn".to_string()
        } else {
            format!("{} is thinking...", settings.oracle_name)
        };
        self.shared.bridge.update_status(container, &top, &bottom);
    }
}

impl std::fmt::Debug for GameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(moves: &[(usize, usize)], player: Symbol) -> Game {
        let mut game = Game::new("t", player);
        for (r, c) in moves {
            game.place(Coord::new(*r, *c).unwrap()).unwrap();
        }
        game
    }

    #[test]
    fn outcome_names_the_winner() {
        let x_wins = [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)];
        assert_eq!(outcome_text(&finished(&x_wins, Symbol::X), "Alex", "Sera"), "Alex wins");
        assert_eq!(outcome_text(&finished(&x_wins, Symbol::O), "Alex", "Sera"), "Sera wins");
    }

    #[test]
    fn outcome_for_draw_and_abort() {
        let draw = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)];
        assert_eq!(outcome_text(&finished(&draw, Symbol::X), "A", "B"), "the game is a draw");

        let mut aborted = finished(&[(1, 1)], Symbol::X);
        aborted.abort();
        assert_eq!(outcome_text(&aborted, "A", "B"), "the game was inconclusive");
    }

    #[test]
    fn final_message_format() {
        let game = finished(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)], Symbol::O);
        assert_eq!(
            final_message(&game, "Alex", "Seraphina"),
            "[Alex (O) played Tic-Tac-Toe against Seraphina (X). Outcome: Seraphina wins]"
        );
    }

    #[test]
    fn symbol_choice_parses_and_resolves() {
        use std::str::FromStr;
        assert_eq!(SymbolChoice::from_str("X").unwrap(), SymbolChoice::X);
        assert_eq!(SymbolChoice::from_str("random").unwrap(), SymbolChoice::Random);
        assert!(SymbolChoice::from_str("z").is_err());

        let dice = Dice::seeded(9);
        assert_eq!(SymbolChoice::O.resolve(&dice), Symbol::O);
        let picks: Vec<_> = (0..64).map(|_| SymbolChoice::Random.resolve(&dice)).collect();
        assert!(picks.contains(&Symbol::X) && picks.contains(&Symbol::O));
    }
}
