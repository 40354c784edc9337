//! Game session wiring for UI shells.
//!
//! A shell holds one [`GameSession`] (or a shared [`SessionHandle`]) and
//! forwards two kinds of events into it: the human selecting a square, and
//! the deferred "computer's turn" callback. Every deferred callback carries
//! an [`OpponentTicket`]; a ticket issued before a reset, a mode change or a
//! restore no longer matches the session and is discarded.

use crate::config::EngineConfig;
use crate::games::tictactoe::{
    self, GameMode, GameState, GameStatus, HeuristicOpponent, InvariantViolation, Mark, Move,
};
use derive_more::{Display, Error};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Notifications sent from a session to its shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A mark was placed.
    MoveMade(Move),
    /// The computer will move after the configured delay.
    OpponentThinking,
    /// The game ended; carries the terminal status.
    GameOver(GameStatus),
    /// A fresh game started under the given mode.
    Reset(GameMode),
}

/// Snapshot of the session a deferred opponent move was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpponentTicket {
    epoch: u64,
    moves_played: usize,
}

impl OpponentTicket {
    /// Session epoch at issue time.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of moves on the board at issue time.
    pub fn moves_played(&self) -> usize {
        self.moves_played
    }
}

/// A single game as seen by a UI shell.
#[derive(Debug)]
pub struct GameSession {
    state: GameState,
    opponent: HeuristicOpponent,
    epoch: u64,
    events: Option<mpsc::UnboundedSender<GameEvent>>,
}

impl GameSession {
    /// Creates a session from configuration.
    #[instrument(skip(config), fields(mode = ?config.default_mode()))]
    pub fn new(config: &EngineConfig) -> Self {
        info!("Creating game session");
        Self {
            state: GameState::new(*config.default_mode()),
            opponent: HeuristicOpponent::from_seed(*config.rng_seed()),
            epoch: 0,
            events: None,
        }
    }

    /// Attaches a channel that receives [`GameEvent`]s.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Counter bumped by every reset, mode change and restore.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Status text for the current state.
    pub fn status_line(&self) -> String {
        tictactoe::status_line(&self.state)
    }

    /// Handles the human selecting square `index`.
    ///
    /// Returns a ticket when the computer is now to move; the shell should
    /// pass it to [`GameSession::resolve_opponent`] after its delay.
    #[instrument(skip(self), fields(epoch = self.epoch))]
    pub fn play(&mut self, index: usize) -> Option<OpponentTicket> {
        let next = tictactoe::apply_move(&self.state, index);
        if self.commit(next) {
            self.pending_ticket()
        } else {
            None
        }
    }

    /// Handles a fired opponent callback.
    ///
    /// Returns `false` without touching the state when the ticket is stale.
    #[instrument(skip(self), fields(epoch = self.epoch))]
    pub fn resolve_opponent(&mut self, ticket: OpponentTicket) -> bool {
        let current = OpponentTicket {
            epoch: self.epoch,
            moves_played: self.state.history().len(),
        };
        if ticket != current || !self.opponent_to_move() {
            debug!(?ticket, ?current, "Discarding stale opponent move");
            return false;
        }

        let next = tictactoe::apply_opponent_move(&self.state, self.opponent.rng_mut());
        self.commit(next)
    }

    /// Starts a fresh game under the current mode.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        let mode = self.state.mode();
        self.replace(tictactoe::reset(mode));
        self.emit(GameEvent::Reset(mode));
    }

    /// Switches mode and starts a fresh game.
    #[instrument(skip(self))]
    pub fn select_mode(&mut self, mode: GameMode) {
        let next = tictactoe::select_mode(&self.state, mode);
        self.replace(next);
        self.emit(GameEvent::Reset(mode));
    }

    /// Serializes the current state as JSON.
    #[instrument(skip(self))]
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Replaces the current state with a serialized one.
    ///
    /// The state must be one the engine could have reached: it is replayed
    /// from its history and rejected if board, turn or status disagree.
    /// Pending opponent tickets become stale. If the restored state has the
    /// computer to move, a fresh ticket is returned.
    #[instrument(skip(self, json))]
    pub fn restore(&mut self, json: &str) -> Result<Option<OpponentTicket>, SnapshotError> {
        let state: GameState = serde_json::from_str(json)?;
        tictactoe::verify_state(&state)?;
        info!(moves = state.history().len(), status = ?state.status(), "Restoring game state");
        self.replace(state);
        Ok(self.pending_ticket())
    }

    fn opponent_to_move(&self) -> bool {
        self.state.mode().is_computer(self.state.turn()) && !self.state.status().is_terminal()
    }

    fn pending_ticket(&mut self) -> Option<OpponentTicket> {
        if !self.opponent_to_move() {
            return None;
        }
        self.emit(GameEvent::OpponentThinking);
        Some(OpponentTicket {
            epoch: self.epoch,
            moves_played: self.state.history().len(),
        })
    }

    fn replace(&mut self, state: GameState) {
        self.epoch += 1;
        self.state = state;
    }

    /// Stores `next` if it differs and emits the matching events.
    fn commit(&mut self, next: GameState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;

        if let Some(last) = tictactoe::last_move(&self.state) {
            self.emit(GameEvent::MoveMade(last));
        }
        if self.state.status().is_terminal() {
            info!(status = ?self.state.status(), "Game over");
            self.emit(GameEvent::GameOver(self.state.status()));
        }
        true
    }

    fn emit(&self, event: GameEvent) {
        if let Some(events) = &self.events
            && events.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }
}

/// Shared, async handle to a [`GameSession`].
///
/// Human moves that hand the turn to the computer spawn a task that waits
/// for the configured delay and then resolves the opponent's ticket.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<GameSession>>,
    delay: Duration,
}

impl SessionHandle {
    /// Wraps a session with the given opponent delay.
    pub fn new(session: GameSession, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            delay,
        }
    }

    /// Builds a session from configuration.
    #[instrument(skip_all)]
    pub fn from_config(
        config: &EngineConfig,
        events: Option<mpsc::UnboundedSender<GameEvent>>,
    ) -> Self {
        let mut session = GameSession::new(config);
        session.events = events;
        Self::new(session, config.opponent_delay())
    }

    /// Forwards a human move; schedules the computer's reply when due.
    ///
    /// The returned task resolves to whether the reply was applied.
    #[instrument(skip(self))]
    pub async fn play(&self, index: usize) -> Option<JoinHandle<bool>> {
        let ticket = self.inner.lock().await.play(index)?;
        Some(self.schedule(ticket))
    }

    /// Starts a fresh game under the current mode.
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    /// Switches mode and starts a fresh game.
    pub async fn select_mode(&self, mode: GameMode) {
        self.inner.lock().await.select_mode(mode);
    }

    /// Restores a serialized state, scheduling the computer if it is to move.
    pub async fn restore(&self, json: &str) -> Result<Option<JoinHandle<bool>>, SnapshotError> {
        let ticket = self.inner.lock().await.restore(json)?;
        Ok(ticket.map(|t| self.schedule(t)))
    }

    /// Serializes the current state.
    pub async fn snapshot(&self) -> Result<String, SnapshotError> {
        self.inner.lock().await.snapshot()
    }

    /// Copy of the current state.
    pub async fn state(&self) -> GameState {
        self.inner.lock().await.state().clone()
    }

    /// Status text for the current state.
    pub async fn status_line(&self) -> String {
        self.inner.lock().await.status_line()
    }

    fn schedule(&self, ticket: OpponentTicket) -> JoinHandle<bool> {
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        debug!(?ticket, ?delay, "Scheduling opponent move");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.lock().await.resolve_opponent(ticket)
        })
    }
}

/// Failure to serialize or restore a game state.
#[derive(Debug, Clone, Display, Error)]
#[display("Snapshot error: {} at {}:{}", message, file, line)]
pub struct SnapshotError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SnapshotError {
    /// Creates a new snapshot error with caller location tracking.
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

impl From<InvariantViolation> for SnapshotError {
    #[track_caller]
    fn from(err: InvariantViolation) -> Self {
        Self::new(format!("Inconsistent state: {}", err))
    }
}

impl From<serde_json::Error> for SnapshotError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_session() -> GameSession {
        GameSession::new(&EngineConfig::default().with_seed(11))
    }

    #[test]
    fn test_human_move_issues_ticket() {
        let mut session = seeded_session();
        let ticket = session.play(0).expect("computer should be due");
        assert_eq!(ticket.epoch(), 0);
        assert_eq!(ticket.moves_played(), 1);
        assert!(session.resolve_opponent(ticket));
        assert_eq!(session.state().turn(), Mark::X);
        assert_eq!(session.state().history().len(), 2);
    }

    #[test]
    fn test_ticket_is_single_use() {
        let mut session = seeded_session();
        let ticket = session.play(0).unwrap();
        assert!(session.resolve_opponent(ticket));
        assert!(!session.resolve_opponent(ticket));
    }

    #[test]
    fn test_reset_makes_ticket_stale() {
        let mut session = seeded_session();
        let ticket = session.play(0).unwrap();
        session.reset();
        assert!(!session.resolve_opponent(ticket));
        assert_eq!(session.state(), &GameState::new(GameMode::PlayerVsOpponent));
    }

    #[test]
    fn test_player_vs_player_never_issues_tickets() {
        let mut session = seeded_session();
        session.select_mode(GameMode::PlayerVsPlayer);
        assert_eq!(session.play(0), None);
        assert_eq!(session.state().turn(), Mark::O);
        assert_eq!(session.play(1), None);
    }

    #[test]
    fn test_rejected_move_emits_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = seeded_session().with_events(tx);
        assert_eq!(session.play(12), None);
        assert!(rx.try_recv().is_err());
    }
}
