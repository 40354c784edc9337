//! Tic-tac-toe engine - board state machine and heuristic opponent
//!
//! This library holds the game logic behind a browser tic-tac-toe widget.
//! The UI shell owns rendering; everything it needs to drive a game lives
//! here.
//!
//! # Architecture
//!
//! - **Engine**: pure `(state, event) -> state'` transitions
//! - **Opponent**: fixed-priority heuristic with an injected random source
//! - **Session**: shell wiring with a deferred, stale-safe computer turn
//! - **Config**: TOML settings for delay, default mode and RNG seed
//!
//! # Example
//!
//! ```
//! use tictactoe_engine::{GameMode, GameState, GameStatus, HeuristicOpponent, apply_move, apply_opponent_move};
//!
//! let mut opponent = HeuristicOpponent::seeded(7);
//! let state = GameState::new(GameMode::PlayerVsOpponent);
//! let state = apply_move(&state, 0);
//! let state = apply_opponent_move(&state, opponent.rng_mut());
//! assert_eq!(state.history().len(), 2);
//! assert_eq!(state.status(), GameStatus::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod session;
mod telemetry;

// Crate-level exports - Configuration
pub use config::{ConfigError, EngineConfig};

// Crate-level exports - Session wiring
pub use session::{GameEvent, GameSession, OpponentTicket, SessionHandle, SnapshotError};

// Crate-level exports - Tracing
pub use telemetry::init_tracing;

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, GameMode, GameState, GameStatus, HeuristicOpponent, InvariantViolation, Mark, Move,
    MoveRejection, OPPONENT_MARK, Position, Square, apply_move, apply_opponent_move,
    evaluate_winner, is_draw, is_full, last_move, reset, select_mode, select_opponent_move,
    status_line, validate_move, verify_state,
};
