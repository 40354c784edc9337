mod action;
mod engine;
mod invariants;
mod opponent;
mod position;
pub mod rules;
mod status;
mod types;

pub use action::{Move, MoveRejection};
pub use invariants::{InvariantViolation, verify_state};
pub use engine::{apply_move, apply_opponent_move, last_move, reset, select_mode, validate_move};
pub use opponent::{HeuristicOpponent, OPPONENT_MARK, select_opponent_move};
pub use position::Position;
pub use rules::{evaluate_winner, is_draw, is_full};
pub use status::status_line;
pub use types::{Board, GameMode, GameState, GameStatus, Mark, Square};
