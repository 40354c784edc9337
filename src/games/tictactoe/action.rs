//! First-class action types for tic-tac-toe.
//!
//! A move records who placed which mark where. A rejection records why the
//! engine ignored a requested placement.

use super::{Mark, Position};
use serde::{Deserialize, Serialize};

/// A move in tic-tac-toe: a mark placed at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// The mark placed.
    pub mark: Mark,
    /// Where it was placed.
    pub position: Position,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position.label())
    }
}

/// Reason a requested placement is not applied.
///
/// The engine never returns these from its mutators; a rejected request
/// leaves the state unchanged. Shells use [`validate_move`] to decide which
/// controls to disable.
///
/// [`validate_move`]: super::validate_move
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// Index outside 0-8.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfRange(usize),

    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The computer is to move.
    #[display("It's the computer's turn")]
    OpponentsTurn,
}

impl std::error::Error for MoveRejection {}
