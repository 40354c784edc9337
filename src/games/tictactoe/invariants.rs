//! Consistency checks for game states built outside the engine.
//!
//! States produced by the engine always satisfy these. A state read from a
//! snapshot may not, so it is replayed from its history and compared.

use super::engine::place;
use super::types::{GameState, GameStatus, Mark};
use super::Position;
use tracing::instrument;

/// Way in which a game state disagrees with its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum InvariantViolation {
    /// A position appears twice in the history.
    #[display("Position {} is played twice", _0)]
    DuplicateMove(Position),

    /// The history continues after the game ended.
    #[display("Move at {} follows the end of the game", _0)]
    MoveAfterGameOver(Position),

    /// The board does not hold exactly the marks the history placed.
    #[display("Board does not match move history")]
    BoardMismatch,

    /// The mark to move does not follow from the history.
    #[display("Expected {} to move, found {}", expected, found)]
    TurnMismatch {
        /// Mark implied by the history.
        expected: Mark,
        /// Mark stored in the state.
        found: Mark,
    },

    /// The status does not follow from the board.
    #[display("Expected status {:?}, found {:?}", expected, found)]
    StatusMismatch {
        /// Status recomputed from the board.
        expected: GameStatus,
        /// Status stored in the state.
        found: GameStatus,
    },
}

impl std::error::Error for InvariantViolation {}

/// Checks that `state` is exactly what replaying its history from a fresh
/// game produces: marks alternate from `X`, no square is played twice,
/// the board matches, and turn and status follow from the board.
#[instrument(skip(state), fields(moves = state.history().len()))]
pub fn verify_state(state: &GameState) -> Result<(), InvariantViolation> {
    let mut replayed = GameState::new(state.mode());

    for &pos in state.history() {
        if replayed.status().is_terminal() {
            return Err(InvariantViolation::MoveAfterGameOver(pos));
        }
        if !replayed.board().is_empty(pos) {
            return Err(InvariantViolation::DuplicateMove(pos));
        }
        replayed = place(&replayed, pos);
    }

    if replayed.board() != state.board() {
        return Err(InvariantViolation::BoardMismatch);
    }
    if replayed.status() != state.status() {
        return Err(InvariantViolation::StatusMismatch {
            expected: replayed.status(),
            found: state.status(),
        });
    }
    if replayed.turn() != state.turn() {
        return Err(InvariantViolation::TurnMismatch {
            expected: replayed.turn(),
            found: state.turn(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{GameMode, apply_move};

    #[test]
    fn test_engine_states_hold() {
        let mut state = GameState::new(GameMode::PlayerVsPlayer);
        assert_eq!(verify_state(&state), Ok(()));
        for index in [0, 3, 1, 4, 2] {
            state = apply_move(&state, index);
            assert_eq!(verify_state(&state), Ok(()));
        }
        assert_eq!(state.status(), GameStatus::Won(Mark::X));
    }

    #[test]
    fn test_draw_holds() {
        let state = [0, 1, 2, 4, 3, 5, 7, 6, 8]
            .into_iter()
            .fold(GameState::new(GameMode::PlayerVsPlayer), |s, i| apply_move(&s, i));
        assert_eq!(state.status(), GameStatus::Draw);
        assert_eq!(verify_state(&state), Ok(()));
    }
}
