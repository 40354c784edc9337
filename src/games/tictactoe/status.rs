//! User-facing status text.

use super::types::{GameMode, GameState, GameStatus, Mark};

/// One-line status for the current state: whose turn it is, or the outcome.
///
/// Texts are in English.
pub fn status_line(state: &GameState) -> String {
    match (state.status(), state.mode()) {
        (GameStatus::InProgress, GameMode::PlayerVsOpponent) => match state.turn() {
            Mark::X => "Your turn".to_string(),
            Mark::O => "Computer's turn".to_string(),
        },
        (GameStatus::InProgress, GameMode::PlayerVsPlayer) => {
            format!("Player {}'s turn", state.turn())
        }
        (GameStatus::Won(Mark::X), GameMode::PlayerVsOpponent) => "You won!".to_string(),
        (GameStatus::Won(Mark::O), GameMode::PlayerVsOpponent) => {
            "The computer won!".to_string()
        }
        (GameStatus::Won(mark), GameMode::PlayerVsPlayer) => format!("Player {} wins!", mark),
        (GameStatus::Draw, _) => "Draw! The game ended in a tie.".to_string(),
    }
}
