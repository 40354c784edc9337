//! Game state transitions for tic-tac-toe.
//!
//! Every operation is a pure function of `(state, event) -> state'`. Requests
//! that break a precondition return the input state unchanged; they are
//! logged at debug level and never treated as failures.

use super::action::{Move, MoveRejection};
use super::opponent::select_opponent_move;
use super::rules::{evaluate_winner, is_full};
use super::types::{GameMode, GameState, GameStatus};
use super::Position;
use rand::Rng;
use tracing::{debug, info, instrument};

/// Checks whether a human may place a mark at `index` right now.
///
/// In [`GameMode::PlayerVsOpponent`] the human only moves on `X`'s turn.
#[instrument(skip(state), fields(turn = %state.turn(), status = ?state.status()))]
pub fn validate_move(state: &GameState, index: usize) -> Result<Position, MoveRejection> {
    let pos = Position::from_index(index).ok_or(MoveRejection::OutOfRange(index))?;

    if state.status().is_terminal() {
        return Err(MoveRejection::GameOver);
    }

    if state.mode().is_computer(state.turn()) {
        return Err(MoveRejection::OpponentsTurn);
    }

    if !state.board().is_empty(pos) {
        return Err(MoveRejection::SquareOccupied(pos));
    }

    Ok(pos)
}

/// Applies a human move at `index` (0-8).
///
/// Invalid requests (out of range, occupied, game over, computer's turn)
/// return `state` unchanged.
#[instrument(skip(state), fields(turn = %state.turn()))]
pub fn apply_move(state: &GameState, index: usize) -> GameState {
    match validate_move(state, index) {
        Ok(pos) => place(state, pos),
        Err(rejection) => {
            debug!(index, %rejection, "Ignoring move");
            state.clone()
        }
    }
}

/// Lets the heuristic opponent play `O`.
///
/// Only acts in [`GameMode::PlayerVsOpponent`] while the game is in progress
/// and `O` is to move; otherwise returns `state` unchanged. A board with no
/// empty square also leaves the state unchanged.
#[instrument(skip(state, rng), fields(turn = %state.turn(), mode = ?state.mode()))]
pub fn apply_opponent_move<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> GameState {
    if !state.mode().is_computer(state.turn()) || state.status().is_terminal() {
        debug!(status = ?state.status(), "Opponent move not applicable");
        return state.clone();
    }

    match select_opponent_move(state.board(), rng) {
        Some(pos) => place(state, pos),
        None => {
            debug!("Opponent found no empty square");
            state.clone()
        }
    }
}

/// Starts a fresh game under `mode`.
#[instrument]
pub fn reset(mode: GameMode) -> GameState {
    info!(mode = mode.label(), "Resetting game");
    GameState::new(mode)
}

/// Switches the game mode. The board is re-initialized.
#[instrument(skip(state), fields(from = ?state.mode()))]
pub fn select_mode(state: &GameState, mode: GameMode) -> GameState {
    if state.mode() != mode {
        info!(to = ?mode, "Game mode changed");
    }
    reset(mode)
}

/// Returns the last move played, if any.
pub fn last_move(state: &GameState) -> Option<Move> {
    let position = *state.history().last()?;
    match state.board().get(position) {
        super::Square::Occupied(mark) => Some(Move::new(mark, position)),
        super::Square::Empty => None,
    }
}

/// Places the current mark, then re-evaluates the terminal state.
pub(super) fn place(state: &GameState, pos: Position) -> GameState {
    let mut next = state.clone();
    let mark = next.turn();
    next.place(pos);

    if let Some(winner) = evaluate_winner(next.board()) {
        info!(%winner, position = %pos, "Game won");
        next.set_status(GameStatus::Won(winner));
    } else if is_full(next.board()) {
        info!(position = %pos, "Game drawn");
        next.set_status(GameStatus::Draw);
    } else {
        next.flip_turn();
    }

    debug!(%mark, position = %pos, status = ?next.status(), "Move applied");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Mark, Square};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn play(mode: GameMode, moves: &[usize]) -> GameState {
        moves
            .iter()
            .fold(GameState::new(mode), |state, &i| apply_move(&state, i))
    }

    #[test]
    fn test_first_move_places_x_and_flips_turn() {
        let state = apply_move(&GameState::new(GameMode::PlayerVsPlayer), 4);
        assert_eq!(state.board().get(Position::Center), Square::Occupied(Mark::X));
        assert_eq!(state.turn(), Mark::O);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.history(), &[Position::Center]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let state = GameState::new(GameMode::PlayerVsPlayer);
        assert_eq!(apply_move(&state, 9), state);
        assert_eq!(
            validate_move(&state, 42),
            Err(MoveRejection::OutOfRange(42))
        );
    }

    #[test]
    fn test_occupied_is_noop() {
        let state = play(GameMode::PlayerVsPlayer, &[0]);
        assert_eq!(apply_move(&state, 0), state);
    }

    #[test]
    fn test_human_cannot_move_on_opponents_turn() {
        let state = play(GameMode::PlayerVsOpponent, &[0]);
        assert_eq!(state.turn(), Mark::O);
        assert_eq!(validate_move(&state, 1), Err(MoveRejection::OpponentsTurn));
        assert_eq!(apply_move(&state, 1), state);
    }

    #[test]
    fn test_win_stops_turn_flip() {
        // X: 0 1 2, O: 3 4
        let state = play(GameMode::PlayerVsPlayer, &[0, 3, 1, 4, 2]);
        assert_eq!(state.status(), GameStatus::Won(Mark::X));
        assert_eq!(state.turn(), Mark::X);
        assert_eq!(apply_move(&state, 8), state);
    }

    #[test]
    fn test_last_cell_draws() {
        // X O X / X O O / O X X
        let state = play(GameMode::PlayerVsPlayer, &[0, 1, 2, 4, 3, 5, 7, 6]);
        assert_eq!(state.status(), GameStatus::InProgress);
        let state = apply_move(&state, 8);
        assert_eq!(state.status(), GameStatus::Draw);
        assert!(is_full(state.board()));
    }

    #[test]
    fn test_opponent_move_requires_opponent_turn() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let state = GameState::new(GameMode::PlayerVsOpponent);
        assert_eq!(apply_opponent_move(&state, &mut rng), state);

        let pvp = play(GameMode::PlayerVsPlayer, &[0]);
        assert_eq!(apply_opponent_move(&pvp, &mut rng), pvp);
    }

    #[test]
    fn test_opponent_takes_center_after_corner() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let state = play(GameMode::PlayerVsOpponent, &[0]);
        let state = apply_opponent_move(&state, &mut rng);
        assert_eq!(state.board().get(Position::Center), Square::Occupied(Mark::O));
        assert_eq!(state.turn(), Mark::X);
        assert_eq!(
            last_move(&state),
            Some(Move::new(Mark::O, Position::Center))
        );
    }

    #[test]
    fn test_select_mode_reinitializes_board() {
        let state = play(GameMode::PlayerVsOpponent, &[0]);
        let state = select_mode(&state, GameMode::PlayerVsPlayer);
        assert_eq!(state, GameState::new(GameMode::PlayerVsPlayer));
    }
}
