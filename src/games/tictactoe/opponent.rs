//! Heuristic opponent for tic-tac-toe.
//!
//! The opponent does not search the game tree. It walks a fixed priority
//! list and takes the first rule that yields a square:
//!
//! 1. complete its own line,
//! 2. block the human's line,
//! 3. take the center,
//! 4. take a random free corner,
//! 5. take a random free side.
//!
//! Rules 1 and 2 scan squares in ascending index order and stop at the first
//! hit, so a square that completes two lines is not preferred over one that
//! completes a single line, and forks are neither made nor prevented.

use super::rules::evaluate_winner;
use super::types::{Board, Mark};
use super::Position;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

/// Mark played by the computer.
pub const OPPONENT_MARK: Mark = Mark::O;

/// Picks the computer's next square, or `None` on a full board.
///
/// Randomness for the corner and side rules comes from `rng` so callers
/// can supply a seeded generator.
#[instrument(skip(board, rng))]
pub fn select_opponent_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    let own = OPPONENT_MARK;
    let human = own.opponent();

    if let Some(pos) = completing_square(board, own) {
        debug!(position = %pos, "Taking winning square");
        return Some(pos);
    }

    if let Some(pos) = completing_square(board, human) {
        debug!(position = %pos, "Blocking human line");
        return Some(pos);
    }

    if board.is_empty(Position::Center) {
        debug!("Taking center");
        return Some(Position::Center);
    }

    for (group, name) in [(&Position::CORNERS, "corner"), (&Position::SIDES, "side")] {
        let free: Vec<Position> = group.iter().copied().filter(|p| board.is_empty(*p)).collect();
        if let Some(pos) = free.choose(rng) {
            debug!(position = %pos, group = name, "Taking random square");
            return Some(*pos);
        }
    }

    None
}

/// First empty square (ascending) where `mark` would win immediately.
fn completing_square(board: &Board, mark: Mark) -> Option<Position> {
    Position::valid_moves(board)
        .into_iter()
        .find(|&pos| evaluate_winner(&board.with_mark(pos, mark)) == Some(mark))
}

/// Heuristic opponent owning its random source.
#[derive(Debug, Clone)]
pub struct HeuristicOpponent {
    rng: ChaCha8Rng,
}

impl HeuristicOpponent {
    /// Creates an opponent seeded from OS entropy.
    #[instrument]
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Creates an opponent with a deterministic tie-breaking sequence.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates an opponent from an optional seed.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    /// Picks the next square on `board`.
    pub fn choose(&mut self, board: &Board) -> Option<Position> {
        select_opponent_move(board, &mut self.rng)
    }

    /// Mutable access to the random source, for `engine::apply_opponent_move`.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl Default for HeuristicOpponent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Square;

    fn board_from(cells: &str) -> Board {
        let mut board = Board::new();
        for (pos, c) in Position::ALL.into_iter().zip(cells.chars()) {
            match c {
                'X' => board.set(pos, Square::Occupied(Mark::X)),
                'O' => board.set(pos, Square::Occupied(Mark::O)),
                _ => {}
            }
        }
        board
    }

    #[test]
    fn test_win_beats_block() {
        // X X . / O O . / . . .
        let mut opponent = HeuristicOpponent::seeded(1);
        let board = board_from("XX.OO....");
        assert_eq!(opponent.choose(&board), Some(Position::MiddleRight));
    }

    #[test]
    fn test_blocks_human_row() {
        let mut opponent = HeuristicOpponent::seeded(1);
        let board = board_from("XX.......");
        assert_eq!(opponent.choose(&board), Some(Position::TopRight));
    }

    #[test]
    fn test_first_win_in_index_order() {
        // O can finish row 1 at 5 or the main diagonal at 8; 5 is scanned first.
        let mut opponent = HeuristicOpponent::seeded(1);
        let board = board_from("OXXOO.X..");
        assert_eq!(evaluate_winner(&board), None);
        assert_eq!(opponent.choose(&board), Some(Position::MiddleRight));
    }

    #[test]
    fn test_takes_center_on_empty_board() {
        let mut opponent = HeuristicOpponent::seeded(1);
        assert_eq!(opponent.choose(&Board::new()), Some(Position::Center));
    }

    #[test]
    fn test_takes_corner_when_center_taken() {
        for seed in 0..32 {
            let mut opponent = HeuristicOpponent::seeded(seed);
            let pick = opponent.choose(&board_from("....X....")).unwrap();
            assert!(Position::CORNERS.contains(&pick), "seed {seed} picked {pick}");
        }
    }

    #[test]
    fn test_takes_side_when_corners_and_center_taken() {
        // X O X / . O . / O X O: no line can be completed by either mark.
        let board = board_from("XOX.O.OXO");
        let mut opponent = HeuristicOpponent::seeded(3);
        let pick = opponent.choose(&board).unwrap();
        assert!(matches!(pick, Position::MiddleLeft | Position::MiddleRight));
    }

    #[test]
    fn test_full_board_yields_none() {
        let mut opponent = HeuristicOpponent::seeded(1);
        assert_eq!(opponent.choose(&board_from("XOXXOOOXX")), None);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let board = board_from("....X....");
        let a = HeuristicOpponent::seeded(99).choose(&board);
        let b = HeuristicOpponent::seeded(99).choose(&board);
        assert_eq!(a, b);
    }
}
