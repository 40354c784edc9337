//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board according
//! to tic-tac-toe rules. They are evaluated fresh on every call; nothing
//! is cached between moves.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::evaluate_winner;
