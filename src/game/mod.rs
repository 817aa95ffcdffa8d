//! Core gobang rules: board representation, move coordinates, player types,
//! and the mutable game engine with full-board win detection.

mod board;
mod coord;
mod player;
mod state;

pub use board::{Board, Cell, MoveError, MAX_BOARD_SIZE, MIN_BOARD_SIZE, WIN_LENGTH};
pub use coord::{Move, MoveParseError};
pub use player::Player;
pub use state::{GameState, StepResult};
