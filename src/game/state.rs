use super::{Board, Cell, Move, MoveError, Player};

/// Result of a successfully applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// The player who made the move
    pub player: Player,
    /// Whether the board holds a winning run after the move
    pub won: bool,
}

/// Mutable game engine: the grid plus whose turn it is.
///
/// Black always moves first after a reset, and the turn flips exactly once
/// per applied move. Terminal conditions are not cached; callers query
/// [`GameState::check_winner`] and [`GameState::is_full`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
}

impl GameState {
    /// Create an empty game on an N x N board
    pub fn new(board_size: usize) -> Self {
        GameState {
            board: Board::new(board_size),
            current_player: Player::Black,
        }
    }

    /// Resume from an arbitrary position.
    pub fn from_board(board: Board, current_player: Player) -> Self {
        GameState {
            board,
            current_player,
        }
    }

    /// Clear the board and give the move back to Black
    pub fn reset(&mut self) -> &Board {
        self.board.clear();
        self.current_player = Player::Black;
        &self.board
    }

    pub fn board_size(&self) -> usize {
        self.board.size()
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Apply a move for the current player. The state is untouched on error.
    pub fn step(&mut self, mv: Move) -> Result<StepResult, MoveError> {
        let player = self.current_player;
        self.board.place(mv.row, mv.col, player.to_cell())?;
        self.current_player = player.other();
        Ok(StepResult {
            player,
            won: self.check_winner().is_some(),
        })
    }

    /// Full-board scan for five in a row
    pub fn check_winner(&self) -> Option<Player> {
        match self.board.winning_cell()? {
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
            Cell::Empty => None,
        }
    }

    pub fn is_valid_move(&self, row: usize, col: usize) -> bool {
        self.board.in_bounds(row, col) && self.board.get(row, col) == Cell::Empty
    }

    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    /// All empty cells in row-major order
    pub fn legal_moves(&self) -> Vec<Move> {
        let size = self.board.size();
        self.board
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == Cell::Empty)
            .map(|(i, _)| Move::from_index(i, size))
            .collect()
    }

    /// The player to move gives up. Returns the winner and resets the game.
    pub fn surrender(&mut self) -> Player {
        let winner = self.current_player.other();
        self.reset();
        winner
    }
}
