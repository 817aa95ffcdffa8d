/// Smallest board on which five in a row fits.
pub const MIN_BOARD_SIZE: usize = 5;
/// Largest board whose columns all encode as a single letter `A`..`Z`.
pub const MAX_BOARD_SIZE: usize = 26;
/// Run length that wins the game.
pub const WIN_LENGTH: usize = 5;

/// Scan directions as (row delta, col delta): vertical, horizontal and both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("move ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
}

/// Square N x N grid stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Panics unless `MIN_BOARD_SIZE <= size <= MAX_BOARD_SIZE`.
    pub fn new(size: usize) -> Self {
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
            "board size {size} outside {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}"
        );
        Board {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Get the cell at a specific position. Row 0 is the top.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size + col]
    }

    /// Cells in row-major order, index = row * size + col.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mark an empty cell. Occupied cells are never overwritten.
    pub fn place(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), MoveError> {
        if !self.in_bounds(row, col) {
            return Err(MoveError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        let idx = row * self.size + col;
        if self.cells[idx] != Cell::Empty {
            return Err(MoveError::Occupied { row, col });
        }
        self.cells[idx] = cell;
        Ok(())
    }

    /// Clear every cell back to empty
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count()
    }

    /// Scan the whole board for a run of five identical marks.
    ///
    /// Every occupied cell is treated as the start of a run in each of the
    /// four directions, so runs are only followed forward. Returns the mark
    /// of the first winning run found in row-major order.
    pub fn winning_cell(&self) -> Option<Cell> {
        for row in 0..self.size {
            for col in 0..self.size {
                let cell = self.get(row, col);
                if cell == Cell::Empty {
                    continue;
                }
                for &(dr, dc) in &DIRECTIONS {
                    if self.run_length(row, col, dr, dc, cell) >= WIN_LENGTH {
                        return Some(cell);
                    }
                }
            }
        }
        None
    }

    /// Count contiguous `cell` marks from (row, col) along (dr, dc), capped at WIN_LENGTH.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 1;
        let mut r = row as isize;
        let mut c = col as isize;
        while count < WIN_LENGTH {
            r += dr;
            c += dc;
            if r < 0 || c < 0 || !self.in_bounds(r as usize, c as usize) {
                break;
            }
            if self.get(r as usize, c as usize) != cell {
                break;
            }
            count += 1;
        }
        count
    }
}
