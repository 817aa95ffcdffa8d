use std::fmt;

/// A board coordinate. Row 0 is the top row, column 0 is column `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("empty move text")]
    Empty,

    #[error("invalid column letter {0:?} (expected A-Z)")]
    InvalidColumn(char),

    #[error("invalid row number {0:?} (expected an integer >= 1)")]
    InvalidRow(String),
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Move { row, col }
    }

    /// Row-major cell index on a board of the given size.
    pub fn to_index(self, board_size: usize) -> usize {
        self.row * board_size + self.col
    }

    pub fn from_index(index: usize, board_size: usize) -> Self {
        Move {
            row: index / board_size,
            col: index % board_size,
        }
    }

    /// Column letter followed by the 1-based row number, e.g. `H8` for (7, 7).
    pub fn encode(self) -> String {
        let letter = (b'A' + self.col as u8) as char;
        format!("{}{}", letter, self.row + 1)
    }

    /// Inverse of [`Move::encode`].
    pub fn decode(text: &str) -> Result<Move, MoveParseError> {
        let mut chars = text.chars();
        let letter = chars.next().ok_or(MoveParseError::Empty)?;
        if !letter.is_ascii_uppercase() {
            return Err(MoveParseError::InvalidColumn(letter));
        }
        let digits = chars.as_str();
        // only the canonical form written by encode: no sign, no leading zero
        if !digits.starts_with(|c: char| matches!(c, '1'..='9')) {
            return Err(MoveParseError::InvalidRow(digits.to_string()));
        }
        let row: usize = digits
            .parse()
            .map_err(|_| MoveParseError::InvalidRow(digits.to_string()))?;
        Ok(Move {
            row: row - 1,
            col: (letter as u8 - b'A') as usize,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
