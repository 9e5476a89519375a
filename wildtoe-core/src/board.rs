//! 3x3 grid geometry: marks, coordinates, and the eight winning lines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board side length (the grid is always 3x3)
pub const BOARD_SIZE: u8 = 3;

/// Center cell, the deterministic opening move for the search
pub const CENTER: Coord = Coord::new(1, 1);

/// A non-empty cell value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Cross,
    Circle,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::Cross => Mark::Circle,
            Mark::Circle => Mark::Cross,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::Cross => 'X',
            Mark::Circle => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Mark {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Mark::Cross),
            "o" | "O" => Ok(Mark::Circle),
            other => Err(ParseError::BadMark(other.to_string())),
        }
    }
}

/// Cell coordinates: (row, col), each in [0,2]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate is on the board
    pub fn is_valid(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }
}

/// One of the eight winning triples
pub type Line = [Coord; 3];

/// The eight winning lines in canonical scan order:
/// rows top to bottom, columns left to right, main diagonal, anti diagonal.
/// `Board::winning_line` returns the first match in this order.
pub const LINES: [Line; 8] = [
    [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)],
    [Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)],
    [Coord::new(2, 0), Coord::new(2, 1), Coord::new(2, 2)],
    [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)],
    [Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)],
    [Coord::new(0, 2), Coord::new(1, 2), Coord::new(2, 2)],
    [Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)],
    [Coord::new(2, 0), Coord::new(1, 1), Coord::new(0, 2)],
];

/// Errors from the compact board/mark text form
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 9 cells, found {0}")]
    BadLength(usize),
    #[error("unrecognized cell character {0:?}")]
    BadChar(char),
    #[error("unrecognized mark {0:?}")]
    BadMark(String),
}

/// The 3x3 grid of cells (`None` = empty)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// All coordinates in row-major scan order
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord::new(row, col)))
    }

    /// Get mark at coordinate (None when empty or out of range)
    pub fn get(&self, coord: Coord) -> Option<Mark> {
        if !coord.is_valid() {
            return None;
        }
        self.cells[coord.row as usize][coord.col as usize]
    }

    /// Write a mark into an empty cell. Returns false (and leaves the
    /// board untouched) when the target is occupied or out of range.
    pub fn place(&mut self, coord: Coord, mark: Mark) -> bool {
        if !coord.is_valid() || self.get(coord).is_some() {
            return false;
        }
        self.set(coord, mark);
        true
    }

    /// Unchecked write, for the search's simulate step
    pub(crate) fn set(&mut self, coord: Coord, mark: Mark) {
        self.cells[coord.row as usize][coord.col as usize] = Some(mark);
    }

    /// Erase a cell, for the search's undo step
    pub(crate) fn clear(&mut self, coord: Coord) {
        self.cells[coord.row as usize][coord.col as usize] = None;
    }

    /// First completed line in canonical order, or None
    pub fn winning_line(&self) -> Option<Line> {
        for line in LINES {
            if let Some(mark) = self.get(line[0]) {
                if self.get(line[1]) == Some(mark) && self.get(line[2]) == Some(mark) {
                    return Some(line);
                }
            }
        }
        None
    }

    /// True when no cell is empty
    pub fn is_full(&self) -> bool {
        Self::coords().all(|c| self.get(c).is_some())
    }

    /// True when every cell is empty
    pub fn is_empty(&self) -> bool {
        Self::coords().all(|c| self.get(c).is_none())
    }

    /// Empty cells in row-major scan order
    pub fn empty_cells(&self) -> Vec<Coord> {
        Self::coords().filter(|&c| self.get(c).is_none()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = match self.get(Coord::new(row, col)) {
                    Some(mark) => mark.as_char(),
                    None => '.',
                };
                write!(f, "{}", ch)?;
                if col + 1 < BOARD_SIZE {
                    write!(f, " ")?;
                }
            }
            if row + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseError;

    /// Parse a compact text form: nine cell characters (`X`, `O`, and
    /// `.` or `_` for empty) in row-major order, whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::new();
        let mut count = 0usize;

        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            if count >= 9 {
                return Err(ParseError::BadLength(count + 1));
            }
            let coord = Coord::new((count / 3) as u8, (count % 3) as u8);
            match ch {
                'X' | 'x' => board.set(coord, Mark::Cross),
                'O' | 'o' => board.set(coord, Mark::Circle),
                '.' | '_' => {}
                other => return Err(ParseError::BadChar(other)),
            }
            count += 1;
        }

        if count != 9 {
            return Err(ParseError::BadLength(count));
        }
        Ok(board)
    }
}
