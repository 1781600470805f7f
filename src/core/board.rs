//! Board grid with gravity drops and four-in-a-row detection.

use crate::core::common::{MoveError, StateError};
use crate::core::config::{COLS, CONNECT, MAX_DIAGONAL_OFFSET, MIN_DIAGONAL_OFFSET, ROWS};
use core::fmt;

/// Content of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Piece {
    #[default]
    Empty,
    /// Piece of the player in seat 0.
    PlayerA,
    /// Piece of the player in seat 1.
    PlayerB,
}

impl Piece {
    /// Piece owned by the given seat (0 or 1).
    pub fn for_seat(seat: usize) -> Self {
        if seat == 0 {
            Piece::PlayerA
        } else {
            Piece::PlayerB
        }
    }

    /// Seat owning this piece, `None` for an empty cell.
    pub fn seat(self) -> Option<usize> {
        match self {
            Piece::Empty => None,
            Piece::PlayerA => Some(0),
            Piece::PlayerB => Some(1),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }
}

/// Set of column indices packed into a single byte.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet(u8);

impl ColumnSet {
    pub const fn empty() -> Self {
        ColumnSet(0)
    }

    pub fn insert(&mut self, col: usize) {
        if col < COLS {
            self.0 |= 1 << col;
        }
    }

    pub fn contains(&self, col: usize) -> bool {
        col < COLS && self.0 & (1 << col) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Columns in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..COLS).filter(move |c| bits & (1 << c) != 0)
    }
}

impl FromIterator<usize> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = ColumnSet::empty();
        for col in iter {
            set.insert(col);
        }
        set
    }
}

impl fmt::Debug for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Straight run of cells walked from a start cell with a fixed step.
#[derive(Clone, Copy)]
struct Line {
    row: isize,
    col: isize,
    d_row: isize,
    d_col: isize,
}

impl Line {
    const fn new(row: isize, col: isize, d_row: isize, d_col: isize) -> Self {
        Line {
            row,
            col,
            d_row,
            d_col,
        }
    }
}

impl Iterator for Line {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let in_bounds = (0..ROWS as isize).contains(&self.row) && (0..COLS as isize).contains(&self.col);
        if !in_bounds {
            return None;
        }
        let cell = (self.row as usize, self.col as usize);
        self.row += self.d_row;
        self.col += self.d_col;
        Some(cell)
    }
}

/// Every line family a win can occur on: rows, columns, then the diagonals of
/// the board and of its horizontal mirror. Diagonals shorter than `CONNECT`
/// are skipped.
fn lines() -> impl Iterator<Item = Line> {
    let last_col = COLS as isize - 1;
    let rows = (0..ROWS as isize).map(|r| Line::new(r, 0, 0, 1));
    let cols = (0..COLS as isize).map(|c| Line::new(0, c, 1, 0));
    let diagonals = (MIN_DIAGONAL_OFFSET..=MAX_DIAGONAL_OFFSET).flat_map(move |offset| {
        // cells (i, i + offset) and their mirror (i, last_col - (i + offset))
        if offset >= 0 {
            [
                Line::new(0, offset, 1, 1),
                Line::new(0, last_col - offset, 1, -1),
            ]
        } else {
            [
                Line::new(-offset, 0, 1, 1),
                Line::new(-offset, last_col, 1, -1),
            ]
        }
    });
    rows.chain(cols).chain(diagonals)
}

/// Fixed 6×7 grid. Row 0 is the top row, row 5 the bottom.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    cells: [[Piece; COLS]; ROWS],
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Board {
            cells: [[Piece::Empty; COLS]; ROWS],
        }
    }

    /// Build a board from raw cells, rejecting grids that break gravity.
    pub fn from_cells(cells: [[Piece; COLS]; ROWS]) -> Result<Self, StateError> {
        let board = Board { cells };
        match board.floating_piece() {
            Some((row, col)) => Err(StateError::Gravity { row, col }),
            None => Ok(board),
        }
    }

    /// Raw grid, top row first.
    pub fn cells(&self) -> &[[Piece; COLS]; ROWS] {
        &self.cells
    }

    /// Piece at (row, col), `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Piece> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Lowest empty row in `col`, scanning from the bottom row upward.
    pub fn free_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col].is_empty())
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        col >= COLS || !self.cells[0][col].is_empty()
    }

    /// Columns whose top cell is still empty.
    pub fn legal_columns(&self) -> ColumnSet {
        (0..COLS).filter(|&c| !self.is_column_full(c)).collect()
    }

    /// Returns `true` once no empty cell is left.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|p| !p.is_empty())
    }

    /// Drop `piece` into `col`; returns the row it landed on.
    pub fn drop_piece(&mut self, col: usize, piece: Piece) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn);
        }
        let row = self.free_row(col).ok_or(MoveError::ColumnFull)?;
        self.cells[row][col] = piece;
        Ok(row)
    }

    /// Number of non-empty cells.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().filter(|p| !p.is_empty()).count()
    }

    /// Number of cells holding `piece`.
    pub fn count(&self, piece: Piece) -> usize {
        self.cells.iter().flatten().filter(|&&p| p == piece).count()
    }

    /// Returns `true` if four consecutive cells on any row, column or
    /// diagonal hold `piece`. An empty piece never wins.
    pub fn check_win(&self, piece: Piece) -> bool {
        if piece.is_empty() {
            return false;
        }
        lines().any(|line| self.has_run(line, piece))
    }

    fn has_run(&self, line: Line, piece: Piece) -> bool {
        let mut run = 0;
        for (row, col) in line {
            if self.cells[row][col] == piece {
                run += 1;
                if run == CONNECT {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    }

    /// First piece found resting on an empty cell, if any.
    pub fn floating_piece(&self) -> Option<(usize, usize)> {
        for col in 0..COLS {
            for row in 0..ROWS - 1 {
                if !self.cells[row][col].is_empty() && self.cells[row + 1][col].is_empty() {
                    return Some((row, col));
                }
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in self.cells.iter() {
            write!(f, "  ")?;
            for piece in row.iter() {
                let ch = match piece {
                    Piece::Empty => '.',
                    Piece::PlayerA => 'A',
                    Piece::PlayerB => 'B',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
