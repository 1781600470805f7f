/// Number of rows on the board. Row 0 is the top row.
pub const ROWS: usize = 6;
/// Number of columns on the board.
pub const COLS: usize = 7;
/// Length of a winning line.
pub const CONNECT: usize = 4;
/// Total number of cells; also the maximum number of moves in a game.
pub const CELLS: usize = ROWS * COLS;

/// Smallest diagonal offset whose diagonal still holds `CONNECT` cells.
pub const MIN_DIAGONAL_OFFSET: isize = CONNECT as isize - ROWS as isize;
/// Largest diagonal offset whose diagonal still holds `CONNECT` cells.
pub const MAX_DIAGONAL_OFFSET: isize = COLS as isize - CONNECT as isize;
