//! Common types for Connect-4: move, session and snapshot errors.

/// Reasons a move is rejected. The session is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    /// The acting player is not the one whose turn it is.
    NotYourTurn,
    /// The chosen column has no free row left.
    ColumnFull,
    /// The session already reached a terminal status.
    GameAlreadyOver,
    /// Column index is outside `0..COLS`.
    InvalidColumn,
}

impl core::fmt::Display for MoveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MoveError::NotYourTurn => write!(f, "It is not your turn"),
            MoveError::ColumnFull => write!(f, "That column is full"),
            MoveError::GameAlreadyOver => write!(f, "The game is already over"),
            MoveError::InvalidColumn => write!(f, "Column is out of range"),
        }
    }
}

/// Errors raised when a session cannot be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionError {
    /// Both seats were given the same player.
    InvalidPlayers,
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::InvalidPlayers => write!(f, "A game needs two different players"),
        }
    }
}

/// Errors returned when restoring a session from a saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// Both seats hold the same player.
    InvalidPlayers,
    /// A piece is floating above an empty cell.
    Gravity { row: usize, col: usize },
    /// The move log does not describe the pieces on the board.
    MoveLogMismatch,
    /// Seat index is not 0 or 1.
    InvalidSeat(usize),
    /// Status or seat to move contradicts the board.
    StatusMismatch,
}

impl core::fmt::Display for StateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StateError::InvalidPlayers => write!(f, "Saved state has identical players"),
            StateError::Gravity { row, col } => {
                write!(f, "Piece at row={}, col={} is not supported", row, col)
            }
            StateError::MoveLogMismatch => write!(f, "Move log does not match board contents"),
            StateError::InvalidSeat(seat) => write!(f, "Invalid seat index {}", seat),
            StateError::StatusMismatch => write!(f, "Status does not match board contents"),
        }
    }
}

impl From<SessionError> for StateError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidPlayers => StateError::InvalidPlayers,
        }
    }
}
