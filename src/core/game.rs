use alloc::vec::Vec;

use crate::core::{
    board::{Board, ColumnSet, Piece},
    common::{MoveError, SessionError, StateError},
    config::CELLS,
};

/// Current status of a session. Every variant but `InProgress` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Status<P> {
    InProgress,
    Won(P),
    Draw,
    /// Ended by the transport without a result.
    Abandoned,
}

impl<P> Status<P> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::InProgress)
    }

    /// Winning player, if the game was won.
    pub fn winner(&self) -> Option<&P> {
        match self {
            Status::Won(p) => Some(p),
            _ => None,
        }
    }
}

/// Most recent successful move, kept for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LastMove<P> {
    pub player: P,
    pub column: usize,
    pub row: usize,
    pub piece: Piece,
}

/// Entry of the move log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub seat: usize,
    pub row: usize,
    pub column: usize,
}

/// Where an accepted move landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub piece: Piece,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState<P> {
    pub players: [P; 2],
    pub board: Board,
    pub current: usize,
    pub last_move: Option<LastMove<P>>,
    pub moves: Vec<Move>,
    pub status: Status<P>,
}

/// One game between two fixed players, from the first move to a terminal
/// status. Only `apply_move` and `abandon` change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session<P> {
    players: [P; 2],
    board: Board,
    current: usize,
    last_move: Option<LastMove<P>>,
    moves: Vec<Move>,
    status: Status<P>,
}

impl<P: PartialEq> Session<P> {
    /// Start a game. The first player of the pair moves first.
    pub fn new(players: (P, P)) -> Result<Self, SessionError> {
        if players.0 == players.1 {
            return Err(SessionError::InvalidPlayers);
        }
        Ok(Self {
            players: [players.0, players.1],
            board: Board::new(),
            current: 0,
            last_move: None,
            moves: Vec::new(),
            status: Status::InProgress,
        })
    }

    pub fn players(&self) -> &[P; 2] {
        &self.players
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> &Status<P> {
        &self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Seat index (0 or 1) of the player to move, or of the player who made
    /// the final move once the game is over.
    pub fn current_seat(&self) -> usize {
        self.current
    }

    /// Player to move; `None` once the session is terminal.
    pub fn current_player(&self) -> Option<&P> {
        if self.is_over() {
            None
        } else {
            Some(&self.players[self.current])
        }
    }

    pub fn last_move(&self) -> Option<&LastMove<P>> {
        self.last_move.as_ref()
    }

    /// Every accepted move in play order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn seat_of(&self, player: &P) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// Columns that can still take a piece. Empty once the board is full.
    pub fn legal_columns(&self) -> ColumnSet {
        self.board.legal_columns()
    }

    /// End an in-progress session without a result. No-op on terminal
    /// sessions.
    pub fn abandon(&mut self) -> &Status<P> {
        if !self.is_over() {
            self.status = Status::Abandoned;
        }
        &self.status
    }
}

impl<P: PartialEq + Clone> Session<P> {
    /// Drop the acting player's piece into `column`.
    ///
    /// On success the win check runs first, then the draw check; the turn
    /// passes to the other seat only if neither ended the game. On error the
    /// session is left exactly as it was.
    pub fn apply_move(&mut self, player: &P, column: usize) -> Result<Placement, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        if self.players[self.current] != *player {
            return Err(MoveError::NotYourTurn);
        }
        let piece = Piece::for_seat(self.current);
        let row = self.board.drop_piece(column, piece)?;

        self.moves.push(Move {
            seat: self.current,
            row,
            column,
        });
        self.last_move = Some(LastMove {
            player: player.clone(),
            column,
            row,
            piece,
        });

        if self.board.check_win(piece) {
            self.status = Status::Won(player.clone());
        } else if self.board.is_full() {
            self.status = Status::Draw;
        } else {
            self.current ^= 1;
        }
        Ok(Placement { row, column, piece })
    }

    /// Pure form of [`Session::apply_move`]: returns the resulting session and
    /// leaves `self` untouched.
    pub fn after_move(&self, player: &P, column: usize) -> Result<Self, MoveError> {
        let mut next = self.clone();
        next.apply_move(player, column)?;
        Ok(next)
    }

    /// Generate a serializable snapshot of the current state.
    pub fn state(&self) -> SessionState<P> {
        SessionState {
            players: self.players.clone(),
            board: self.board,
            current: self.current,
            last_move: self.last_move.clone(),
            moves: self.moves.clone(),
            status: self.status.clone(),
        }
    }

    /// Restore a session from a snapshot. The move log is replayed to make
    /// sure it produces exactly the saved board.
    pub fn from_state(state: SessionState<P>) -> Result<Self, StateError> {
        if state.players[0] == state.players[1] {
            return Err(StateError::InvalidPlayers);
        }
        if state.current > 1 {
            return Err(StateError::InvalidSeat(state.current));
        }
        if let Some((row, col)) = state.board.floating_piece() {
            return Err(StateError::Gravity { row, col });
        }

        let mut replay = Board::new();
        for (i, mv) in state.moves.iter().enumerate() {
            if mv.seat != i % 2 {
                return Err(StateError::MoveLogMismatch);
            }
            let row = replay
                .drop_piece(mv.column, Piece::for_seat(mv.seat))
                .map_err(|_| StateError::MoveLogMismatch)?;
            if row != mv.row {
                return Err(StateError::MoveLogMismatch);
            }
        }
        if replay != state.board {
            return Err(StateError::MoveLogMismatch);
        }
        let last_matches = match (state.moves.last(), state.last_move.as_ref()) {
            (None, None) => true,
            (Some(mv), Some(last)) => {
                mv.column == last.column && state.players[mv.seat] == last.player
            }
            _ => false,
        };
        if !last_matches {
            return Err(StateError::MoveLogMismatch);
        }
        if !status_matches(&state) {
            return Err(StateError::StatusMismatch);
        }

        Ok(Self {
            players: state.players,
            board: state.board,
            current: state.current,
            last_move: state.last_move,
            moves: state.moves,
            status: state.status,
        })
    }
}

/// Whether `status` and the seat to move are what the move log leads to.
/// Expects a board already checked against the log.
fn status_matches<P: PartialEq>(state: &SessionState<P>) -> bool {
    let board = &state.board;
    let a_wins = board.check_win(Piece::PlayerA);
    let b_wins = board.check_win(Piece::PlayerB);
    let moved = state.moves.len();
    let next_seat = moved % 2;

    if let Some(winner) = state.status.winner() {
        // the winner made the last move and keeps the seat
        let Some(seat) = state.players.iter().position(|p| p == winner) else {
            return false;
        };
        let (own, other) = if seat == 0 { (a_wins, b_wins) } else { (b_wins, a_wins) };
        return own && !other && moved > 0 && state.current == seat && next_seat != seat;
    }
    match state.status {
        Status::InProgress => {
            !a_wins && !b_wins && !board.is_full() && state.current == next_seat
        }
        Status::Draw => !a_wins && !b_wins && moved == CELLS && state.current == 1 - next_seat,
        Status::Abandoned => !a_wins && !b_wins && state.current == next_seat,
        Status::Won(_) => false,
    }
}
