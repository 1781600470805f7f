#![cfg(feature = "std")]

//! Transport-facing view of a session: the state a front end needs to
//! render a game, detached from the engine types.

use crate::core::{
    config::{COLS, ROWS},
    LastMove, Piece, Session, Status,
};

/// Player identity used by the transport (e.g. a chat user id).
pub type PlayerId = u64;

/// Key of a session in the registry.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub board: [[Piece; COLS]; ROWS],
    pub players: [PlayerId; 2],
    /// `None` once the game is over.
    pub current_player: Option<PlayerId>,
    pub last_move: Option<LastMove<PlayerId>>,
    pub status: Status<PlayerId>,
    pub legal_columns: Vec<u8>,
    pub move_count: usize,
}

impl Snapshot {
    pub fn seat_of(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|&p| p == player)
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }
}

impl From<&Session<PlayerId>> for Snapshot {
    fn from(session: &Session<PlayerId>) -> Self {
        Snapshot {
            board: *session.board().cells(),
            players: *session.players(),
            current_player: session.current_player().copied(),
            last_move: session.last_move().copied(),
            status: *session.status(),
            legal_columns: session.legal_columns().iter().map(|c| c as u8).collect(),
            move_count: session.moves().len(),
        }
    }
}
