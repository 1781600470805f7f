#![cfg(feature = "std")]

use crate::core::MoveError;
use crate::domain::{PlayerId, SessionId, Snapshot};

/// Bumped whenever the layout of [`Message`] changes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Why the host refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Rejection {
    /// The engine rejected the move.
    Move(MoveError),
    /// A game was started with the same player twice.
    InvalidPlayers,
    /// No live session has this id.
    UnknownSession,
    /// The acting player does not sit at this session.
    NotInSession,
    /// The message is not a valid request.
    UnexpectedMessage,
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Rejection::Move(e) => write!(f, "{}", e),
            Rejection::InvalidPlayers => write!(f, "Please specify 1 other player to start the game"),
            Rejection::UnknownSession => write!(f, "That game is no longer running"),
            Rejection::NotInSession => write!(f, "You are not playing in this game"),
            Rejection::UnexpectedMessage => write!(f, "Unexpected request"),
        }
    }
}

/// Messages exchanged between a front end and the game host.
///
/// Requests carry a `seq` chosen by the sender; direct replies echo it.
/// `Finished` pushed by the host on its own (idle timeout) has no `seq`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    Handshake { version: u16 },
    HandshakeAck { version: u16 },

    /// Start a game; the challenger moves first.
    Start {
        seq: u64,
        challenger: PlayerId,
        opponent: PlayerId,
    },
    /// Drop a piece into a 0-based column.
    Move {
        seq: u64,
        session: SessionId,
        player: PlayerId,
        column: u8,
    },
    /// Ask for the current state again.
    Refresh { seq: u64, session: SessionId },
    /// A player leaves the game.
    Abandon {
        seq: u64,
        session: SessionId,
        player: PlayerId,
    },

    Started {
        seq: u64,
        session: SessionId,
        snapshot: Snapshot,
    },
    Update {
        seq: u64,
        session: SessionId,
        snapshot: Snapshot,
    },
    /// The session reached a terminal status and has been disposed.
    Finished {
        seq: Option<u64>,
        session: SessionId,
        snapshot: Snapshot,
    },
    Rejected {
        seq: u64,
        session: Option<SessionId>,
        reason: Rejection,
    },
}

impl Message {
    /// Sequence number a reply answers, `None` for requests and pushes.
    pub fn reply_seq(&self) -> Option<u64> {
        match self {
            Message::Started { seq, .. }
            | Message::Update { seq, .. }
            | Message::Rejected { seq, .. } => Some(*seq),
            Message::Finished { seq, .. } => *seq,
            _ => None,
        }
    }
}
