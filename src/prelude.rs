//! Commonly used types and utilities for ease of import.

pub use crate::{
    Board, Client, Host, HostConfig, MoveError, Piece, PlayerId, Reply, Session, SessionId,
    Snapshot, Status,
};

pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
