//! Core Connect-4 game engine (no_std compatible)
//!
//! This module contains the pure game rules with no dependency on the
//! transport, rendering or async runtime. It only needs `alloc` for the
//! move log and can be compiled without the `std` feature.

pub mod board;
pub mod common;
pub mod config;
pub mod game;

// Re-export commonly used types
pub use board::{Board, ColumnSet, Piece};
pub use common::{MoveError, SessionError, StateError};
pub use config::*;
pub use game::{LastMove, Move, Placement, Session, SessionState, Status};
