#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod core;

#[cfg(feature = "std")]
mod client;
#[cfg(feature = "std")]
mod config;
#[cfg(feature = "std")]
pub mod domain;
#[cfg(feature = "std")]
mod host;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod player;
#[cfg(feature = "std")]
mod player_cli;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "std")]
pub mod render;
#[cfg(feature = "std")]
mod runner;
#[cfg(feature = "std")]
pub mod transport;

pub use crate::core::*;

#[cfg(feature = "std")]
pub use client::{Client, Reply};
#[cfg(feature = "std")]
pub use config::*;
#[cfg(feature = "std")]
pub use domain::{PlayerId, SessionId, Snapshot};
#[cfg(feature = "std")]
pub use host::Host;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use player::{Intent, MoveSource, RandomMover};
#[cfg(feature = "std")]
pub use player_cli::{CliMover, LineReader};
#[cfg(feature = "std")]
pub use protocol::{Message, Rejection, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use registry::{LoggingHooks, SessionHooks, SessionRegistry, SharedSession};
#[cfg(feature = "std")]
pub use runner::{MatchReport, MatchRunner};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
