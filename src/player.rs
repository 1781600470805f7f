#![cfg(feature = "std")]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::Snapshot;
use crate::protocol::Rejection;

/// What a seated player wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Drop a piece into a 0-based column.
    Drop(usize),
    /// Show the board again.
    Refresh,
    /// Leave the game.
    Quit,
}

/// Source of move intents for one seat. Implemented by the stdin front end
/// and by the random driver used for simulations.
pub trait MoveSource: Send {
    /// Choose the next intent while it is this seat's turn.
    fn choose(&mut self, snapshot: &Snapshot) -> Intent;

    /// Inform the source that its last intent was refused.
    fn rejected(&mut self, _reason: &Rejection) {}
}

/// Plays a uniformly random legal column. Used to drive simulated games.
pub struct RandomMover {
    rng: SmallRng,
}

impl RandomMover {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new(SmallRng::from_rng(&mut rand::rng()))
    }
}

impl MoveSource for RandomMover {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        if snapshot.legal_columns.is_empty() {
            return Intent::Quit;
        }
        let idx = self.rng.random_range(0..snapshot.legal_columns.len());
        Intent::Drop(snapshot.legal_columns[idx] as usize)
    }
}
