#![cfg(feature = "std")]

use std::env;
use std::time::Duration;

/// Idle time after which a session is abandoned.
pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(180);

/// How often the host looks for idle sessions.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime settings of a [`crate::Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// A session without an accepted move for this long is abandoned.
    pub move_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl HostConfig {
    /// Defaults overridden by `CONNECT4_MOVE_TIMEOUT_SECS` and
    /// `CONNECT4_SWEEP_MS` when they hold valid numbers.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = read_env_u64("CONNECT4_MOVE_TIMEOUT_SECS") {
            config.move_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = read_env_u64("CONNECT4_SWEEP_MS").filter(|&ms| ms > 0) {
            config.sweep_interval = Duration::from_millis(ms);
        }
        config
    }

    pub fn with_move_timeout(mut self, move_timeout: Duration) -> Self {
        self.move_timeout = move_timeout;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

fn read_env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
