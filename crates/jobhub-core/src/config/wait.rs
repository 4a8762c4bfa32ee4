//! Completion-wait configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time a caller waits for a queued job to finish.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 600_000;

/// Default pause between two status queries in poll mode.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 120_000;

/// Defaults applied when a caller does not specify wait timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Overall wait timeout in milliseconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,
    /// Poll-mode interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl WaitConfig {
    /// Overall wait timeout.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Poll-mode interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

fn default_poll_timeout() -> u64 {
    DEFAULT_POLL_TIMEOUT_MS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
