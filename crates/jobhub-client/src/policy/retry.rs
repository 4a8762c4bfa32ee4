//! Retry schedule.

use std::time::Duration;

/// Fixed retry schedule: one delay per retry, in order.
///
/// An empty schedule disables retries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Create a policy from an explicit delay schedule.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::default()
    }

    /// Delay before retry number `attempt` (zero-based), or `None` once the
    /// schedule is exhausted.
    pub fn delay_for(&self, attempt: usize) -> Option<Duration> {
        self.delays.get(attempt).copied()
    }

    /// Maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }
}
