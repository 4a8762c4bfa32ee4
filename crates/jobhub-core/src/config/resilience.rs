//! Resilience policy configuration for the job service client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry and circuit-breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Delay before each retry, in milliseconds. The length is the retry count.
    #[serde(default = "default_retry_delays")]
    pub retry_delays_ms: Vec<u64>,
    /// Consecutive transient failures that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub circuit_breaker_failure_threshold: u32,
    /// Rolling window in seconds within which failures must accumulate.
    #[serde(default = "default_window")]
    pub circuit_breaker_window_seconds: u64,
    /// How long the circuit stays open before a trial call is allowed.
    #[serde(default = "default_break")]
    pub circuit_breaker_break_seconds: u64,
}

impl ResilienceConfig {
    /// Retry delays as durations.
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// Rolling failure window.
    pub fn failure_window(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_window_seconds)
    }

    /// Open-circuit cool-down.
    pub fn break_duration(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_break_seconds)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_delays_ms: default_retry_delays(),
            circuit_breaker_failure_threshold: default_failure_threshold(),
            circuit_breaker_window_seconds: default_window(),
            circuit_breaker_break_seconds: default_break(),
        }
    }
}

fn default_retry_delays() -> Vec<u64> {
    vec![500, 1000, 5000]
}

fn default_failure_threshold() -> u32 {
    100
}

fn default_window() -> u64 {
    60
}

fn default_break() -> u64 {
    60
}
