//! Notification transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Notification transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Transport provider: `"memory"`, `"queue"`, or `"redis"`.
    ///
    /// `memory` and `redis` support topic subscriptions; `queue` does not,
    /// which makes completion waits fall back to polling.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis connection URL (used by the `redis` provider).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Lifetime of subscriptions created for completion waits, in seconds.
    #[serde(default = "default_subscription_ttl")]
    pub subscription_ttl_seconds: u64,
    /// Buffered messages per subscription before publishers are told it is full.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl MessagingConfig {
    /// Subscription lifetime as a duration.
    pub fn subscription_ttl(&self) -> Duration {
        Duration::from_secs(self.subscription_ttl_seconds)
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: default_redis_url(),
            subscription_ttl_seconds: default_subscription_ttl(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_subscription_ttl() -> u64 {
    86_400
}

fn default_channel_buffer() -> usize {
    256
}
