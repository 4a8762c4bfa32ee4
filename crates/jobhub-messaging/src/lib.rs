//! # jobhub-messaging
//!
//! Notification transports used to deliver job completion messages.
//!
//! - [`MemoryMessenger`]: in-process queues and topic subscriptions.
//! - [`QueueMessenger`]: in-process queues only; no subscriptions, so
//!   completion waits fall back to polling.
//! - `RedisMessenger` (feature `redis-pubsub`): Redis lists for queues and
//!   Redis channels for topics.
//!
//! [`connect`] selects one from configuration.

pub mod inbox;
pub mod memory;
pub mod queue;
pub mod redis;
pub mod transport;

pub use memory::MemoryMessenger;
pub use queue::QueueMessenger;
pub use transport::connect;
