//! Core traits defined in `jobhub-core` and implemented by other crates.

pub mod messenger;

pub use messenger::{
    HealthStatus, MessagePredicate, MessengerService, NotificationTransport, SubscriptionService,
};
