//! Messenger traits for pluggable notification transports.
//!
//! Every transport implements [`MessengerService`]. Transports backed by a
//! genuine publish/subscribe broker additionally implement
//! [`SubscriptionService`]; the capability is resolved once, when the
//! transport is wrapped in a [`NotificationTransport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;

/// Segment separating a topic from its subscription name in an entity path.
const SUBSCRIPTIONS_SEGMENT: &str = "/Subscriptions/";

/// Predicate evaluated against each message body as it arrives.
pub type MessagePredicate<'a> = dyn Fn(&Value) -> bool + Send + Sync + 'a;

/// Result of a transport health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Whether the transport is usable.
    pub ok: bool,
    /// Diagnostic message; empty when healthy.
    pub message: String,
}

impl HealthStatus {
    /// A healthy status.
    pub fn healthy() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    /// An unhealthy status with a reason.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Trait for message transports (queues, topics).
///
/// Message bodies are JSON values; typed access goes through
/// [`receive_message_as`].
#[async_trait]
pub trait MessengerService: Send + Sync + std::fmt::Debug + 'static {
    /// Name of the backing service, for diagnostics.
    fn service_name(&self) -> &str;

    /// Probe whether the transport can reach `queue_name`.
    async fn is_health_ok(&self, queue_name: &str) -> HealthStatus;

    /// Send a message to a point-to-point queue.
    async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()>;

    /// Publish a message to a topic.
    async fn send_to_topic(&self, topic_name: &str, body: Value) -> AppResult<()>;

    /// Receive every message that arrives on `entity_path` within `timeout`.
    async fn receive_messages(&self, entity_path: &str, timeout: Duration)
    -> AppResult<Vec<Value>>;

    /// Receive the first message on `entity_path` matching `predicate`.
    ///
    /// Returns `None` when no matching message arrives before `timeout`.
    async fn receive_message(
        &self,
        entity_path: &str,
        predicate: &MessagePredicate<'_>,
        timeout: Duration,
    ) -> AppResult<Option<Value>>;
}

/// Publish/subscribe capability, implemented only by broker-backed transports.
#[async_trait]
pub trait SubscriptionService: MessengerService {
    /// Create a subscription named `subscription_name` on `topic_name`.
    ///
    /// Messages published to the topic after this call returns are buffered
    /// for the subscription until it is deleted or `time_to_live` elapses.
    async fn create_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
        time_to_live: Duration,
    ) -> AppResult<()>;

    /// Delete a subscription. Deleting a missing subscription is not an error.
    async fn delete_subscription(&self, topic_name: &str, subscription_name: &str)
    -> AppResult<()>;
}

/// The active notification transport, tagged with its capability.
#[derive(Debug, Clone)]
pub enum NotificationTransport {
    /// Broker with subscription support: completion is pushed.
    PubSub(Arc<dyn SubscriptionService>),
    /// Transport without subscriptions: completion must be polled.
    QueueOnly(Arc<dyn MessengerService>),
}

impl NotificationTransport {
    /// Whether completion notifications can be delivered by subscription.
    pub fn supports_subscriptions(&self) -> bool {
        matches!(self, Self::PubSub(_))
    }

    /// Name of the backing service.
    pub fn service_name(&self) -> &str {
        match self {
            Self::PubSub(service) => service.service_name(),
            Self::QueueOnly(service) => service.service_name(),
        }
    }

    /// Probe the transport's health for `queue_name`.
    pub async fn is_health_ok(&self, queue_name: &str) -> HealthStatus {
        match self {
            Self::PubSub(service) => service.is_health_ok(queue_name).await,
            Self::QueueOnly(service) => service.is_health_ok(queue_name).await,
        }
    }

    /// Send a message to a queue.
    pub async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()> {
        match self {
            Self::PubSub(service) => service.send_to_queue(queue_name, body).await,
            Self::QueueOnly(service) => service.send_to_queue(queue_name, body).await,
        }
    }

    /// Publish a message to a topic.
    pub async fn send_to_topic(&self, topic_name: &str, body: Value) -> AppResult<()> {
        match self {
            Self::PubSub(service) => service.send_to_topic(topic_name, body).await,
            Self::QueueOnly(service) => service.send_to_topic(topic_name, body).await,
        }
    }
}

/// Build the entity path of a topic subscription.
pub fn subscription_path(topic_name: &str, subscription_name: &str) -> String {
    format!("{topic_name}{SUBSCRIPTIONS_SEGMENT}{subscription_name}")
}

/// Split a subscription entity path into `(topic, subscription)`.
///
/// Returns `None` for plain queue paths.
pub fn parse_subscription_path(entity_path: &str) -> Option<(&str, &str)> {
    entity_path.split_once(SUBSCRIPTIONS_SEGMENT)
}

/// Receive the first message on `entity_path` that deserializes into `T` and
/// satisfies `predicate`.
///
/// Messages that do not deserialize into `T` never match.
pub async fn receive_message_as<T, M>(
    messenger: &M,
    entity_path: &str,
    predicate: impl Fn(&T) -> bool + Send + Sync,
    timeout: Duration,
) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    M: MessengerService + ?Sized,
{
    let matches = move |value: &Value| {
        T::deserialize(value)
            .map(|typed| predicate(&typed))
            .unwrap_or(false)
    };

    match messenger
        .receive_message(entity_path, &matches, timeout)
        .await?
    {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
