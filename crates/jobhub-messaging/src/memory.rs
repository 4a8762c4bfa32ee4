//! In-memory pub/sub for single-node deployments and tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;

use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::traits::messenger::parse_subscription_path;
use jobhub_core::traits::{HealthStatus, MessagePredicate, MessengerService, SubscriptionService};

use crate::inbox::{Inbox, QueueStore};

/// In-memory transport with queues and topic subscriptions.
///
/// Publishing to a topic copies the message into every live subscription on
/// that topic. Messages published before a subscription exists are not seen
/// by it.
#[derive(Debug)]
pub struct MemoryMessenger {
    /// Point-to-point queues.
    queues: QueueStore,
    /// (topic, subscription) → buffered messages.
    subscriptions: DashMap<(String, String), Arc<Inbox>>,
    /// Buffer size for queues and subscriptions.
    buffer_size: usize,
}

impl MemoryMessenger {
    /// Create a new in-memory messenger.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            queues: QueueStore::new(buffer_size),
            subscriptions: DashMap::new(),
            buffer_size,
        }
    }

    /// Number of live subscriptions across all topics.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    fn inbox_for(&self, entity_path: &str) -> AppResult<Arc<Inbox>> {
        let Some((topic, name)) = parse_subscription_path(entity_path) else {
            return Ok(self.queues.queue(entity_path));
        };

        let key = (topic.to_string(), name.to_string());
        let inbox = self
            .subscriptions
            .get(&key)
            .map(|entry| entry.value().clone());

        match inbox {
            Some(inbox) if !inbox.is_expired() => Ok(inbox),
            Some(_) => {
                self.subscriptions.remove(&key);
                Err(AppError::messaging(format!(
                    "Subscription '{entity_path}' has expired"
                )))
            }
            None => Err(AppError::messaging(format!(
                "Subscription '{entity_path}' does not exist"
            ))),
        }
    }
}

impl Default for MemoryMessenger {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl MessengerService for MemoryMessenger {
    fn service_name(&self) -> &str {
        "memory"
    }

    async fn is_health_ok(&self, _queue_name: &str) -> HealthStatus {
        HealthStatus::healthy()
    }

    async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()> {
        self.queues.send(queue_name, body)
    }

    async fn send_to_topic(&self, topic_name: &str, body: Value) -> AppResult<()> {
        self.subscriptions.retain(|_, inbox| !inbox.is_expired());

        let mut delivered = 0usize;
        for entry in self.subscriptions.iter() {
            let (topic, name) = entry.key();
            if topic != topic_name {
                continue;
            }
            if entry.value().offer(body.clone()) {
                delivered += 1;
            } else {
                tracing::warn!(
                    topic = %topic_name,
                    subscription = %name,
                    "Subscription buffer full, message dropped"
                );
            }
        }

        tracing::debug!(topic = %topic_name, delivered, "Published message to topic");
        Ok(())
    }

    async fn receive_messages(
        &self,
        entity_path: &str,
        timeout: Duration,
    ) -> AppResult<Vec<Value>> {
        let inbox = self.inbox_for(entity_path)?;
        Ok(inbox.drain_until(Instant::now() + timeout).await)
    }

    async fn receive_message(
        &self,
        entity_path: &str,
        predicate: &MessagePredicate<'_>,
        timeout: Duration,
    ) -> AppResult<Option<Value>> {
        let inbox = self.inbox_for(entity_path)?;
        Ok(inbox
            .take_matching(predicate, Instant::now() + timeout)
            .await)
    }
}

#[async_trait]
impl SubscriptionService for MemoryMessenger {
    async fn create_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
        time_to_live: Duration,
    ) -> AppResult<()> {
        self.subscriptions.retain(|_, inbox| !inbox.is_expired());
        self.subscriptions.insert(
            (topic_name.to_string(), subscription_name.to_string()),
            Arc::new(Inbox::new(self.buffer_size, Some(time_to_live))),
        );
        tracing::debug!(
            topic = %topic_name,
            subscription = %subscription_name,
            ttl_secs = time_to_live.as_secs(),
            "Created subscription"
        );
        Ok(())
    }

    async fn delete_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AppResult<()> {
        self.subscriptions
            .remove(&(topic_name.to_string(), subscription_name.to_string()));
        tracing::debug!(
            topic = %topic_name,
            subscription = %subscription_name,
            "Deleted subscription"
        );
        Ok(())
    }
}
