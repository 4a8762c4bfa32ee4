//! Queue-only transport.
//!
//! Models a storage-queue style service: point-to-point queues work, topics
//! and subscriptions do not. Completion waits over this transport poll the
//! job service instead of listening for notifications.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::traits::messenger::parse_subscription_path;
use jobhub_core::traits::{HealthStatus, MessagePredicate, MessengerService};

use crate::inbox::QueueStore;

/// In-process queues without publish/subscribe support.
#[derive(Debug)]
pub struct QueueMessenger {
    queues: QueueStore,
}

impl QueueMessenger {
    /// Create a messenger whose queues hold `buffer_size` messages each.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            queues: QueueStore::new(buffer_size),
        }
    }

    fn reject_subscription_path(entity_path: &str) -> AppResult<()> {
        match parse_subscription_path(entity_path) {
            Some(_) => Err(AppError::not_implemented(format!(
                "Queue transport cannot read subscription '{entity_path}'"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MessengerService for QueueMessenger {
    fn service_name(&self) -> &str {
        "queue"
    }

    async fn is_health_ok(&self, queue_name: &str) -> HealthStatus {
        if queue_name.trim().is_empty() {
            return HealthStatus::unhealthy("Queue name must not be empty");
        }
        HealthStatus::healthy()
    }

    async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()> {
        self.queues.send(queue_name, body)
    }

    async fn send_to_topic(&self, topic_name: &str, _body: Value) -> AppResult<()> {
        Err(AppError::not_implemented(format!(
            "Queue transport cannot publish to topic '{topic_name}'"
        )))
    }

    async fn receive_messages(
        &self,
        entity_path: &str,
        timeout: Duration,
    ) -> AppResult<Vec<Value>> {
        Self::reject_subscription_path(entity_path)?;
        Ok(self
            .queues
            .queue(entity_path)
            .drain_until(Instant::now() + timeout)
            .await)
    }

    async fn receive_message(
        &self,
        entity_path: &str,
        predicate: &MessagePredicate<'_>,
        timeout: Duration,
    ) -> AppResult<Option<Value>> {
        Self::reject_subscription_path(entity_path)?;
        Ok(self
            .queues
            .queue(entity_path)
            .take_matching(predicate, Instant::now() + timeout)
            .await)
    }
}
