//! Bounded message buffers backing queues and subscriptions.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::traits::MessagePredicate;

/// A bounded FIFO of message bodies with an optional expiry.
#[derive(Debug)]
pub struct Inbox {
    tx: mpsc::Sender<Value>,
    rx: Mutex<mpsc::Receiver<Value>>,
    expires_at: Option<Instant>,
}

impl Inbox {
    /// Create an inbox holding up to `capacity` messages, expiring after
    /// `time_to_live` when given.
    pub fn new(capacity: usize, time_to_live: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
            expires_at: time_to_live.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Whether the inbox has outlived its time-to-live.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Enqueue without waiting. Returns `false` when the inbox is full.
    pub fn offer(&self, body: Value) -> bool {
        self.tx.try_send(body).is_ok()
    }

    /// Enqueue, waiting for room.
    pub async fn push(&self, body: Value) -> AppResult<()> {
        self.tx
            .send(body)
            .await
            .map_err(|_| AppError::messaging("Inbox closed"))
    }

    /// Take messages until one matches `predicate` or `deadline` passes.
    ///
    /// Non-matching messages are consumed and discarded.
    pub async fn take_matching(
        &self,
        predicate: &MessagePredicate<'_>,
        deadline: Instant,
    ) -> Option<Value> {
        let mut rx = self.rx.lock().await;
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(body)) if predicate(&body) => return Some(body),
                Ok(Some(_)) => {
                    tracing::trace!("Discarding non-matching message");
                }
                Ok(None) | Err(_) => return None,
            }
        }
    }

    /// Take every message that arrives before `deadline`.
    pub async fn drain_until(&self, deadline: Instant) -> Vec<Value> {
        let mut rx = self.rx.lock().await;
        let mut bodies = Vec::new();
        while let Ok(Some(body)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            bodies.push(body);
        }
        bodies
    }
}

/// Named point-to-point queues, created on first use.
#[derive(Debug)]
pub struct QueueStore {
    queues: DashMap<String, Arc<Inbox>>,
    capacity: usize,
}

impl QueueStore {
    /// Create an empty store whose queues hold `capacity` messages each.
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: DashMap::new(),
            capacity,
        }
    }

    /// The queue named `name`, creating it when missing.
    pub fn queue(&self, name: &str) -> Arc<Inbox> {
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Inbox::new(self.capacity, None)))
            .value()
            .clone()
    }

    /// Enqueue a message on `name`.
    pub fn send(&self, name: &str, body: Value) -> AppResult<()> {
        if self.queue(name).offer(body) {
            Ok(())
        } else {
            Err(AppError::messaging(format!("Queue '{name}' is full")))
        }
    }

    /// Number of queues created so far.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// Whether no queue has been created yet.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
