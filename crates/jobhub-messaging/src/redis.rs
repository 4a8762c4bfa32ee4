//! Redis transport for multi-node deployments.
//!
//! Queues are Redis lists (`LPUSH` / `RPOP`). Topics are Redis pub/sub
//! channels; each subscription owns a dedicated pub/sub connection whose
//! messages are forwarded into a local [`Inbox`](crate::inbox::Inbox) until
//! the subscription is deleted or its time-to-live elapses.

#[cfg(feature = "redis-pubsub")]
pub mod implementation {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use dashmap::DashMap;
    use futures::StreamExt;
    use redis::Client;
    use redis::aio::ConnectionManager;
    use serde_json::Value;
    use tokio::task::JoinHandle;
    use tokio::time::Instant;
    use tracing::{debug, info, warn};

    use jobhub_core::config::messaging::MessagingConfig;
    use jobhub_core::error::{AppError, ErrorKind};
    use jobhub_core::result::AppResult;
    use jobhub_core::traits::messenger::parse_subscription_path;
    use jobhub_core::traits::{
        HealthStatus, MessagePredicate, MessengerService, SubscriptionService,
    };

    use crate::inbox::Inbox;

    /// Interval between `RPOP` attempts while waiting on a queue.
    const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(100);

    #[derive(Debug)]
    struct Subscription {
        inbox: Arc<Inbox>,
        forwarder: JoinHandle<()>,
    }

    impl Drop for Subscription {
        fn drop(&mut self) {
            self.forwarder.abort();
        }
    }

    /// Redis-backed messenger with subscription support.
    #[derive(Debug)]
    pub struct RedisMessenger {
        client: Client,
        conn: ConnectionManager,
        subscriptions: DashMap<(String, String), Subscription>,
        buffer_size: usize,
    }

    impl RedisMessenger {
        /// Connect to the Redis server named in the configuration.
        pub async fn connect(config: &MessagingConfig) -> AppResult<Self> {
            info!(url = %mask_redis_url(&config.redis_url), "Connecting to Redis");

            let client = Client::open(config.redis_url.as_str()).map_err(|e| {
                AppError::with_source(ErrorKind::Messaging, "Failed to create Redis client", e)
            })?;

            let conn = ConnectionManager::new(client.clone()).await.map_err(|e| {
                AppError::with_source(ErrorKind::Messaging, "Failed to connect to Redis", e)
            })?;

            info!("Successfully connected to Redis");
            Ok(Self {
                client,
                conn,
                subscriptions: DashMap::new(),
                buffer_size: config.channel_buffer_size,
            })
        }

        fn subscription_inbox(&self, topic: &str, name: &str) -> AppResult<Arc<Inbox>> {
            let key = (topic.to_string(), name.to_string());
            let inbox = self
                .subscriptions
                .get(&key)
                .map(|entry| entry.value().inbox.clone());

            match inbox {
                Some(inbox) if !inbox.is_expired() => Ok(inbox),
                Some(_) => {
                    self.subscriptions.remove(&key);
                    Err(AppError::messaging(format!(
                        "Subscription '{topic}/{name}' has expired"
                    )))
                }
                None => Err(AppError::messaging(format!(
                    "Subscription '{topic}/{name}' does not exist"
                ))),
            }
        }

        async fn pop(&self, queue_name: &str) -> AppResult<Option<Value>> {
            let mut conn = self.conn.clone();
            let raw = redis::cmd("RPOP")
                .arg(queue_name)
                .query_async::<Option<String>>(&mut conn)
                .await
                .map_err(|e| AppError::messaging(format!("Redis RPOP failed: {e}")))?;

            match raw {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        }
    }

    #[async_trait]
    impl MessengerService for RedisMessenger {
        fn service_name(&self) -> &str {
            "redis"
        }

        async fn is_health_ok(&self, queue_name: &str) -> HealthStatus {
            let mut conn = self.conn.clone();
            match redis::cmd("PING").query_async::<String>(&mut conn).await {
                Ok(_) => HealthStatus::healthy(),
                Err(e) => HealthStatus::unhealthy(format!(
                    "Redis unreachable for queue '{queue_name}': {e}"
                )),
            }
        }

        async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()> {
            let payload = serde_json::to_string(&body)?;
            let mut conn = self.conn.clone();
            redis::cmd("LPUSH")
                .arg(queue_name)
                .arg(payload)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| AppError::messaging(format!("Redis LPUSH failed: {e}")))?;
            Ok(())
        }

        async fn send_to_topic(&self, topic_name: &str, body: Value) -> AppResult<()> {
            let payload = serde_json::to_string(&body)?;
            let mut conn = self.conn.clone();
            let receivers = redis::cmd("PUBLISH")
                .arg(topic_name)
                .arg(payload)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| AppError::messaging(format!("Redis PUBLISH failed: {e}")))?;
            debug!(topic = %topic_name, receivers, "Published message to topic");
            Ok(())
        }

        async fn receive_messages(
            &self,
            entity_path: &str,
            timeout: Duration,
        ) -> AppResult<Vec<Value>> {
            let deadline = Instant::now() + timeout;

            if let Some((topic, name)) = parse_subscription_path(entity_path) {
                let inbox = self.subscription_inbox(topic, name)?;
                return Ok(inbox.drain_until(deadline).await);
            }

            let mut bodies = Vec::new();
            while Instant::now() < deadline {
                match self.pop(entity_path).await? {
                    Some(body) => bodies.push(body),
                    None => tokio::time::sleep(QUEUE_POLL_INTERVAL).await,
                }
            }
            Ok(bodies)
        }

        async fn receive_message(
            &self,
            entity_path: &str,
            predicate: &MessagePredicate<'_>,
            timeout: Duration,
        ) -> AppResult<Option<Value>> {
            let deadline = Instant::now() + timeout;

            if let Some((topic, name)) = parse_subscription_path(entity_path) {
                let inbox = self.subscription_inbox(topic, name)?;
                return Ok(inbox.take_matching(predicate, deadline).await);
            }

            while Instant::now() < deadline {
                match self.pop(entity_path).await? {
                    Some(body) if predicate(&body) => return Ok(Some(body)),
                    Some(_) => {}
                    None => tokio::time::sleep(QUEUE_POLL_INTERVAL).await,
                }
            }
            Ok(None)
        }
    }

    #[async_trait]
    impl SubscriptionService for RedisMessenger {
        async fn create_subscription(
            &self,
            topic_name: &str,
            subscription_name: &str,
            time_to_live: Duration,
        ) -> AppResult<()> {
            self.subscriptions
                .retain(|_, subscription| !subscription.inbox.is_expired());

            let mut pubsub = self.client.get_async_pubsub().await.map_err(|e| {
                AppError::with_source(ErrorKind::Messaging, "Failed to open Redis pub/sub", e)
            })?;
            pubsub.subscribe(topic_name).await.map_err(|e| {
                AppError::messaging(format!("Redis SUBSCRIBE to '{topic_name}' failed: {e}"))
            })?;

            let inbox = Arc::new(Inbox::new(self.buffer_size, Some(time_to_live)));
            let sink = inbox.clone();
            let topic = topic_name.to_string();

            let forwarder = tokio::spawn(async move {
                let mut messages = Box::pin(pubsub.into_on_message());
                let forward = async {
                    while let Some(msg) = messages.next().await {
                        let payload: String = match msg.get_payload() {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!(topic = %topic, error = %e, "Unreadable Redis payload");
                                continue;
                            }
                        };
                        match serde_json::from_str::<Value>(&payload) {
                            Ok(body) => {
                                if !sink.offer(body) {
                                    warn!(topic = %topic, "Subscription buffer full, message dropped");
                                }
                            }
                            Err(e) => {
                                warn!(topic = %topic, error = %e, "Non-JSON message ignored");
                            }
                        }
                    }
                };

                if tokio::time::timeout(time_to_live, forward).await.is_err() {
                    debug!(topic = %topic, "Subscription expired");
                }
            });

            self.subscriptions.insert(
                (topic_name.to_string(), subscription_name.to_string()),
                Subscription { inbox, forwarder },
            );
            debug!(
                topic = %topic_name,
                subscription = %subscription_name,
                "Created Redis subscription"
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
            Ok(())
        }
    }

    /// Mask password in Redis URL for safe logging.
    pub(crate) fn mask_redis_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(colon_pos) = url[..at_pos].rfind(':') {
                let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
                if colon_pos > scheme_end {
                    return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
                }
            }
        }
        url.to_string()
    }

}

#[cfg(feature = "redis-pubsub")]
pub use implementation::RedisMessenger;
