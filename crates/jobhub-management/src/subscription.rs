//! Ephemeral subscriptions scoped to a single completion wait.

use std::sync::Arc;
use std::time::Duration;

use jobhub_core::result::AppResult;
use jobhub_core::traits::SubscriptionService;
use jobhub_core::traits::messenger::subscription_path;

/// A subscription owned by one wait.
///
/// Call [`release`](Self::release) on every normal exit. If the lease is
/// dropped unreleased (the wait future was dropped or panicked), deletion is
/// spawned onto the current runtime instead.
#[derive(Debug)]
pub struct SubscriptionLease {
    messenger: Arc<dyn SubscriptionService>,
    topic: String,
    name: String,
    released: bool,
}

impl SubscriptionLease {
    /// Create the subscription `name` on `topic`.
    pub async fn acquire(
        messenger: Arc<dyn SubscriptionService>,
        topic: &str,
        name: &str,
        time_to_live: Duration,
    ) -> AppResult<Self> {
        messenger
            .create_subscription(topic, name, time_to_live)
            .await?;

        tracing::debug!(topic = %topic, subscription = %name, "Subscription acquired");
        Ok(Self {
            messenger,
            topic: topic.to_string(),
            name: name.to_string(),
            released: false,
        })
    }

    /// Entity path messages for this subscription are read from.
    pub fn entity_path(&self) -> String {
        subscription_path(&self.topic, &self.name)
    }

    /// The transport the subscription lives on.
    pub fn messenger(&self) -> &dyn SubscriptionService {
        self.messenger.as_ref()
    }

    /// Delete the subscription. Failures are logged, not returned.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self
            .messenger
            .delete_subscription(&self.topic, &self.name)
            .await
        {
            tracing::warn!(
                topic = %self.topic,
                subscription = %self.name,
                error = %e,
                "Failed to delete subscription"
            );
        }
    }
}

impl Drop for SubscriptionLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                topic = %self.topic,
                subscription = %self.name,
                "Subscription leaked, no runtime to delete it on"
            );
            return;
        };

        let messenger = self.messenger.clone();
        let topic = std::mem::take(&mut self.topic);
        let name = std::mem::take(&mut self.name);
        handle.spawn(async move {
            if let Err(e) = messenger.delete_subscription(&topic, &name).await {
                tracing::warn!(topic = %topic, subscription = %name, error = %e, "Failed to delete subscription");
            }
        });
    }
}
