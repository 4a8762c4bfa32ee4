//! Transport selection.

use std::sync::Arc;

use tracing::info;

use jobhub_core::config::messaging::MessagingConfig;
use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::traits::NotificationTransport;

use crate::memory::MemoryMessenger;
use crate::queue::QueueMessenger;

/// Build the notification transport named by `config.provider`.
///
/// Whether the transport supports subscriptions is fixed here, by the
/// variant of the returned [`NotificationTransport`].
pub async fn connect(config: &MessagingConfig) -> AppResult<NotificationTransport> {
    let transport = match config.provider.as_str() {
        "memory" => {
            info!("Initializing in-memory messenger");
            NotificationTransport::PubSub(Arc::new(MemoryMessenger::new(
                config.channel_buffer_size,
            )))
        }
        "queue" => {
            info!("Initializing queue-only messenger");
            NotificationTransport::QueueOnly(Arc::new(QueueMessenger::new(
                config.channel_buffer_size,
            )))
        }
        #[cfg(feature = "redis-pubsub")]
        "redis" => {
            info!("Initializing Redis messenger");
            let messenger = crate::redis::RedisMessenger::connect(config).await?;
            NotificationTransport::PubSub(Arc::new(messenger))
        }
        other => {
            return Err(AppError::configuration(format!(
                "Unknown messaging provider: '{other}'. Supported: memory, queue, redis"
            )));
        }
    };

    Ok(transport)
}
