//! Parameters of a completion wait.

use std::time::Duration;

/// What to wait for after submitting a job.
///
/// `poll_timeout` and `poll_interval` fall back to the `[wait]` configuration
/// defaults when left unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobWaitRequest {
    /// Job type to wait for.
    pub job_type: String,
    /// Scope the job is queued against.
    pub specification_id: String,
    /// Correlation id naming the ephemeral subscription.
    pub correlation_id: String,
    /// Topic completion notifications are published to.
    pub notification_topic: String,
    /// Upper bound on the whole wait.
    pub poll_timeout: Option<Duration>,
    /// Delay between status queries in poll mode.
    pub poll_interval: Option<Duration>,
}

impl JobWaitRequest {
    /// A wait for the latest `job_type` job of `specification_id`, using the
    /// configured timeout and interval.
    pub fn new(
        job_type: impl Into<String>,
        specification_id: impl Into<String>,
        correlation_id: impl Into<String>,
        notification_topic: impl Into<String>,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            specification_id: specification_id.into(),
            correlation_id: correlation_id.into(),
            notification_topic: notification_topic.into(),
            poll_timeout: None,
            poll_interval: None,
        }
    }

    /// Override the wait timeout.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}
