//! Job entity model and create request/result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{CompletionStatus, RunningStatus};

/// What caused a job to be queued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Human-readable reason.
    pub message: String,
    /// Identifier of the entity that triggered the job.
    pub entity_id: Option<String>,
    /// Type of the entity that triggered the job.
    pub entity_type: Option<String>,
}

/// A job tracked by the remote job service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique job identifier assigned by the service.
    pub id: String,
    /// Job type (the job definition identifier).
    pub job_definition_id: String,
    /// Owning scope, typically a specification.
    pub specification_id: Option<String>,
    /// Correlation identifier supplied at creation.
    pub correlation_id: Option<String>,
    /// Parent job, for child jobs.
    pub parent_job_id: Option<String>,
    /// Invoking user.
    pub invoker_user_id: Option<String>,
    /// Invoking user's display name.
    pub invoker_user_display_name: Option<String>,
    /// Number of items the job will process.
    pub item_count: Option<i32>,
    /// What caused the job.
    #[serde(default)]
    pub trigger: Trigger,
    /// Whether the job is still executing.
    pub running_status: RunningStatus,
    /// Outcome, set once the job finished.
    pub completion_status: Option<CompletionStatus>,
    /// Free-text outcome.
    pub outcome: Option<String>,
    /// Arbitrary string properties.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// When the job was created.
    pub created: DateTime<Utc>,
    /// When the job was last updated.
    pub last_updated: DateTime<Utc>,
}

impl Job {
    /// Whether the job has reached a terminal state.
    pub fn is_completed(&self) -> bool {
        self.completion_status.is_some()
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreateRequest {
    /// Job type (the job definition identifier).
    pub job_definition_id: String,
    /// Owning scope.
    pub specification_id: Option<String>,
    /// Correlation identifier linking the job to its waiter.
    pub correlation_id: Option<String>,
    /// Parent job, for child jobs.
    pub parent_job_id: Option<String>,
    /// Invoking user.
    pub invoker_user_id: Option<String>,
    /// Invoking user's display name.
    pub invoker_user_display_name: Option<String>,
    /// Number of items the job will process.
    pub item_count: Option<i32>,
    /// What caused the job.
    pub trigger: Trigger,
    /// Arbitrary string properties forwarded to the worker.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Optional message body forwarded to the worker.
    pub message_body: Option<String>,
}

impl JobCreateRequest {
    /// A request for `job_type` scoped to `specification_id`, with a fresh
    /// correlation id.
    pub fn new(job_type: impl Into<String>, specification_id: impl Into<String>) -> Self {
        Self {
            job_definition_id: job_type.into(),
            specification_id: Some(specification_id.into()),
            correlation_id: Some(Uuid::new_v4().to_string()),
            parent_job_id: None,
            invoker_user_id: None,
            invoker_user_display_name: None,
            item_count: None,
            trigger: Trigger::default(),
            properties: HashMap::new(),
            message_body: None,
        }
    }

    /// Set the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Set the trigger.
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the invoking user.
    pub fn with_invoker(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.invoker_user_id = Some(user_id.into());
        self.invoker_user_display_name = Some(display_name.into());
        self
    }

    /// Add a string property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one request in a batch create call.
///
/// Results are matched to requests by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreateResult {
    /// The created job, when creation succeeded.
    pub job: Option<Job>,
    /// The request this result answers.
    pub create_request: JobCreateRequest,
    /// Failure reason, when creation failed.
    pub error: Option<String>,
}

impl JobCreateResult {
    /// Whether the job was created.
    pub fn was_created(&self) -> bool {
        self.job.is_some()
    }
}
