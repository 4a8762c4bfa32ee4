//! Job summary as reported by the job service and completion notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{CompletionStatus, RunningStatus};

/// Read-only status snapshot of a job.
///
/// A summary is terminal iff `completion_status` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    /// Job identifier.
    pub job_id: String,
    /// Job type.
    pub job_type: String,
    /// Owning scope.
    pub specification_id: Option<String>,
    /// Entity that triggered the job.
    pub entity_id: Option<String>,
    /// Parent job, for child jobs.
    pub parent_job_id: Option<String>,
    /// Whether the job is still executing.
    pub running_status: RunningStatus,
    /// Outcome, absent while running.
    pub completion_status: Option<CompletionStatus>,
    /// Free-text outcome.
    pub outcome: Option<String>,
    /// When the job was created.
    pub created: Option<DateTime<Utc>>,
    /// When the job was last updated.
    pub last_updated: Option<DateTime<Utc>>,
}

impl JobSummary {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.completion_status.is_some()
    }

    /// Whether the summary describes `job_type` within `specification_id`.
    pub fn matches(&self, job_type: &str, specification_id: &str) -> bool {
        self.job_type == job_type && self.specification_id.as_deref() == Some(specification_id)
    }
}
