//! Job progress log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A progress update reported by the owner of a job. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLogUpdate {
    /// Whether the job completed successfully; absent while in progress.
    pub completed_successfully: Option<bool>,
    /// Items processed so far (or percent complete).
    pub items_processed: Option<i32>,
    /// Items that succeeded.
    pub items_succeeded: Option<i32>,
    /// Items that failed.
    pub items_failed: Option<i32>,
    /// Free-text outcome.
    pub outcome: Option<String>,
}

impl JobLogUpdate {
    /// A percent-complete update.
    pub fn progress(
        percent_complete: i32,
        completed_successfully: Option<bool>,
        outcome: Option<String>,
    ) -> Self {
        Self {
            completed_successfully,
            items_processed: Some(percent_complete),
            outcome,
            ..Self::default()
        }
    }

    /// An item-count update; succeeded items are `total - failed`.
    pub fn items(
        total_items: i32,
        failed_items: i32,
        completed_successfully: Option<bool>,
        outcome: Option<String>,
    ) -> Self {
        Self {
            completed_successfully,
            items_processed: Some(total_items),
            items_succeeded: Some(total_items - failed_items),
            items_failed: Some(failed_items),
            outcome,
        }
    }
}

/// A log entry stored by the job service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLog {
    /// Log entry identifier.
    pub id: String,
    /// Job the entry belongs to.
    pub job_id: String,
    /// Whether the job completed successfully.
    pub completed_successfully: Option<bool>,
    /// Items processed.
    pub items_processed: Option<i32>,
    /// Items that succeeded.
    pub items_succeeded: Option<i32>,
    /// Items that failed.
    pub items_failed: Option<i32>,
    /// Free-text outcome.
    pub outcome: Option<String>,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}
