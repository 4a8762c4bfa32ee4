//! Two-axis job status: running state and completion outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a job is still executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunningStatus {
    /// Accepted, waiting for a worker.
    Queued,
    /// Being processed.
    InProgress,
    /// Finished; see [`CompletionStatus`] for the outcome.
    Completed,
}

impl RunningStatus {
    /// Whether the job has not finished yet.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Queued | Self::InProgress)
    }

    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a finished job. Absent while the job is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
}

impl CompletionStatus {
    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
