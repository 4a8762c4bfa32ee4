//! Job management error taxonomy.

use jobhub_core::error::AppError;
use jobhub_entity::job::Job;

/// Failures raised to callers of [`JobManagement`](crate::JobManagement).
///
/// Each variant carries the identifiers needed to tell the conditions apart.
#[derive(Debug, thiserror::Error)]
pub enum JobManagementError {
    /// The job service has no job with this id.
    #[error("Could not find the job with id: '{job_id}'")]
    JobNotFound {
        /// The id that was looked up.
        job_id: String,
    },

    /// The job already carries a completion status.
    #[error("Received job with id: '{}' is already in a completed state with status {:?}", .job.id, .job.completion_status)]
    JobAlreadyCompleted {
        /// The job as fetched.
        job: Box<Job>,
    },

    /// A batch create call returned no content.
    #[error("Failed to create jobs of types: {}", .job_types.join(", "))]
    JobsNotCreated {
        /// Distinct job types of the batch, in request order.
        job_types: Vec<String>,
    },

    /// A latest-jobs query returned a status code outside 200-299.
    #[error("Error while retrieving latest jobs for Specification: {specification_id} and JobTypes: {}", .job_types.join(","))]
    JobsNotRetrieved {
        /// Scope that was queried.
        specification_id: String,
        /// Job types that were queried.
        job_types: Vec<String>,
        /// Status code returned by the service.
        status_code: u16,
    },

    /// A remote or transport call failed outright.
    #[error(transparent)]
    Api(#[from] AppError),
}

/// Result alias for job management operations.
pub type JobManagementResult<T> = Result<T, JobManagementError>;
