//! Job service client trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use jobhub_core::result::AppResult;
use jobhub_core::types::ApiResponse;
use jobhub_entity::job::{Job, JobCreateRequest, JobCreateResult, JobLog, JobLogUpdate, JobSummary};

/// Client for the remote job service.
///
/// Implementations own the transport (HTTP, auth, serialization). A call that
/// reached the service returns `Ok` with the service's status code and
/// optional content; network-shaped failures return a transient [`AppError`].
///
/// [`AppError`]: jobhub_core::error::AppError
#[async_trait]
pub trait JobsApiClient: Send + Sync + std::fmt::Debug + 'static {
    /// Create a single job.
    async fn create_job(&self, request: &JobCreateRequest) -> AppResult<Job>;

    /// Create several jobs in one call. Fails as a whole.
    async fn create_jobs(&self, requests: &[JobCreateRequest]) -> AppResult<Vec<Job>>;

    /// Create several jobs, reporting per-request success or failure.
    async fn try_create_jobs(
        &self,
        requests: &[JobCreateRequest],
    ) -> AppResult<ApiResponse<Vec<JobCreateResult>>>;

    /// Fetch a job by id.
    async fn get_job_by_id(&self, job_id: &str) -> AppResult<ApiResponse<Job>>;

    /// Append a progress log entry to a job.
    async fn add_job_log(
        &self,
        job_id: &str,
        update: &JobLogUpdate,
    ) -> AppResult<ApiResponse<JobLog>>;

    /// Latest job of each of `job_types` within a specification.
    async fn get_latest_jobs_for_specification(
        &self,
        specification_id: &str,
        job_types: &[String],
    ) -> AppResult<ApiResponse<Vec<JobSummary>>>;

    /// Jobs created within `[from, to]` that have not completed.
    async fn get_non_completed_jobs_within_time_frame(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<ApiResponse<Vec<JobSummary>>>;
}
