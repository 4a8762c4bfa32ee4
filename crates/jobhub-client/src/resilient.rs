//! Job service client wrapped in the resilience policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use jobhub_core::result::AppResult;
use jobhub_core::types::ApiResponse;
use jobhub_entity::job::{Job, JobCreateRequest, JobCreateResult, JobLog, JobLogUpdate, JobSummary};

use crate::api::JobsApiClient;
use crate::policy::{CircuitState, ResiliencePolicy};

/// A [`JobsApiClient`] whose every call goes through a [`ResiliencePolicy`].
///
/// Cloning is cheap; clones share the client and the circuit breaker.
#[derive(Debug, Clone)]
pub struct ResilientJobsApi {
    client: Arc<dyn JobsApiClient>,
    policy: Arc<ResiliencePolicy>,
}

impl ResilientJobsApi {
    /// Wrap `client` with `policy`.
    pub fn new(client: Arc<dyn JobsApiClient>, policy: ResiliencePolicy) -> Self {
        Self {
            client,
            policy: Arc::new(policy),
        }
    }

    /// Current circuit breaker state.
    pub fn circuit_state(&self) -> CircuitState {
        self.policy.circuit_state()
    }

    /// Create a single job.
    pub async fn create_job(&self, request: &JobCreateRequest) -> AppResult<Job> {
        self.policy
            .execute("create_job", || self.client.create_job(request))
            .await
    }

    /// Create several jobs in one call.
    pub async fn create_jobs(&self, requests: &[JobCreateRequest]) -> AppResult<Vec<Job>> {
        self.policy
            .execute("create_jobs", || self.client.create_jobs(requests))
            .await
    }

    /// Create several jobs, one result per request.
    pub async fn try_create_jobs(
        &self,
        requests: &[JobCreateRequest],
    ) -> AppResult<ApiResponse<Vec<JobCreateResult>>> {
        self.policy
            .execute("try_create_jobs", || self.client.try_create_jobs(requests))
            .await
    }

    /// Fetch a job by id.
    pub async fn get_job_by_id(&self, job_id: &str) -> AppResult<ApiResponse<Job>> {
        self.policy
            .execute("get_job_by_id", || self.client.get_job_by_id(job_id))
            .await
    }

    /// Append a progress log entry to a job.
    pub async fn add_job_log(
        &self,
        job_id: &str,
        update: &JobLogUpdate,
    ) -> AppResult<ApiResponse<JobLog>> {
        self.policy
            .execute("add_job_log", || self.client.add_job_log(job_id, update))
            .await
    }

    /// Latest job of each of `job_types` within a specification.
    pub async fn get_latest_jobs_for_specification(
        &self,
        specification_id: &str,
        job_types: &[String],
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        self.policy
            .execute("get_latest_jobs_for_specification", || {
                self.client
                    .get_latest_jobs_for_specification(specification_id, job_types)
            })
            .await
    }

    /// Jobs created within `[from, to]` that have not completed.
    pub async fn get_non_completed_jobs_within_time_frame(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        self.policy
            .execute("get_non_completed_jobs_within_time_frame", || {
                self.client.get_non_completed_jobs_within_time_frame(from, to)
            })
            .await
    }
}
