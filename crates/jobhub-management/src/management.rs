//! Job submission and completion-waiting coordinator.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use jobhub_client::ResilientJobsApi;
use jobhub_core::config::AppConfig;
use jobhub_core::config::wait::WaitConfig;
use jobhub_core::traits::messenger::receive_message_as;
use jobhub_core::traits::{HealthStatus, NotificationTransport, SubscriptionService};
use jobhub_entity::job::{
    CompletionStatus, Job, JobCreateRequest, JobCreateResult, JobLog, JobLogUpdate, JobSummary,
};

use crate::error::{JobManagementError, JobManagementResult};
use crate::poll::PollCompletionWatcher;
use crate::request::JobWaitRequest;
use crate::subscription::SubscriptionLease;

/// Coordinates job submission against the job service and waits for
/// completion over whichever notification transport is active.
#[derive(Debug, Clone)]
pub struct JobManagement {
    api: ResilientJobsApi,
    transport: NotificationTransport,
    watcher: PollCompletionWatcher,
    wait: WaitConfig,
    subscription_ttl: Duration,
}

impl JobManagement {
    /// Create a coordinator.
    pub fn new(
        api: ResilientJobsApi,
        transport: NotificationTransport,
        wait: WaitConfig,
        subscription_ttl: Duration,
    ) -> Self {
        Self {
            watcher: PollCompletionWatcher::new(api.clone()),
            api,
            transport,
            wait,
            subscription_ttl,
        }
    }

    /// Create a coordinator using the `[wait]` and `[messaging]` settings.
    pub fn from_config(
        api: ResilientJobsApi,
        transport: NotificationTransport,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            api,
            transport,
            config.wait.clone(),
            config.messaging.subscription_ttl(),
        )
    }

    /// The active notification transport.
    pub fn transport(&self) -> &NotificationTransport {
        &self.transport
    }

    /// Probe the notification transport for `queue_name`.
    pub async fn is_health_ok(&self, queue_name: &str) -> HealthStatus {
        self.transport.is_health_ok(queue_name).await
    }

    /// Submit a job through `submit` and wait for it to finish.
    ///
    /// `submit` reports whether a job was actually queued; when it was not,
    /// there is nothing to wait for and the result is `true`. Otherwise the
    /// result is whether the job succeeded within the timeout.
    ///
    /// On a subscription-capable transport the subscription is created before
    /// `submit` runs and deleted on every exit path.
    pub async fn queue_job_and_wait<F, Fut>(
        &self,
        submit: F,
        request: &JobWaitRequest,
    ) -> JobManagementResult<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = JobManagementResult<bool>>,
    {
        let timeout = request.poll_timeout.unwrap_or_else(|| self.wait.poll_timeout());

        match &self.transport {
            NotificationTransport::PubSub(messenger) => {
                let lease = SubscriptionLease::acquire(
                    messenger.clone(),
                    &request.notification_topic,
                    &request.correlation_id,
                    self.subscription_ttl,
                )
                .await?;

                let outcome = self.submit_and_listen(&lease, submit, request, timeout).await;
                lease.release().await;
                outcome
            }
            NotificationTransport::QueueOnly(_) => {
                if !submit().await? {
                    return Ok(true);
                }

                let interval = request
                    .poll_interval
                    .unwrap_or_else(|| self.wait.poll_interval());

                Ok(self
                    .watcher
                    .wait_for_job_to_complete(
                        &request.job_type,
                        &request.specification_id,
                        timeout,
                        interval,
                    )
                    .await)
            }
        }
    }

    async fn submit_and_listen<F, Fut>(
        &self,
        lease: &SubscriptionLease,
        submit: F,
        request: &JobWaitRequest,
        timeout: Duration,
    ) -> JobManagementResult<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = JobManagementResult<bool>>,
    {
        if !submit().await? {
            return Ok(true);
        }

        let job_type = request.job_type.as_str();
        let specification_id = request.specification_id.as_str();
        let matches = |notice: &JobSummary| {
            notice.matches(job_type, specification_id) && notice.is_terminal()
        };

        let messenger: &dyn SubscriptionService = lease.messenger();
        match receive_message_as(messenger, &lease.entity_path(), matches, timeout).await {
            Ok(Some(notice)) => Ok(notice.completion_status == Some(CompletionStatus::Succeeded)),
            Ok(None) => {
                tracing::warn!(
                    job_type = %job_type,
                    specification_id = %specification_id,
                    correlation_id = %request.correlation_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "No completion notification received before timeout"
                );
                Ok(false)
            }
            Err(e) => {
                tracing::error!(
                    job_type = %job_type,
                    correlation_id = %request.correlation_id,
                    error = %e,
                    "Failed to receive completion notification"
                );
                Ok(false)
            }
        }
    }

    /// Fetch a job and make sure it has not completed yet.
    pub async fn retrieve_job_and_check_can_be_processed(
        &self,
        job_id: &str,
    ) -> JobManagementResult<Job> {
        let response = self.api.get_job_by_id(job_id).await?;

        let Some(job) = response.into_content() else {
            tracing::error!(job_id = %job_id, "Could not find the job with id: '{}'", job_id);
            return Err(JobManagementError::JobNotFound {
                job_id: job_id.to_string(),
            });
        };

        if let Some(status) = job.completion_status {
            tracing::info!(
                job_id = %job_id,
                completion_status = %status,
                "Received job with id: '{}' is already in a completed state with status {}",
                job_id,
                status
            );
            return Err(JobManagementError::JobAlreadyCompleted { job: Box::new(job) });
        }

        Ok(job)
    }

    /// Report percent-complete progress on a job.
    pub async fn update_job_status(
        &self,
        job_id: &str,
        percent_complete: i32,
        completed_successfully: Option<bool>,
        outcome: Option<String>,
    ) {
        let update = JobLogUpdate::progress(percent_complete, completed_successfully, outcome);
        self.update_job_status_with(job_id, &update).await;
    }

    /// Report item counts on a job; succeeded items are `total - failed`.
    pub async fn update_job_status_items(
        &self,
        job_id: &str,
        total_items: i32,
        failed_items: i32,
        completed_successfully: Option<bool>,
        outcome: Option<String>,
    ) {
        let update =
            JobLogUpdate::items(total_items, failed_items, completed_successfully, outcome);
        self.update_job_status_with(job_id, &update).await;
    }

    /// Submit a prepared progress update. Rejections are logged, not raised.
    pub async fn update_job_status_with(&self, job_id: &str, update: &JobLogUpdate) {
        match self.api.add_job_log(job_id, update).await {
            Ok(response) if response.content.is_some() => {}
            Ok(response) => {
                tracing::error!(
                    job_id = %job_id,
                    status_code = response.status_code,
                    "Failed to add a job log for job id '{}'",
                    job_id
                );
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to add a job log for job id '{}'",
                    job_id
                );
            }
        }
    }

    /// Append a log entry to a job, returning the stored entry.
    pub async fn add_job_log(
        &self,
        job_id: &str,
        update: &JobLogUpdate,
    ) -> JobManagementResult<Option<JobLog>> {
        Ok(self.api.add_job_log(job_id, update).await?.into_content())
    }

    /// Create a single job.
    pub async fn queue_job(&self, request: &JobCreateRequest) -> JobManagementResult<Job> {
        Ok(self.api.create_job(request).await?)
    }

    /// Create several jobs in one call.
    pub async fn queue_jobs(
        &self,
        requests: &[JobCreateRequest],
    ) -> JobManagementResult<Vec<Job>> {
        Ok(self.api.create_jobs(requests).await?)
    }

    /// Create a single job, tolerating a per-item failure.
    pub async fn try_queue_job(
        &self,
        request: &JobCreateRequest,
    ) -> JobManagementResult<Option<JobCreateResult>> {
        let results = self.try_queue_jobs(std::slice::from_ref(request)).await?;
        Ok(results.into_iter().next())
    }

    /// Create several jobs, one result per request, matched by position.
    pub async fn try_queue_jobs(
        &self,
        requests: &[JobCreateRequest],
    ) -> JobManagementResult<Vec<JobCreateResult>> {
        let response = self.api.try_create_jobs(requests).await?;

        match response.into_content() {
            Some(results) => Ok(results),
            None => {
                let job_types = distinct_job_types(requests);
                tracing::error!(job_types = ?job_types, "Failed to create jobs.");
                Err(JobManagementError::JobsNotCreated { job_types })
            }
        }
    }

    /// Latest job of each of `job_types` within a specification.
    pub async fn get_latest_jobs_for_specification(
        &self,
        specification_id: &str,
        job_types: &[String],
    ) -> JobManagementResult<Vec<JobSummary>> {
        let response = self
            .api
            .get_latest_jobs_for_specification(specification_id, job_types)
            .await?;

        if !response.is_success() {
            let err = JobManagementError::JobsNotRetrieved {
                specification_id: specification_id.to_string(),
                job_types: job_types.to_vec(),
                status_code: response.status_code,
            };
            tracing::error!(status_code = response.status_code, "{}", err);
            return Err(err);
        }

        Ok(response.into_content().unwrap_or_default())
    }

    /// Jobs created within `[from, to]` that have not completed.
    ///
    /// Empty on any failure.
    pub async fn get_non_completed_jobs_within_time_frame(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<JobSummary> {
        match self
            .api
            .get_non_completed_jobs_within_time_frame(from, to)
            .await
        {
            Ok(response) if response.is_success() => response.into_content().unwrap_or_default(),
            Ok(response) => {
                tracing::warn!(
                    status_code = response.status_code,
                    "Failed to retrieve non-completed jobs"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to retrieve non-completed jobs");
                Vec::new()
            }
        }
    }

    /// Fetch a job by id. Absent on any failure.
    pub async fn get_job_by_id(&self, job_id: &str) -> Option<Job> {
        match self.api.get_job_by_id(job_id).await {
            Ok(response) if response.is_success() => response.into_content(),
            Ok(response) => {
                tracing::warn!(job_id = %job_id, status_code = response.status_code, "Failed to retrieve job");
                None
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to retrieve job");
                None
            }
        }
    }
}

/// Distinct job types of a batch, in first-seen order.
fn distinct_job_types(requests: &[JobCreateRequest]) -> Vec<String> {
    let mut job_types: Vec<String> = Vec::new();
    for request in requests {
        if !job_types.contains(&request.job_definition_id) {
            job_types.push(request.job_definition_id.clone());
        }
    }
    job_types
}
