//! Poll-mode completion detection.
//!
//! Used when the notification transport cannot deliver completion messages.
//! The latest job of a type is re-queried on an interval while a timer task
//! enforces the overall timeout through a [`CancellationToken`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use jobhub_client::ResilientJobsApi;
use jobhub_entity::job::{CompletionStatus, JobSummary};

/// Polls the job service until the latest job of a type leaves a state.
#[derive(Debug, Clone)]
pub struct PollCompletionWatcher {
    api: ResilientJobsApi,
}

impl PollCompletionWatcher {
    /// Create a watcher querying through `api`.
    pub fn new(api: ResilientJobsApi) -> Self {
        Self { api }
    }

    /// Wait for the latest `job_type` job of `specification_id` to finish.
    ///
    /// Returns `false` when the timeout elapses while the job is still
    /// running (or has not appeared), or when the job finished as failed.
    pub async fn wait_for_job_to_complete(
        &self,
        job_type: &str,
        specification_id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> bool {
        let still_running = |summary: Option<&JobSummary>| {
            summary.is_none_or(|s| s.running_status.is_running())
        };

        if !self
            .poll_while(job_type, specification_id, still_running, timeout, interval)
            .await
        {
            return false;
        }

        self.check_latest_job(job_type, specification_id, |summary: Option<&JobSummary>| {
            summary.is_none_or(|s| s.completion_status != Some(CompletionStatus::Failed))
        })
        .await
    }

    /// Re-check `condition` every `interval` for as long as it holds.
    ///
    /// Returns `true` once the condition stops holding, `false` when
    /// `timeout` elapsed first.
    pub async fn poll_while<P>(
        &self,
        job_type: &str,
        specification_id: &str,
        condition: P,
        timeout: Duration,
        interval: Duration,
    ) -> bool
    where
        P: Fn(Option<&JobSummary>) -> bool,
    {
        let timed_out = CancellationToken::new();
        let stop_timer = CancellationToken::new();

        tokio::spawn(enforce_timeout(
            timeout,
            timed_out.clone(),
            stop_timer.clone(),
            job_type.to_string(),
        ));
        let _stop_timer = stop_timer.drop_guard();

        loop {
            let holds = tokio::select! {
                biased;
                _ = timed_out.cancelled() => return false,
                holds = self.check_latest_job(job_type, specification_id, &condition) => holds,
            };

            if !holds {
                return true;
            }

            tracing::debug!(
                job_type = %job_type,
                specification_id = %specification_id,
                interval_ms = interval.as_millis() as u64,
                "Job still pending, polling again"
            );

            tokio::select! {
                biased;
                _ = timed_out.cancelled() => return false,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Evaluate `predicate` against the latest `job_type` job.
    ///
    /// A failed query yields `true`: an unknown state is treated as
    /// "keep waiting", never as a job failure.
    pub async fn check_latest_job<P>(
        &self,
        job_type: &str,
        specification_id: &str,
        predicate: P,
    ) -> bool
    where
        P: Fn(Option<&JobSummary>) -> bool,
    {
        let job_types = [job_type.to_string()];

        match self
            .api
            .get_latest_jobs_for_specification(specification_id, &job_types)
            .await
        {
            Ok(response) if response.is_success() => {
                let summaries = response.into_content().unwrap_or_default();
                let latest = summaries.iter().find(|s| s.job_type == job_type);
                predicate(latest)
            }
            Ok(response) => {
                tracing::warn!(
                    job_type = %job_type,
                    specification_id = %specification_id,
                    status_code = response.status_code,
                    "Latest job query failed, treating job state as unknown"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    job_type = %job_type,
                    specification_id = %specification_id,
                    error = %e,
                    "Latest job query failed, treating job state as unknown"
                );
                true
            }
        }
    }
}

/// Sleep for `timeout` and then signal `timed_out`, unless `stop` fires first.
async fn enforce_timeout(
    timeout: Duration,
    timed_out: CancellationToken,
    stop: CancellationToken,
    job_type: String,
) {
    tokio::select! {
        _ = stop.cancelled() => {}
        _ = tokio::time::sleep(timeout) => {
            tracing::error!(
                job_type = %job_type,
                "Poll timeout waiting for the following job type : {} to complete.",
                job_type
            );
            timed_out.cancel();
        }
    }
}
