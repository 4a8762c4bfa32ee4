//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use jobhub_client::{JobsApiClient, ResiliencePolicy, ResilientJobsApi};
use jobhub_core::config::AppConfig;
use jobhub_core::error::AppError;
use jobhub_core::result::AppResult;
use jobhub_core::traits::NotificationTransport;
use jobhub_core::types::ApiResponse;
use jobhub_entity::job::{
    CompletionStatus, Job, JobCreateRequest, JobCreateResult, JobLog, JobLogUpdate, JobSummary,
    RunningStatus,
};
use jobhub_management::JobManagement;

pub const TOPIC: &str = "job-notifications";
pub const SPEC_ID: &str = "spec-42";
pub const JOB_TYPE: &str = "CreateInstructAllocationJob";

/// In-process stand-in for the remote job service.
///
/// Jobs are kept in creation order. Completing a job publishes a completion
/// notification when a transport is attached.
#[derive(Debug, Default)]
pub struct FakeJobService {
    jobs: Mutex<Vec<Job>>,
    logs: Mutex<Vec<JobLog>>,
    notifications: Option<NotificationTransport>,
    unavailable: AtomicBool,
}

impl FakeJobService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish completion notifications through `transport`.
    pub fn with_notifications(transport: NotificationTransport) -> Self {
        Self {
            notifications: Some(transport),
            ..Self::default()
        }
    }

    /// Make every query answer 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn start(&self, job_id: &str) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.running_status = RunningStatus::InProgress;
            job.last_updated = Utc::now();
        }
    }

    /// Mark a job finished and publish its summary.
    pub async fn complete(&self, job_id: &str, status: CompletionStatus) {
        let summary = {
            let mut jobs = self.jobs.lock().await;
            let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
                return;
            };
            job.running_status = RunningStatus::Completed;
            job.completion_status = Some(status);
            job.last_updated = Utc::now();
            to_summary(job)
        };

        if let Some(transport) = &self.notifications {
            let body = serde_json::to_value(&summary).unwrap();
            transport.send_to_topic(TOPIC, body).await.unwrap();
        }
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn logs(&self) -> Vec<JobLog> {
        self.logs.lock().await.clone()
    }

    fn new_job(request: &JobCreateRequest) -> Job {
        Job {
            id: Uuid::new_v4().to_string(),
            job_definition_id: request.job_definition_id.clone(),
            specification_id: request.specification_id.clone(),
            correlation_id: request.correlation_id.clone(),
            parent_job_id: request.parent_job_id.clone(),
            invoker_user_id: request.invoker_user_id.clone(),
            invoker_user_display_name: request.invoker_user_display_name.clone(),
            item_count: request.item_count,
            trigger: request.trigger.clone(),
            running_status: RunningStatus::Queued,
            completion_status: None,
            outcome: None,
            properties: request.properties.clone(),
            created: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    fn check_available(&self) -> Option<u16> {
        self.unavailable.load(Ordering::SeqCst).then_some(503)
    }
}

fn to_summary(job: &Job) -> JobSummary {
    JobSummary {
        job_id: job.id.clone(),
        job_type: job.job_definition_id.clone(),
        specification_id: job.specification_id.clone(),
        entity_id: job.trigger.entity_id.clone(),
        parent_job_id: job.parent_job_id.clone(),
        running_status: job.running_status,
        completion_status: job.completion_status,
        outcome: job.outcome.clone(),
        created: Some(job.created),
        last_updated: Some(job.last_updated),
    }
}

#[async_trait]
impl JobsApiClient for FakeJobService {
    async fn create_job(&self, request: &JobCreateRequest) -> AppResult<Job> {
        if self.check_available().is_some() {
            return Err(AppError::service_unavailable("job service unavailable"));
        }
        let job = Self::new_job(request);
        self.jobs.lock().await.push(job.clone());
        Ok(job)
    }

    async fn create_jobs(&self, requests: &[JobCreateRequest]) -> AppResult<Vec<Job>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(self.create_job(request).await?);
        }
        Ok(created)
    }

    async fn try_create_jobs(
        &self,
        requests: &[JobCreateRequest],
    ) -> AppResult<ApiResponse<Vec<JobCreateResult>>> {
        if let Some(code) = self.check_available() {
            return Ok(ApiResponse::empty(code));
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = if request.specification_id.is_none() {
                JobCreateResult {
                    job: None,
                    create_request: request.clone(),
                    error: Some("A specification id is required".to_string()),
                }
            } else {
                let job = Self::new_job(request);
                self.jobs.lock().await.push(job.clone());
                JobCreateResult {
                    job: Some(job),
                    create_request: request.clone(),
                    error: None,
                }
            };
            results.push(result);
        }
        Ok(ApiResponse::ok(results))
    }

    async fn get_job_by_id(&self, job_id: &str) -> AppResult<ApiResponse<Job>> {
        if let Some(code) = self.check_available() {
            return Ok(ApiResponse::empty(code));
        }
        let jobs = self.jobs.lock().await;
        Ok(match jobs.iter().find(|j| j.id == job_id) {
            Some(job) => ApiResponse::ok(job.clone()),
            None => ApiResponse::empty(404),
        })
    }

    async fn add_job_log(
        &self,
        job_id: &str,
        update: &JobLogUpdate,
    ) -> AppResult<ApiResponse<JobLog>> {
        if !self.jobs.lock().await.iter().any(|j| j.id == job_id) {
            return Ok(ApiResponse::empty(404));
        }
        let log = JobLog {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            completed_successfully: update.completed_successfully,
            items_processed: update.items_processed,
            items_succeeded: update.items_succeeded,
            items_failed: update.items_failed,
            outcome: update.outcome.clone(),
            timestamp: Utc::now(),
        };
        self.logs.lock().await.push(log.clone());
        Ok(ApiResponse::new(201, Some(log)))
    }

    async fn get_latest_jobs_for_specification(
        &self,
        specification_id: &str,
        job_types: &[String],
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        if let Some(code) = self.check_available() {
            return Ok(ApiResponse::empty(code));
        }
        let jobs = self.jobs.lock().await;
        let latest = job_types
            .iter()
            .filter_map(|job_type| {
                jobs.iter().rev().find(|j| {
                    &j.job_definition_id == job_type
                        && j.specification_id.as_deref() == Some(specification_id)
                })
            })
            .map(to_summary)
            .collect();
        Ok(ApiResponse::ok(latest))
    }

    async fn get_non_completed_jobs_within_time_frame(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        if let Some(code) = self.check_available() {
            return Ok(ApiResponse::empty(code));
        }
        let jobs = self.jobs.lock().await;
        Ok(ApiResponse::ok(
            jobs.iter()
                .filter(|j| !j.is_completed() && j.created >= from && j.created <= to)
                .map(to_summary)
                .collect(),
        ))
    }
}

/// Config with the given messaging provider and test-sized resilience.
pub fn test_config(provider: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.messaging.provider = provider.to_string();
    config.resilience.retry_delays_ms = vec![10, 20];
    config.resilience.circuit_breaker_failure_threshold = 5;
    config.wait.poll_timeout_ms = 60_000;
    config.wait.poll_interval_ms = 5_000;
    config
}

/// Wire a coordinator to `service` over the configured transport.
pub fn management(
    service: Arc<FakeJobService>,
    transport: NotificationTransport,
    config: &AppConfig,
) -> JobManagement {
    let api = ResilientJobsApi::new(service, ResiliencePolicy::from_config(&config.resilience));
    JobManagement::from_config(api, transport, config)
}

/// Complete `job_id` after `delay` on a background task.
pub fn complete_later(
    service: Arc<FakeJobService>,
    job_id: String,
    delay: Duration,
    status: CompletionStatus,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay / 2).await;
        service.start(&job_id).await;
        tokio::time::sleep(delay - delay / 2).await;
        service.complete(&job_id, status).await;
    });
}
