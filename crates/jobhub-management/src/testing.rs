//! Test doubles shared by the unit tests of this crate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use jobhub_client::{JobsApiClient, ResiliencePolicy, ResilientJobsApi};
use jobhub_core::result::AppResult;
use jobhub_core::traits::{HealthStatus, MessagePredicate, MessengerService, SubscriptionService};
use jobhub_core::types::ApiResponse;
use jobhub_entity::job::{
    CompletionStatus, Job, JobCreateRequest, JobCreateResult, JobLog, JobLogUpdate, JobSummary,
    RunningStatus, Trigger,
};
use jobhub_messaging::MemoryMessenger;

pub const JOB_TYPE: &str = "CreateAllocationJob";
pub const SPEC_ID: &str = "spec-1";
pub const TOPIC: &str = "job-notifications";

/// Scripted job service.
///
/// `latest` responses are served in order; the last one repeats. When
/// `latest_delay` is set, latest-job queries sleep that long first.
#[derive(Debug, Default)]
pub struct FakeJobsApi {
    pub latest: Mutex<Vec<ApiResponse<Vec<JobSummary>>>>,
    pub job: Mutex<Option<ApiResponse<Job>>>,
    pub try_create: Mutex<Option<ApiResponse<Vec<JobCreateResult>>>>,
    pub log_response: Mutex<Option<ApiResponse<JobLog>>>,
    pub non_completed: Mutex<Option<ApiResponse<Vec<JobSummary>>>>,
    pub logged: Mutex<Vec<(String, JobLogUpdate)>>,
    pub latest_calls: AtomicU32,
    pub latest_delay: Mutex<Option<Duration>>,
}

impl FakeJobsApi {
    pub fn with_latest(responses: Vec<ApiResponse<Vec<JobSummary>>>) -> Self {
        Self {
            latest: Mutex::new(responses),
            ..Self::default()
        }
    }

    pub fn latest_calls(&self) -> u32 {
        self.latest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobsApiClient for FakeJobsApi {
    async fn create_job(&self, request: &JobCreateRequest) -> AppResult<Job> {
        Ok(job_from(request, "job-created"))
    }

    async fn create_jobs(&self, requests: &[JobCreateRequest]) -> AppResult<Vec<Job>> {
        Ok(requests
            .iter()
            .enumerate()
            .map(|(i, r)| job_from(r, &format!("job-{i}")))
            .collect())
    }

    async fn try_create_jobs(
        &self,
        _requests: &[JobCreateRequest],
    ) -> AppResult<ApiResponse<Vec<JobCreateResult>>> {
        Ok(self
            .try_create
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ApiResponse::empty(500)))
    }

    async fn get_job_by_id(&self, _job_id: &str) -> AppResult<ApiResponse<Job>> {
        Ok(self
            .job
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ApiResponse::empty(404)))
    }

    async fn add_job_log(
        &self,
        job_id: &str,
        update: &JobLogUpdate,
    ) -> AppResult<ApiResponse<JobLog>> {
        self.logged
            .lock()
            .unwrap()
            .push((job_id.to_string(), update.clone()));
        Ok(self
            .log_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ApiResponse::empty(400)))
    }

    async fn get_latest_jobs_for_specification(
        &self,
        _specification_id: &str,
        _job_types: &[String],
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.latest_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut latest = self.latest.lock().unwrap();
        let response = match latest.len() {
            0 => ApiResponse::ok(Vec::new()),
            1 => latest[0].clone(),
            _ => latest.remove(0),
        };
        Ok(response)
    }

    async fn get_non_completed_jobs_within_time_frame(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> AppResult<ApiResponse<Vec<JobSummary>>> {
        Ok(self
            .non_completed
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ApiResponse::empty(500)))
    }
}

/// Wrap a fake in a policy that calls straight through.
pub fn resilient(api: Arc<FakeJobsApi>) -> ResilientJobsApi {
    ResilientJobsApi::new(api, ResiliencePolicy::passthrough())
}

pub fn summary(running: RunningStatus, completion: Option<CompletionStatus>) -> JobSummary {
    JobSummary {
        job_id: "job-1".to_string(),
        job_type: JOB_TYPE.to_string(),
        specification_id: Some(SPEC_ID.to_string()),
        entity_id: None,
        parent_job_id: None,
        running_status: running,
        completion_status: completion,
        outcome: None,
        created: None,
        last_updated: None,
    }
}

pub fn running() -> ApiResponse<Vec<JobSummary>> {
    ApiResponse::ok(vec![summary(RunningStatus::InProgress, None)])
}

pub fn finished(status: CompletionStatus) -> ApiResponse<Vec<JobSummary>> {
    ApiResponse::ok(vec![summary(RunningStatus::Completed, Some(status))])
}

pub fn job(id: &str, completion: Option<CompletionStatus>) -> Job {
    let mut job = job_from(&JobCreateRequest::new(JOB_TYPE, SPEC_ID), id);
    if completion.is_some() {
        job.running_status = RunningStatus::Completed;
    }
    job.completion_status = completion;
    job
}

fn job_from(request: &JobCreateRequest, id: &str) -> Job {
    Job {
        id: id.to_string(),
        job_definition_id: request.job_definition_id.clone(),
        specification_id: request.specification_id.clone(),
        correlation_id: request.correlation_id.clone(),
        parent_job_id: None,
        invoker_user_id: None,
        invoker_user_display_name: None,
        item_count: None,
        trigger: Trigger::default(),
        running_status: RunningStatus::Queued,
        completion_status: None,
        outcome: None,
        properties: Default::default(),
        created: Utc::now(),
        last_updated: Utc::now(),
    }
}

/// In-memory broker that counts subscription lifecycle calls.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub inner: MemoryMessenger,
    pub created: AtomicU32,
    pub deleted: AtomicU32,
}

impl RecordingMessenger {
    pub fn created(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> u32 {
        self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessengerService for RecordingMessenger {
    fn service_name(&self) -> &str {
        "recording"
    }

    async fn is_health_ok(&self, queue_name: &str) -> HealthStatus {
        self.inner.is_health_ok(queue_name).await
    }

    async fn send_to_queue(&self, queue_name: &str, body: Value) -> AppResult<()> {
        self.inner.send_to_queue(queue_name, body).await
    }

    async fn send_to_topic(&self, topic_name: &str, body: Value) -> AppResult<()> {
        self.inner.send_to_topic(topic_name, body).await
    }

    async fn receive_messages(
        &self,
        entity_path: &str,
        timeout: Duration,
    ) -> AppResult<Vec<Value>> {
        self.inner.receive_messages(entity_path, timeout).await
    }

    async fn receive_message(
        &self,
        entity_path: &str,
        predicate: &MessagePredicate<'_>,
        timeout: Duration,
    ) -> AppResult<Option<Value>> {
        self.inner
            .receive_message(entity_path, predicate, timeout)
            .await
    }
}

#[async_trait]
impl SubscriptionService for RecordingMessenger {
    async fn create_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
        time_to_live: Duration,
    ) -> AppResult<()> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.inner
            .create_subscription(topic_name, subscription_name, time_to_live)
            .await
    }

    async fn delete_subscription(
        &self,
        topic_name: &str,
        subscription_name: &str,
    ) -> AppResult<()> {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        self.inner
            .delete_subscription(topic_name, subscription_name)
            .await
    }
}
