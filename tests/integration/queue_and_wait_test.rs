//! End-to-end tests for submitting jobs and waiting on completion.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use jobhub_client::policy::CircuitState;
use jobhub_entity::job::{CompletionStatus, JobCreateRequest, JobLogUpdate};
use jobhub_management::{JobManagementError, JobWaitRequest};

use helpers::{FakeJobService, JOB_TYPE, SPEC_ID, TOPIC, complete_later, management, test_config};

fn wait_request(correlation_id: &str) -> JobWaitRequest {
    JobWaitRequest::new(JOB_TYPE, SPEC_ID, correlation_id, TOPIC)
}

#[tokio::test(start_paused = true)]
async fn test_push_mode_waits_for_notification() {
    let config = test_config("memory");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    assert!(transport.supports_subscriptions());

    let service = Arc::new(FakeJobService::with_notifications(transport.clone()));
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);
    let correlation_id = request.correlation_id.clone().unwrap();

    let start = Instant::now();
    let ok = management
        .queue_job_and_wait(
            || async {
                let job = management.queue_job(&request).await?;
                complete_later(
                    service.clone(),
                    job.id,
                    Duration::from_secs(8),
                    CompletionStatus::Succeeded,
                );
                Ok::<_, JobManagementError>(true)
            },
            &wait_request(&correlation_id),
        )
        .await
        .unwrap();

    assert!(ok);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(8));
    assert!(elapsed < Duration::from_secs(9));
    assert_eq!(service.job_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_push_mode_reports_failed_job() {
    let config = test_config("memory");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::with_notifications(transport.clone()));
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);

    let ok = management
        .queue_job_and_wait(
            || async {
                let job = management.queue_job(&request).await?;
                complete_later(
                    service.clone(),
                    job.id,
                    Duration::from_secs(2),
                    CompletionStatus::Failed,
                );
                Ok::<_, JobManagementError>(true)
            },
            &wait_request("corr-failed"),
        )
        .await
        .unwrap();

    assert!(!ok);
}

#[tokio::test(start_paused = true)]
async fn test_push_mode_times_out_without_notification() {
    let config = test_config("memory");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);

    let start = Instant::now();
    let ok = management
        .queue_job_and_wait(
            || async {
                management.queue_job(&request).await?;
                Ok::<_, JobManagementError>(true)
            },
            &wait_request("corr-silent").with_poll_timeout(Duration::from_secs(20)),
        )
        .await
        .unwrap();

    assert!(!ok);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(20));
    assert!(elapsed < Duration::from_secs(21));
}

#[tokio::test(start_paused = true)]
async fn test_poll_mode_waits_for_latest_job() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    assert!(!transport.supports_subscriptions());

    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);

    let start = Instant::now();
    let ok = management
        .queue_job_and_wait(
            || async {
                let job = management.queue_job(&request).await?;
                complete_later(
                    service.clone(),
                    job.id,
                    Duration::from_secs(12),
                    CompletionStatus::Succeeded,
                );
                Ok::<_, JobManagementError>(true)
            },
            &wait_request("corr-poll"),
        )
        .await
        .unwrap();

    assert!(ok);
    // polled every 5s: still running at 0s, 5s and 10s, completed by 15s
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(15));
    assert!(elapsed < Duration::from_secs(16));
}

#[tokio::test(start_paused = true)]
async fn test_poll_mode_reports_failed_job() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);

    let ok = management
        .queue_job_and_wait(
            || async {
                let job = management.queue_job(&request).await?;
                complete_later(
                    service.clone(),
                    job.id,
                    Duration::from_secs(3),
                    CompletionStatus::Failed,
                );
                Ok::<_, JobManagementError>(true)
            },
            &wait_request("corr-poll-failed"),
        )
        .await
        .unwrap();

    assert!(!ok);
}

#[tokio::test(start_paused = true)]
async fn test_poll_mode_survives_outage_and_times_out() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);
    let request = JobCreateRequest::new(JOB_TYPE, SPEC_ID);

    let start = Instant::now();
    let ok = management
        .queue_job_and_wait(
            || async {
                management.queue_job(&request).await?;
                service.set_unavailable(true);
                Ok::<_, JobManagementError>(true)
            },
            &wait_request("corr-outage"),
        )
        .await
        .unwrap();

    assert!(!ok);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(60));
    assert!(elapsed < Duration::from_secs(65));
}

#[tokio::test(start_paused = true)]
async fn test_breaker_opens_after_repeated_outage() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    service.set_unavailable(true);

    let api = jobhub_client::ResilientJobsApi::new(
        service.clone(),
        jobhub_client::ResiliencePolicy::from_config(&config.resilience),
    );
    let management = jobhub_management::JobManagement::from_config(api.clone(), transport, &config);

    // first call: one attempt plus two retries, all 503
    let err = management
        .get_latest_jobs_for_specification(SPEC_ID, &[JOB_TYPE.to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, JobManagementError::JobsNotRetrieved { status_code: 503, .. }));
    assert_eq!(api.circuit_state(), CircuitState::Closed);

    // two more failures reach the threshold of five
    let _ = management
        .get_latest_jobs_for_specification(SPEC_ID, &[JOB_TYPE.to_string()])
        .await;
    assert_eq!(api.circuit_state(), CircuitState::Open);

    let err = management
        .get_latest_jobs_for_specification(SPEC_ID, &[JOB_TYPE.to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, JobManagementError::Api(_)));
}

#[tokio::test]
async fn test_nothing_to_queue_is_success() {
    let config = test_config("memory");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);

    let ok = management
        .queue_job_and_wait(|| async { Ok::<_, JobManagementError>(false) }, &wait_request("corr-none"))
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(service.job_count().await, 0);
}

#[tokio::test]
async fn test_job_lifecycle_through_pass_throughs() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);

    let job = management
        .queue_job(&JobCreateRequest::new(JOB_TYPE, SPEC_ID))
        .await
        .unwrap();

    let fetched = management
        .retrieve_job_and_check_can_be_processed(&job.id)
        .await
        .unwrap();
    assert_eq!(fetched.id, job.id);

    management
        .update_job_status_items(&job.id, 20, 2, None, None)
        .await;
    let log = management
        .add_job_log(&job.id, &JobLogUpdate::progress(100, Some(true), None))
        .await
        .unwrap();
    assert!(log.is_some());
    assert_eq!(service.logs().await.len(), 2);
    assert_eq!(service.logs().await[0].items_succeeded, Some(18));

    let pending = management
        .get_non_completed_jobs_within_time_frame(
            chrono::Utc::now() - chrono::Duration::minutes(5),
            chrono::Utc::now() + chrono::Duration::minutes(5),
        )
        .await;
    assert_eq!(pending.len(), 1);

    service.complete(&job.id, CompletionStatus::Succeeded).await;
    let err = management
        .retrieve_job_and_check_can_be_processed(&job.id)
        .await
        .unwrap_err();
    assert!(matches!(err, JobManagementError::JobAlreadyCompleted { .. }));

    let err = management
        .retrieve_job_and_check_can_be_processed("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, JobManagementError::JobNotFound { .. }));
    assert!(management.get_job_by_id("missing").await.is_none());
}

#[tokio::test]
async fn test_try_queue_jobs_reports_per_item_outcome() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let service = Arc::new(FakeJobService::new());
    let management = management(service.clone(), transport, &config);

    let mut unscoped = JobCreateRequest::new("Other", SPEC_ID);
    unscoped.specification_id = None;
    let requests = vec![
        JobCreateRequest::new(JOB_TYPE, SPEC_ID),
        unscoped,
        JobCreateRequest::new(JOB_TYPE, SPEC_ID),
    ];

    let results = management.try_queue_jobs(&requests).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].was_created());
    assert!(!results[1].was_created());
    assert!(results[2].was_created());
    assert_eq!(results[1].create_request, requests[1]);
    assert_eq!(service.job_count().await, 2);
}
