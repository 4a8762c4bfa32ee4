//! Notification transports as selected from configuration.

mod helpers;

use std::time::Duration;

use serde_json::json;

use jobhub_core::error::ErrorKind;
use jobhub_core::traits::NotificationTransport;
use jobhub_core::traits::messenger::{receive_message_as, subscription_path};
use jobhub_entity::job::{CompletionStatus, JobSummary};

use helpers::{TOPIC, test_config};

#[tokio::test(start_paused = true)]
async fn test_memory_transport_delivers_to_subscription() {
    let config = test_config("memory");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    let NotificationTransport::PubSub(messenger) = transport.clone() else {
        panic!("memory transport should support subscriptions");
    };

    messenger
        .create_subscription(TOPIC, "corr-1", config.messaging.subscription_ttl())
        .await
        .unwrap();

    transport
        .send_to_topic(
            TOPIC,
            json!({
                "jobId": "job-1",
                "jobType": "Other",
                "specificationId": "spec-1",
                "runningStatus": "Completed",
                "completionStatus": "Succeeded"
            }),
        )
        .await
        .unwrap();
    transport
        .send_to_topic(
            TOPIC,
            json!({
                "jobId": "job-2",
                "jobType": "Wanted",
                "specificationId": "spec-1",
                "runningStatus": "Completed",
                "completionStatus": "Failed"
            }),
        )
        .await
        .unwrap();

    let path = subscription_path(TOPIC, "corr-1");
    let notice = receive_message_as(
        messenger.as_ref(),
        &path,
        |s: &JobSummary| s.matches("Wanted", "spec-1"),
        Duration::from_secs(5),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(notice.job_id, "job-2");
    assert_eq!(notice.completion_status, Some(CompletionStatus::Failed));

    messenger.delete_subscription(TOPIC, "corr-1").await.unwrap();
    let err = messenger
        .receive_messages(&path, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Messaging);
}

#[tokio::test(start_paused = true)]
async fn test_queue_transport_round_trips_queue_messages() {
    let config = test_config("queue");
    let transport = jobhub_messaging::connect(&config.messaging).await.unwrap();
    assert!(!transport.supports_subscriptions());
    assert!(transport.is_health_ok("calc-events").await.ok);
    assert!(!transport.is_health_ok(" ").await.ok);

    transport
        .send_to_queue("calc-events", json!({"n": 1}))
        .await
        .unwrap();
    transport
        .send_to_queue("calc-events", json!({"n": 2}))
        .await
        .unwrap();

    let NotificationTransport::QueueOnly(messenger) = &transport else {
        panic!("queue transport should not support subscriptions");
    };
    let messages = messenger
        .receive_messages("calc-events", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(messages, vec![json!({"n": 1}), json!({"n": 2})]);

    let err = transport
        .send_to_topic(TOPIC, json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotImplemented);
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let config = test_config("smoke-signals");
    let err = jobhub_messaging::connect(&config.messaging)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
