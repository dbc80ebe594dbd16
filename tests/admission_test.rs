//! Integration tests for admission control at the HTTP boundary.

mod common;

use common::Part;
use http::StatusCode;

use docpress_engine::job::{Job, JobKind};

#[tokio::test]
async fn request_while_slot_is_held_returns_server_busy() {
    // One slot, zero queue wait: a held slot rejects the next request
    // immediately instead of queueing it for the test's duration.
    let app = common::TestApp::with_config(|config| {
        config.jobs.queue_wait_seconds = 0;
    })
    .await;

    let held = app
        .state
        .admission
        .admit(&Job::new(JobKind::Compress))
        .await
        .unwrap();

    let pdf = common::sample_pdf(1);
    let response = app
        .post_multipart(
            "/api/convert/split",
            &[Part::File {
                filename: "a.pdf",
                content_type: "application/pdf",
                data: &pdf,
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.error_code(), "SERVER_BUSY");

    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["retryable"], true);

    drop(held);
}

#[tokio::test]
async fn invalid_request_is_rejected_as_validation_even_when_saturated() {
    // With the only slot held and no queue wait, a request that reaches
    // admission would get SERVER_BUSY. An invalid one must be rejected as
    // a validation error first, without ever competing for the slot.
    let app = common::TestApp::with_config(|config| {
        config.jobs.queue_wait_seconds = 0;
    })
    .await;

    let held = app
        .state
        .admission
        .admit(&Job::new(JobKind::Compress))
        .await
        .unwrap();

    // A merge with a single valid PDF is invalid regardless of load.
    let pdf = common::sample_pdf(1);
    let response = app
        .post_multipart(
            "/api/convert/merge",
            &[Part::File {
                filename: "only.pdf",
                content_type: "application/pdf",
                data: &pdf,
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");

    drop(held);
}

#[tokio::test]
async fn slot_is_reusable_after_release() {
    let app = common::TestApp::with_config(|config| {
        config.jobs.queue_wait_seconds = 0;
    })
    .await;

    let held = app
        .state
        .admission
        .admit(&Job::new(JobKind::Compress))
        .await
        .unwrap();
    drop(held);

    let pdf = common::sample_pdf(1);
    let response = app
        .post_multipart(
            "/api/convert/compress",
            &[Part::File {
                filename: "a.pdf",
                content_type: "application/pdf",
                data: &pdf,
            }],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn validation_failures_never_consume_a_slot() {
    let app = common::TestApp::new().await;

    // Invalid request: no file at all.
    let response = app.post_multipart("/api/convert/split", &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // The slot was never touched; a real job still gets in instantly.
    let occupancy = app.state.admission.occupancy();
    assert_eq!(occupancy.running, 0);
    assert_eq!(occupancy.queued, 0);
}
