mod mocks;

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mocks::{resolver::MockResolver, summarizer::MockSummarizer, transcriber::MockTranscriber};
use recap_engine::{
    server::{router, AppState},
    DispatcherConfig, JobDispatcher, SummaryPipelineBuilder,
};
use recap_jobs::JobStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(
    resolver: MockResolver,
    transcriber: MockTranscriber,
    summarizer: MockSummarizer,
) -> Router {
    let store = Arc::new(JobStore::new());
    let pipeline = Arc::new(
        SummaryPipelineBuilder::new()
            .resolver(resolver)
            .transcriber(transcriber)
            .summarizer(summarizer)
            .build(),
    );
    let dispatcher = Arc::new(JobDispatcher::start(
        Arc::clone(&store),
        Arc::clone(&pipeline),
        DispatcherConfig::default(),
    ));

    router(AppState {
        store,
        pipeline,
        dispatcher,
    })
}

fn happy_app() -> Router {
    test_app(
        MockResolver::new("ABC123", "T"),
        MockTranscriber::new("hello world"),
        MockSummarizer::new("S"),
    )
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Polls the result endpoint until the job leaves the processing state.
async fn poll_result(app: &Router, request_id: &str) -> (StatusCode, Value) {
    for _ in 0..500 {
        let (status, body) = send(app, "GET", &format!("/result/{request_id}"), None).await;
        if body["message"] != json!("Still processing") {
            return (status, body);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {request_id} did not reach a terminal state in time");
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = happy_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn missing_video_url_is_rejected_without_creating_a_record() {
    let app = happy_app();

    let (status, body) = send(&app, "POST", "/summarize", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Missing video_url in request"));

    // no record exists for any guessed id
    let (status, _) = send(&app, "GET", "/status/req_0-0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_video_url_is_rejected_too() {
    let app = happy_app();
    let (status, body) = send(&app, "POST", "/summarize", Some(json!({"video_url": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Missing video_url in request"));
}

#[tokio::test]
async fn submit_status_result_roundtrip() {
    let app = happy_app();

    let (status, body) = send(
        &app,
        "POST",
        "/summarize",
        Some(json!({"video_url": "https://youtube.com/watch?v=ABC123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Processing started"));
    let request_id = body["request_id"].as_str().expect("request_id in response").to_string();

    let (status, body) = send(&app, "GET", &format!("/status/{request_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["status"].is_string());

    let (status, body) = poll_result(&app, &request_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["summary"], json!("S"));

    // outcome was consumed, the id is gone now
    let (status, _) = send(&app, "GET", &format!("/result/{request_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/status/{request_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_reports_result_ready_before_consumption() {
    let app = happy_app();

    let (_, body) = send(
        &app,
        "POST",
        "/summarize",
        Some(json!({"video_url": "https://youtube.com/watch?v=ABC123"})),
    )
    .await;
    let request_id = body["request_id"].as_str().unwrap().to_string();

    // status keeps answering 200 until the result is consumed
    for _ in 0..500 {
        let (status, body) = send(&app, "GET", &format!("/status/{request_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == json!("Result ready") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("status never reported a ready result");
}

#[tokio::test]
async fn failed_job_is_reported_once_through_result() {
    let app = test_app(
        MockResolver::failing("no video id"),
        MockTranscriber::new("hello world"),
        MockSummarizer::new("S"),
    );

    let (_, body) = send(
        &app,
        "POST",
        "/summarize",
        Some(json!({"video_url": "https://example.com/nope"})),
    )
    .await;
    let request_id = body["request_id"].as_str().unwrap().to_string();

    let (status, body) = poll_result(&app, &request_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Could not extract video ID from URL"));

    let (status, _) = send(&app, "GET", &format!("/result/{request_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sync_endpoint_returns_the_full_outcome_in_one_call() {
    let app = happy_app();

    let (status, body) = send(
        &app,
        "POST",
        "/summarize-sync",
        Some(json!({"video_url": "https://youtube.com/watch?v=ABC123"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["summary"], json!("S"));
    assert_eq!(body["video_id"], json!("ABC123"));
    assert_eq!(body["video_title"], json!("T"));
}

#[tokio::test]
async fn sync_endpoint_maps_stage_failures_to_bad_request() {
    let app = test_app(
        MockResolver::new("ABC123", "T"),
        MockTranscriber::failing("Whisper API timeout"),
        MockSummarizer::new("S"),
    );

    let (status, body) = send(
        &app,
        "POST",
        "/summarize-sync",
        Some(json!({"video_url": "https://youtube.com/watch?v=ABC123"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Could not transcribe video audio"));
}
