//! Forward-mode integration tests: transformed events go to the sink.

use crate::common::{event_request, spawn_receiver, spawn_sink};
use ev_server::TransformationConfig;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test]
async fn test_forward_mode_delivers_to_sink() {
    let (sink_url, received) = spawn_sink().await;
    let config: TransformationConfig = serde_json::from_str(
        r#"{"payload": [{"kind": "add", "path": "forwarded", "value": "true"}]}"#,
    )
    .unwrap();
    let url = spawn_receiver(config, Some(sink_url)).await;
    let client = reqwest::Client::new();

    let response = event_request(&client, &url, r#"{"a": 1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let deliveries = received.lock().unwrap();
    assert_eq!(deliveries.len(), 1);

    let delivery = &deliveries[0];
    assert_eq!(delivery.headers["ce-id"], "1");
    assert_eq!(delivery.headers["ce-source"], "/integration");
    assert_eq!(delivery.headers["content-type"], "application/json");

    let body: Value = serde_json::from_slice(&delivery.body).unwrap();
    assert_eq!(body, json!({"a": 1, "forwarded": true}));
}

#[tokio::test]
async fn test_forward_mode_rejects_without_forwarding() {
    let (sink_url, received) = spawn_sink().await;
    let url = spawn_receiver(TransformationConfig::default(), Some(sink_url)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&url)
        .header("ce-id", "1")
        .header("ce-source", "/integration")
        .header("ce-type", "test.type")
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    // Give any stray delivery a moment to land before asserting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forward_mode_reports_unreachable_sink() {
    // Nothing listens on this port; delivery must fail with 502.
    let url = spawn_receiver(
        TransformationConfig::default(),
        Some("http://127.0.0.1:9/".to_string()),
    )
    .await;
    let client = reqwest::Client::new();

    let response = event_request(&client, &url, r#"{"a": 1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
}
