//! Reply-mode integration tests: decode, transform, respond.

use crate::common::{event_request, spawn_receiver};
use ev_server::TransformationConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_reply_mode_passes_event_through() {
    let url = spawn_receiver(TransformationConfig::default(), None).await;
    let client = reqwest::Client::new();

    let response = event_request(&client, &url, r#"{"a": 1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["ce-id"], "1");
    assert_eq!(response.headers()["ce-source"], "/integration");
    assert_eq!(response.headers()["ce-type"], "test.type");
    // The declared content type is normalized to the bare media type.
    assert_eq!(response.headers()["content-type"], "application/json");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"a": 1}));
}

#[tokio::test]
async fn test_reply_mode_applies_both_pipelines() {
    let config: TransformationConfig = serde_json::from_str(
        r#"{
            "envelope": [
                {"kind": "add", "path": "Extensions.category", "value": "alpha"}
            ],
            "payload": [
                {"kind": "delete", "path": "secret"},
                {"kind": "add", "path": "meta.tag", "value": "processed"}
            ]
        }"#,
    )
    .unwrap();
    let url = spawn_receiver(config, None).await;
    let client = reqwest::Client::new();

    let response = event_request(&client, &url, r#"{"a": 2, "secret": "hide-me"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["ce-category"], "alpha");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"a": 2, "meta": {"tag": "processed"}}));
}

#[tokio::test]
async fn test_non_json_content_type_is_rejected() {
    let url = spawn_receiver(TransformationConfig::default(), None).await;
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
}

#[tokio::test]
async fn test_missing_attribute_headers_are_rejected() {
    let url = spawn_receiver(TransformationConfig::default(), None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&url)
        .header("content-type", "application/json")
        .body(r#"{"a": 1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_stored_variables_persist_across_deliveries() {
    let config: TransformationConfig = serde_json::from_str(
        r#"{
            "payload": [
                {"kind": "store", "path": "a", "value": "$last_a"},
                {"kind": "add", "path": "prev", "value": "$last_a"}
            ]
        }"#,
    )
    .unwrap();
    let url = spawn_receiver(config, None).await;
    let client = reqwest::Client::new();

    let first: Value = event_request(&client, &url, r#"{"a": 41}"#)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first, json!({"a": 41, "prev": 41}));

    // The second payload has no "a", so the store fails as a warning
    // and the add reads the value kept from the first delivery.
    let second: Value = event_request(&client, &url, r#"{"b": 9}"#)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second, json!({"b": 9, "prev": 41}));
}

#[tokio::test]
async fn test_healthz() {
    let url = spawn_receiver(TransformationConfig::default(), None).await;
    let response = reqwest::get(format!("{url}healthz")).await.unwrap();
    assert_eq!(response.status(), 200);
}
