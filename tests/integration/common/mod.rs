//! Common utilities for integration tests.

use axum::body::Bytes;
use axum::routing::post;
use axum::Router;
use ev_server::{Handler, Receiver, ServerConfig, TransformationConfig};
use http::header::HeaderMap;
use http::StatusCode;
use std::sync::{Arc, Mutex};

/// One request captured by the stub sink.
pub struct Delivery {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Spawn a receiver on an ephemeral port and return its base URL.
pub async fn spawn_receiver(
    transformations: TransformationConfig,
    destination: Option<String>,
) -> String {
    let handler = Arc::new(Handler::new(&transformations).expect("configuration compiles"));

    let mut config = ServerConfig::new().with_listen_addr("127.0.0.1:0");
    if let Some(destination) = destination {
        config = config.with_destination(destination);
    }
    let receiver = Receiver::new(handler, config).expect("receiver builds");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, receiver.router()).await.expect("serve");
    });

    format!("http://{addr}/")
}

/// Spawn a stub event sink that records every delivery it receives.
pub async fn spawn_sink() -> (String, Arc<Mutex<Vec<Delivery>>>) {
    let received: Arc<Mutex<Vec<Delivery>>> = Arc::new(Mutex::new(Vec::new()));

    let state = received.clone();
    let app = Router::new().route(
        "/",
        post(move |headers: HeaderMap, body: Bytes| {
            let state = state.clone();
            async move {
                state.lock().expect("sink lock").push(Delivery {
                    headers,
                    body: body.to_vec(),
                });
                StatusCode::OK
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve sink");
    });

    (format!("http://{addr}/"), received)
}

/// Build a JSON event request with the standard attribute headers set.
pub fn event_request(
    client: &reqwest::Client,
    url: &str,
    payload: &str,
) -> reqwest::RequestBuilder {
    client
        .post(url)
        .header("ce-id", "1")
        .header("ce-source", "/integration")
        .header("ce-type", "test.type")
        .header("content-type", "application/json; charset=utf-8")
        .body(payload.to_string())
}
