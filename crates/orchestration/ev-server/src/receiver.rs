//! HTTP receiver: the network-facing shell around the handler.
//!
//! Every inbound POST is decoded, transformed exactly once, and then
//! either returned in the response (reply mode) or delivered to the
//! configured destination (forward mode).

use crate::codec;
use crate::config::ServerConfig;
use crate::forwarder::Forwarder;
use crate::handler::Handler;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use ev_error::ServerError;
use http::header::HeaderMap;
use http::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[derive(Clone)]
struct AppState {
    handler: Arc<Handler>,
    forwarder: Option<Arc<Forwarder>>,
}

/// Accepts events over HTTP and runs them through the handler.
pub struct Receiver {
    state: AppState,
    config: ServerConfig,
}

impl Receiver {
    /// Build a receiver from a handler and a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Startup`] when the configuration is
    /// invalid or the forwarding client cannot be constructed.
    pub fn new(handler: Arc<Handler>, config: ServerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Startup)?;

        let forwarder = config
            .destination
            .as_ref()
            .map(|destination| {
                Forwarder::new(destination.clone(), config.forward_timeout).map(Arc::new)
            })
            .transpose()?;

        Ok(Self {
            state: AppState { handler, forwarder },
            config,
        })
    }

    /// The route table served by [`start`](Self::start).
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(receive))
            .route("/healthz", get(healthz))
            .with_state(self.state.clone())
    }

    /// Bind the listen address and serve until interrupted.
    pub async fn start(self) -> ev_error::Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|e| {
                ServerError::Startup(format!("cannot bind {}: {e}", self.config.listen_addr))
            })?;

        match &self.config.destination {
            Some(destination) => {
                info!(listen = %self.config.listen_addr, destination = %destination, "receiver started in forward mode");
            }
            None => {
                info!(listen = %self.config.listen_addr, "receiver started in reply mode");
            }
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Startup(format!("server error: {e}")))?;

        info!("receiver stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot install shutdown signal handler");
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let event = match codec::decode(&headers, &body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "rejected malformed delivery");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let event_id = event.envelope.id.clone();
    let transformed = match state.handler.apply_transformations(event) {
        Ok(event) => event,
        Err(e) => {
            error!(event_id = %event_id, error = %e, "event transformation failed");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match &state.forwarder {
        Some(forwarder) => match forwarder.send(&transformed).await {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => {
                error!(event_id = %event_id, error = %e, "event forwarding failed");
                (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
            }
        },
        None => match codec::encode_headers(&transformed.envelope) {
            Ok(reply_headers) => {
                (StatusCode::OK, reply_headers, transformed.payload().to_vec()).into_response()
            }
            Err(e) => {
                error!(event_id = %event_id, error = %e, "cannot encode reply");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        },
    }
}
