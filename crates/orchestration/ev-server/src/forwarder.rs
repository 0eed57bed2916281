//! Outbound delivery of transformed events.

use crate::codec;
use ev_error::ServerError;
use ev_event::Event;
use std::time::Duration;
use tracing::{debug, warn};

/// Delivers transformed events to a fixed downstream destination.
pub struct Forwarder {
    client: reqwest::Client,
    destination: String,
}

impl Forwarder {
    /// Build a forwarder with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Startup`] when the HTTP client cannot be
    /// constructed.
    pub fn new(destination: impl Into<String>, timeout: Duration) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Startup(format!("cannot build forwarding client: {e}")))?;
        Ok(Self {
            client,
            destination: destination.into(),
        })
    }

    /// The configured destination URL.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// POST one event to the destination.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Send`] when the event cannot be encoded,
    /// the request fails, or the destination replies with a non-success
    /// status.
    pub async fn send(&self, event: &Event) -> Result<(), ServerError> {
        let headers = codec::encode_headers(&event.envelope)
            .map_err(|e| ServerError::Send(format!("cannot encode event: {e}")))?;

        let response = self
            .client
            .post(&self.destination)
            .headers(headers)
            .body(event.payload().to_vec())
            .send()
            .await
            .map_err(|e| {
                warn!(destination = %self.destination, error = %e, "event delivery failed");
                ServerError::Send(format!("request to {} failed: {e}", self.destination))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(destination = %self.destination, status = %status, "destination rejected event");
            return Err(ServerError::Send(format!(
                "destination {} replied with status {status}",
                self.destination
            )));
        }

        debug!(
            event_id = %event.envelope.id,
            destination = %self.destination,
            status = %status,
            "event delivered"
        );
        Ok(())
    }
}
