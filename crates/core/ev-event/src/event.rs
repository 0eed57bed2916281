//! The event: envelope plus payload.

use crate::envelope::Envelope;

/// The canonical JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// The unit of work: an envelope plus a payload expected to decode as JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Event metadata
    pub envelope: Envelope,

    payload: Vec<u8>,
}

impl Event {
    /// Create an event from an envelope and payload bytes.
    pub fn new(envelope: Envelope, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            envelope,
            payload: payload.into(),
        }
    }

    /// Get the payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Check whether the declared content type denotes JSON.
    ///
    /// Intermediaries append parameters to the media type (e.g.
    /// `application/json; charset=utf-8`), so this is a substring match
    /// rather than strict equality.
    pub fn has_json_content_type(&self) -> bool {
        self.envelope
            .datacontenttype
            .as_deref()
            .is_some_and(|ct| ct.contains(APPLICATION_JSON))
    }

    /// Replace the payload, fixing the content type to `application/json`.
    pub fn set_payload_json(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = payload.into();
        self.envelope.datacontenttype = Some(APPLICATION_JSON.to_string());
    }
}
