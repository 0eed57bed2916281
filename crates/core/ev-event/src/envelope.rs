//! Event envelope: normalized, JSON-serializable metadata.

use chrono::{DateTime, Utc};
use ev_error::EventError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum length of an extension attribute name.
pub const MAX_EXTENSION_NAME_LEN: usize = 20;

/// The metadata portion of an event, distinct from its payload.
///
/// Serializing an `Envelope` yields the normalized JSON document the
/// envelope pipeline operates on: the attributes as lowercase fields
/// plus the extensions under an `"Extensions"` object field, so the
/// open-ended metadata is addressable with ordinary document paths
/// (e.g. `Extensions.category`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event identifier
    pub id: String,

    /// Event source
    pub source: String,

    /// Event type
    #[serde(rename = "type")]
    pub event_type: String,

    /// Optional subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Event timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Declared content type of the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,

    /// Open-ended extension attributes
    #[serde(
        rename = "Extensions",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub extensions: BTreeMap<String, Value>,
}

impl Envelope {
    /// Create an envelope with the required attributes.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    /// Set the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.datacontenttype = Some(content_type.into());
        self
    }

    /// Set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the timestamp.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Set an extension attribute, validating name and value.
    ///
    /// Extension names must be non-empty, lowercase alphanumeric, and at
    /// most [`MAX_EXTENSION_NAME_LEN`] characters. Values must be JSON
    /// scalars (string, boolean, or number). These rules run per key so
    /// a transformed envelope cannot smuggle in attributes the transport
    /// would not accept.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Encoding`] when the name or value is rejected.
    pub fn set_extension(&mut self, name: &str, value: Value) -> Result<(), EventError> {
        if !is_valid_extension_name(name) {
            return Err(EventError::Encoding(format!(
                "invalid extension name {name:?}"
            )));
        }
        match &value {
            Value::String(_) | Value::Bool(_) | Value::Number(_) => {}
            other => {
                return Err(EventError::Encoding(format!(
                    "extension {name:?} has non-scalar value: {other}"
                )));
            }
        }
        self.extensions.insert(name.to_string(), value);
        Ok(())
    }

    /// Get an extension attribute value.
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }
}

/// Check if an extension attribute name is valid.
///
/// Valid names are non-empty, at most [`MAX_EXTENSION_NAME_LEN`]
/// characters, and contain only lowercase ASCII letters and digits.
fn is_valid_extension_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_EXTENSION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
