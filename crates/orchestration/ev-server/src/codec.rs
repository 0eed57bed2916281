//! HTTP wire binding for events.
//!
//! Events travel in binary mode: envelope attributes in `ce-*` headers,
//! the payload as the request/response body, and the declared content
//! type in the standard `Content-Type` header. The payload stays
//! byte-for-byte intact through the transport.

use chrono::{DateTime, Utc};
use ev_error::EventError;
use ev_event::{Envelope, Event};
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

/// Prefix for envelope attribute headers.
pub const ATTRIBUTE_PREFIX: &str = "ce-";

const HEADER_ID: &str = "ce-id";
const HEADER_SOURCE: &str = "ce-source";
const HEADER_TYPE: &str = "ce-type";
const HEADER_SUBJECT: &str = "ce-subject";
const HEADER_TIME: &str = "ce-time";

/// Decode an inbound delivery into an event.
///
/// # Errors
///
/// Returns [`EventError::Encoding`] when a required attribute header is
/// missing or malformed, or when an extension header is rejected by
/// envelope validation.
pub fn decode(headers: &HeaderMap, body: &[u8]) -> Result<Event, EventError> {
    let id = required_header(headers, HEADER_ID)?;
    let source = required_header(headers, HEADER_SOURCE)?;
    let event_type = required_header(headers, HEADER_TYPE)?;

    let mut envelope = Envelope::new(id, source, event_type);
    envelope.subject = optional_header(headers, HEADER_SUBJECT)?;
    envelope.datacontenttype = optional_header(headers, CONTENT_TYPE.as_str())?;

    if let Some(raw) = optional_header(headers, HEADER_TIME)? {
        let time = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| EventError::Encoding(format!("invalid {HEADER_TIME} header: {e}")))?;
        envelope.time = Some(time.with_timezone(&Utc));
    }

    for (name, value) in headers {
        let name = name.as_str();
        let Some(extension) = name.strip_prefix(ATTRIBUTE_PREFIX) else {
            continue;
        };
        if matches!(
            name,
            HEADER_ID | HEADER_SOURCE | HEADER_TYPE | HEADER_SUBJECT | HEADER_TIME
        ) {
            continue;
        }
        let raw = value
            .to_str()
            .map_err(|_| EventError::Encoding(format!("header {name} is not valid UTF-8")))?;
        envelope.set_extension(extension, scalar_value(raw))?;
    }

    Ok(Event::new(envelope, body.to_vec()))
}

/// Encode an envelope into attribute headers.
///
/// # Errors
///
/// Returns [`EventError::Encoding`] when an attribute or extension
/// cannot be represented as a header.
pub fn encode_headers(envelope: &Envelope) -> Result<HeaderMap, EventError> {
    let mut headers = HeaderMap::new();
    insert(&mut headers, HEADER_ID, &envelope.id)?;
    insert(&mut headers, HEADER_SOURCE, &envelope.source)?;
    insert(&mut headers, HEADER_TYPE, &envelope.event_type)?;

    if let Some(subject) = &envelope.subject {
        insert(&mut headers, HEADER_SUBJECT, subject)?;
    }
    if let Some(time) = &envelope.time {
        insert(&mut headers, HEADER_TIME, &time.to_rfc3339())?;
    }
    if let Some(content_type) = &envelope.datacontenttype {
        insert(&mut headers, CONTENT_TYPE.as_str(), content_type)?;
    }

    for (name, value) in &envelope.extensions {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        insert(&mut headers, &format!("{ATTRIBUTE_PREFIX}{name}"), &rendered)?;
    }

    Ok(headers)
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, EventError> {
    optional_header(headers, name)?
        .ok_or_else(|| EventError::Encoding(format!("missing {name} header")))
}

fn optional_header(headers: &HeaderMap, name: &str) -> Result<Option<String>, EventError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| EventError::Encoding(format!("header {name} is not valid UTF-8")))
        })
        .transpose()
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), EventError> {
    let name = HeaderName::try_from(name)
        .map_err(|_| EventError::Encoding(format!("invalid header name {name:?}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| EventError::Encoding(format!("header {name} has an invalid value")))?;
    headers.insert(name, value);
    Ok(())
}

/// Interpret an extension header value: a JSON scalar if it parses as
/// one, a plain string otherwise.
fn scalar_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
