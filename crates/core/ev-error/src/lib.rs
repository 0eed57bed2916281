//! Error types and classification for evflow.
//!
//! This crate provides:
//! - [`FlowError`] - Top-level error enum for the whole engine
//! - Domain-specific errors ([`ConfigError`], [`EventError`], [`ServerError`])
//! - [`OperationWarning`] - the non-fatal per-operation failure record
//! - [`Severity`] for the fail-open vs fail-closed decision
//!
//! The engine runs two distinct failure channels: fatal errors that abort
//! a delivery (or the process, for configuration errors) and per-operation
//! warnings that are accumulated, logged, and never abort anything.

use thiserror::Error;

/// Top-level error type for evflow.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Pipeline compilation errors (bad operation descriptors)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-delivery event errors (content type, encoding)
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Server errors (startup, forwarding)
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Pipeline compilation errors.
///
/// These surface at handler construction time and must stop the process
/// from serving: a handler is not usable until its pipelines compile.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Operation kind is not part of the engine's catalog
    #[error("Unknown operation kind: {0}")]
    UnknownKind(String),

    /// Operation requires an operand that was not supplied
    #[error("Operation '{kind}' is missing an operand: {detail}")]
    MissingOperand { kind: String, detail: String },

    /// Document path could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Storage variable reference is malformed
    #[error("Invalid variable reference '{0}'")]
    InvalidVariable(String),
}

/// Per-delivery event errors.
///
/// Both variants are fatal for the delivery: no event is returned or
/// forwarded. Neither affects subsequent deliveries.
#[derive(Error, Debug)]
pub enum EventError {
    /// Declared content type does not denote JSON
    #[error("Content type {0:?} is not supported")]
    ContentType(String),

    /// Document failed to serialize or deserialize at a phase boundary,
    /// or an extension value was rejected on merge-back
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Server errors.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Receiver failed to start (bind failure, bad destination)
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Forwarding a transformed event failed
    #[error("Send failed: {0}")]
    Send(String),
}

/// A non-fatal, per-operation failure captured during a pipeline phase.
///
/// Carries enough context to report later: the operation's position in
/// the declared sequence, its kind, its target path, and the reason it
/// could not be applied. Warnings are joined into a single log line per
/// delivery and never change the delivery's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationWarning {
    /// Zero-based index of the operation in the declared sequence
    pub index: usize,

    /// Operation kind as declared in the descriptor
    pub kind: String,

    /// Target path as declared in the descriptor
    pub path: String,

    /// Why the operation could not be applied
    pub reason: String,
}

impl OperationWarning {
    /// Create a new warning record.
    pub fn new(
        index: usize,
        kind: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            index,
            kind: kind.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Join a batch of warnings into one message for logging.
    pub fn join(warnings: &[OperationWarning]) -> String {
        warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for OperationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "operation {} ({} at {:?}): {}",
            self.index, self.kind, self.path, self.reason
        )
    }
}

/// Failure severity for propagation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Stops the delivery (or, for configuration errors, the process)
    Fatal,

    /// Logged and skipped; the delivery still completes
    Warning,
}

/// Classifies an error for propagation.
///
/// Every [`FlowError`] is fatal for its scope; only operation-level
/// failures, which are modeled as [`OperationWarning`] rather than as
/// errors, are warnings. The function exists so call sites state the
/// policy explicitly instead of encoding it in control flow.
pub fn severity(error: &FlowError) -> Severity {
    match error {
        FlowError::Config(_) => Severity::Fatal,
        FlowError::Event(_) => Severity::Fatal,
        FlowError::Server(_) => Severity::Fatal,
        FlowError::Other(_) => Severity::Fatal,
    }
}

/// Result type alias using FlowError.
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::UnknownKind("uppercase".to_string());
        assert_eq!(error.to_string(), "Unknown operation kind: uppercase");

        let error = ConfigError::InvalidPath {
            path: "foo..bar".to_string(),
            reason: "empty segment".to_string(),
        };
        assert!(error.to_string().contains("foo..bar"));
        assert!(error.to_string().contains("empty segment"));
    }

    #[test]
    fn test_event_error_display() {
        let error = EventError::ContentType("text/plain".to_string());
        assert!(error.to_string().contains("text/plain"));
        assert!(error.to_string().contains("not supported"));
    }

    #[test]
    fn test_flow_error_from_domain() {
        let error: FlowError = ConfigError::UnknownKind("x".to_string()).into();
        assert!(matches!(error, FlowError::Config(_)));

        let error: FlowError = EventError::Encoding("bad json".to_string()).into();
        assert!(error.to_string().contains("bad json"));
    }

    #[test]
    fn test_warning_display() {
        let warning = OperationWarning::new(2, "shift", "a.b:c", "path not found");
        let rendered = warning.to_string();
        assert!(rendered.contains("operation 2"));
        assert!(rendered.contains("shift"));
        assert!(rendered.contains("path not found"));
    }

    #[test]
    fn test_warning_join() {
        let warnings = vec![
            OperationWarning::new(0, "add", "a", "type mismatch"),
            OperationWarning::new(1, "delete", "b", "path not found"),
        ];
        let joined = OperationWarning::join(&warnings);
        assert!(joined.contains("operation 0"));
        assert!(joined.contains("operation 1"));
        assert!(joined.contains(", "));
    }

    #[test]
    fn test_severity_all_fatal() {
        let error: FlowError = ServerError::Startup("bind failed".to_string()).into();
        assert_eq!(severity(&error), Severity::Fatal);
    }
}
