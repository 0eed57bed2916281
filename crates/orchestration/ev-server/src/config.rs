//! Configuration types for the server.

use ev_pipeline::OperationSpec;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Default timeout for forwarding requests in seconds.
pub const DEFAULT_FORWARD_TIMEOUT_SECS: u64 = 30;

/// The operation configuration surface: one ordered descriptor list per
/// pipeline, supplied once at handler construction and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Operations applied to the envelope document
    #[serde(default)]
    pub envelope: Vec<OperationSpec>,

    /// Operations applied to the payload document
    #[serde(default)]
    pub payload: Vec<OperationSpec>,
}

impl TransformationConfig {
    /// Check whether both operation lists are empty.
    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty() && self.payload.is_empty()
    }
}

/// Configuration for a receiver instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub listen_addr: String,

    /// Destination URL for forward mode; reply mode when unset
    pub destination: Option<String>,

    /// Timeout for forwarding requests
    pub forward_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            destination: None,
            forward_timeout: Duration::from_secs(DEFAULT_FORWARD_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen address.
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Set the forwarding destination.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the forwarding timeout.
    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr '{}' is not a valid socket address",
                self.listen_addr
            ));
        }
        if let Some(destination) = &self.destination {
            if !destination.starts_with("http://") && !destination.starts_with("https://") {
                return Err(format!(
                    "destination '{destination}' must be an http(s) URL"
                ));
            }
        }
        if self.forward_timeout.is_zero() {
            return Err("forward_timeout must be at least 1 second".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.destination.is_none());
        assert_eq!(
            config.forward_timeout,
            Duration::from_secs(DEFAULT_FORWARD_TIMEOUT_SECS)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new()
            .with_listen_addr("127.0.0.1:9090")
            .with_destination("http://sink.local/events")
            .with_forward_timeout(Duration::from_secs(5));

        assert_eq!(config.listen_addr, "127.0.0.1:9090");
        assert_eq!(
            config.destination.as_deref(),
            Some("http://sink.local/events")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let invalid = ServerConfig::new().with_listen_addr("not-an-address");
        assert!(invalid.validate().is_err());

        let invalid = ServerConfig::new().with_destination("ftp://sink");
        assert!(invalid.validate().is_err());

        let invalid = ServerConfig::new().with_forward_timeout(Duration::ZERO);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_transformation_config_from_json() {
        let raw = r#"{
            "envelope": [{"kind": "add", "path": "Extensions.category", "value": "alpha"}],
            "payload": [{"kind": "delete", "path": "secret"}]
        }"#;
        let config: TransformationConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.envelope.len(), 1);
        assert_eq!(config.payload.len(), 1);
        assert!(!config.is_empty());

        let empty: TransformationConfig = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
