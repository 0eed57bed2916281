//! ev-server - Receiver orchestration for evflow.
//!
//! This crate wires an inbound event through both transformation
//! pipelines exactly once per delivery. It provides:
//!
//! - [`Handler`] - owns the envelope and payload pipelines (sharing one
//!   storage) and runs the two-phase transformation protocol
//! - [`Receiver`] - the network-facing shell: accepts inbound events
//!   over HTTP and either replies synchronously or forwards the result
//! - [`Forwarder`] - outbound HTTP delivery to a configured destination
//! - [`ServerConfig`] / [`TransformationConfig`] - the configuration
//!   surface supplied once at construction
//!
//! # Example
//!
//! ```ignore
//! use ev_server::{Handler, Receiver, ServerConfig, TransformationConfig};
//! use std::sync::Arc;
//!
//! let config: TransformationConfig = serde_json::from_str(raw_config)?;
//! let handler = Arc::new(Handler::new(&config)?);
//!
//! let server = ServerConfig::new().with_listen_addr("0.0.0.0:8080");
//! Receiver::new(handler, server)?.start().await?;
//! ```

pub mod codec;
pub mod config;
pub mod forwarder;
pub mod handler;
pub mod receiver;

pub use config::{ServerConfig, TransformationConfig, DEFAULT_FORWARD_TIMEOUT_SECS};
pub use forwarder::Forwarder;
pub use handler::Handler;
pub use receiver::Receiver;
