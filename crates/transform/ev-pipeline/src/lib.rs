//! ev-pipeline - Document transformation pipelines for evflow.
//!
//! This crate provides the transformation engine core:
//!
//! - [`Path`] - dot-separated document paths with array indices
//! - [`Storage`] - process-lifetime variables shared across pipelines
//! - [`OperationSpec`] - the declarative operation descriptor surface
//! - [`Pipeline`] - an ordered, compiled operation sequence with the
//!   two-phase apply protocol ([`Phase::Init`] / [`Phase::Transform`])
//!
//! # Example
//!
//! ```
//! use ev_pipeline::{OperationSpec, Phase, Pipeline, Storage};
//! use std::sync::Arc;
//!
//! let specs = vec![
//!     OperationSpec::new("add", "status").with_value("ok"),
//! ];
//! let pipeline = Pipeline::compile(&specs, Arc::new(Storage::new())).unwrap();
//!
//! let outcome = pipeline.apply(b"{}", Phase::Transform).unwrap();
//! assert!(outcome.warnings.is_empty());
//! assert_eq!(outcome.doc, br#"{"status":"ok"}"#);
//! ```

pub mod operation;
pub mod path;
pub mod pipeline;
pub mod storage;

pub use operation::OperationSpec;
pub use path::Path;
pub use pipeline::{ApplyOutcome, Phase, Pipeline};
pub use storage::Storage;
