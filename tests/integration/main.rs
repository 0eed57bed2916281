//! Integration tests for evflow.
//!
//! Each test spawns a real receiver on an ephemeral port and drives it
//! over HTTP, so the full decode / transform / reply-or-forward path is
//! exercised end to end. No external services are required.

mod common;
mod forward_test;
mod transform_test;
