//! ev-event - Event and envelope model for evflow.
//!
//! This crate provides the unit of work the engine operates on: an
//! [`Event`] made of an [`Envelope`] (metadata attributes plus an
//! open-ended extensions map) and a JSON payload. The envelope is
//! JSON-serializable so metadata can be transformed with the same
//! machinery as the payload.

pub mod envelope;
pub mod event;

pub use envelope::{Envelope, MAX_EXTENSION_NAME_LEN};
pub use event::{Event, APPLICATION_JSON};
