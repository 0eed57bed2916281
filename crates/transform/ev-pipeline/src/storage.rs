//! Shared variable storage.

use dashmap::DashMap;
use serde_json::Value;

/// Process-lifetime variable storage shared by a handler's pipelines.
///
/// Storage is created once per handler and shared by reference between
/// the envelope and payload pipelines, so operations can communicate
/// across phases and across the envelope/payload split. Values persist
/// for the process lifetime: mutations from one delivery are visible to
/// subsequent deliveries, enabling cross-event accumulation.
///
/// # Concurrency
///
/// Each individual `get`/`set` is atomic per key (sharded locking via
/// `DashMap`), but no ordering is imposed across deliveries: if two
/// concurrent deliveries race to set the same name, the last write
/// wins, and readers may observe either value. This is an accepted,
/// documented hazard: downstream configuration may depend on
/// cross-event persistence, so no per-delivery isolation is added.
#[derive(Debug, Default)]
pub struct Storage {
    vars: DashMap<String, Value>,
}

impl Storage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable's value, if present.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.get(name).map(|entry| entry.value().clone())
    }

    /// Set a variable's value.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Number of stored variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check whether the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
