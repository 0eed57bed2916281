//! Transformation handler: two pipelines, one storage, one protocol.

use crate::config::TransformationConfig;
use ev_error::{ConfigError, EventError};
use ev_event::{Envelope, Event};
use ev_pipeline::{Phase, Pipeline, Storage};
use std::sync::Arc;
use tracing::warn;

/// Owns the envelope and payload pipelines for event transformations.
///
/// A handler is created once at process start and lives until shutdown.
/// Both pipelines share a single [`Storage`], so operations communicate
/// across phases, across the envelope/payload split, and across
/// deliveries.
pub struct Handler {
    envelope_pipeline: Pipeline,
    payload_pipeline: Pipeline,
    storage: Arc<Storage>,
}

impl Handler {
    /// Compile both pipelines against a fresh shared storage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any operation descriptor is
    /// malformed; the handler must not serve until the configuration
    /// compiles cleanly.
    pub fn new(config: &TransformationConfig) -> Result<Self, ConfigError> {
        let storage = Arc::new(Storage::new());
        let envelope_pipeline = Pipeline::compile(&config.envelope, storage.clone())?;
        let payload_pipeline = Pipeline::compile(&config.payload, storage.clone())?;
        Ok(Self {
            envelope_pipeline,
            payload_pipeline,
            storage,
        })
    }

    /// Get a reference to the shared variable storage.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Apply both pipelines to an event, exactly once per delivery.
    ///
    /// The step order is load-bearing: envelope init runs strictly
    /// before payload init (so envelope-seeded variables are visible to
    /// the payload pipeline), and both init phases run before either
    /// transform phase. Per-operation failures are accumulated and
    /// logged at the end; they never fail the delivery.
    ///
    /// # Errors
    ///
    /// - [`EventError::ContentType`] when the declared content type
    ///   does not denote JSON; no pipeline runs
    /// - [`EventError::Encoding`] when the envelope cannot be
    ///   serialized, the transformed envelope cannot be deserialized,
    ///   or a transformed extension is rejected
    pub fn apply_transformations(&self, event: Event) -> Result<Event, EventError> {
        if !event.has_json_content_type() {
            let declared = event.envelope.datacontenttype.clone().unwrap_or_default();
            warn!(content_type = %declared, "event content type is not supported");
            return Err(EventError::ContentType(declared));
        }

        let envelope_doc = serde_json::to_vec(&event.envelope)
            .map_err(|e| EventError::Encoding(format!("cannot encode envelope: {e}")))?;

        let mut warnings: Vec<String> = Vec::new();

        // Init phase, envelope strictly before payload.
        let envelope_doc = run_phase(
            &self.envelope_pipeline,
            envelope_doc,
            Phase::Init,
            &mut warnings,
        );
        let payload_doc = run_phase(
            &self.payload_pipeline,
            event.payload().to_vec(),
            Phase::Init,
            &mut warnings,
        );

        // Envelope transformation and merge-back.
        let envelope_doc = run_phase(
            &self.envelope_pipeline,
            envelope_doc,
            Phase::Transform,
            &mut warnings,
        );
        let transformed: Envelope = serde_json::from_slice(&envelope_doc).map_err(|e| {
            EventError::Encoding(format!("cannot decode transformed envelope: {e}"))
        })?;

        // Replace the envelope wholesale, then re-apply each extension
        // individually so per-key validation still runs.
        let mut event = event;
        let mut envelope = transformed;
        let extensions = std::mem::take(&mut envelope.extensions);
        for (name, value) in extensions {
            envelope.set_extension(&name, value)?;
        }
        event.envelope = envelope;

        // Payload transformation.
        let payload_doc = run_phase(
            &self.payload_pipeline,
            payload_doc,
            Phase::Transform,
            &mut warnings,
        );
        event.set_payload_json(payload_doc);

        // Failed operations must not stop the event flow; log and move on.
        if !warnings.is_empty() {
            warn!(errors = %warnings.join(", "), "event transformation errors");
        }

        Ok(event)
    }
}

/// Run one pipeline phase, folding both warning channels into `warnings`.
///
/// An aggregate `apply` failure (unparseable document) is recorded like
/// any other warning and the document is carried forward unchanged, so
/// a broken payload degrades to a pass-through instead of blocking the
/// delivery.
fn run_phase(
    pipeline: &Pipeline,
    doc: Vec<u8>,
    phase: Phase,
    warnings: &mut Vec<String>,
) -> Vec<u8> {
    match pipeline.apply(&doc, phase) {
        Ok(outcome) => {
            warnings.extend(outcome.warnings.iter().map(ToString::to_string));
            outcome.doc
        }
        Err(error) => {
            warnings.push(error.to_string());
            doc
        }
    }
}
