//! Pipeline compilation and two-phase execution.

use crate::operation::{Op, OperationSpec};
use crate::storage::Storage;
use ev_error::{ConfigError, EventError, OperationWarning};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Execution phase for [`Pipeline::apply`].
///
/// The ordering contract between the two phases belongs to the
/// orchestrating handler; keeping the phase an explicit argument to a
/// single `apply` entry point (rather than two separately named
/// methods) keeps that contract in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Runs only init-eligible operations, in declared order. Used to
    /// seed or harvest Storage variables before documents are final.
    Init,

    /// Runs the full operation sequence in declared order,
    /// init-eligible operations included.
    Transform,
}

/// The result of one `apply` call: the re-serialized document plus the
/// per-operation failures accumulated along the way.
#[derive(Debug)]
pub struct ApplyOutcome {
    /// The transformed document
    pub doc: Vec<u8>,

    /// Non-fatal operation failures, in execution order
    pub warnings: Vec<OperationWarning>,
}

struct CompiledOp {
    index: usize,
    kind: String,
    path: String,
    init_eligible: bool,
    op: Op,
}

/// An ordered, compiled sequence of operations bound to a shared
/// [`Storage`].
///
/// A pipeline is immutable once built: its operation order and kinds
/// never change after compilation. Only the storage contents and the
/// document passed to [`Pipeline::apply`] change at run time.
pub struct Pipeline {
    ops: Vec<CompiledOp>,
    storage: Arc<Storage>,
}

impl Pipeline {
    /// Compile operation descriptors into a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a descriptor is malformed (unknown
    /// kind, missing operand, invalid path). A handler must not serve
    /// until all of its pipelines compile cleanly.
    pub fn compile(specs: &[OperationSpec], storage: Arc<Storage>) -> Result<Self, ConfigError> {
        let mut ops = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let op = Op::compile(spec)?;
            ops.push(CompiledOp {
                index,
                kind: spec.kind.clone(),
                path: spec.path.clone(),
                init_eligible: op.runs_at_init(),
                op,
            });
        }
        Ok(Self { ops, storage })
    }

    /// Number of compiled operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check whether the pipeline has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply the pipeline to a JSON document.
    ///
    /// Execution is fail-open per operation: a failing operation is
    /// captured as a warning with its index, kind, and path, and the
    /// document, including whatever partial mutation occurred, is
    /// passed to the next operation in sequence.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Encoding`] only when the document cannot
    /// be parsed or re-serialized around the operation sequence.
    pub fn apply(&self, doc: &[u8], phase: Phase) -> Result<ApplyOutcome, EventError> {
        let mut value: Value = serde_json::from_slice(doc)
            .map_err(|e| EventError::Encoding(format!("cannot parse document: {e}")))?;

        let mut warnings = Vec::new();
        for compiled in &self.ops {
            if phase == Phase::Init && !compiled.init_eligible {
                continue;
            }
            if let Err(reason) = compiled.op.apply(&mut value, &self.storage) {
                debug!(
                    index = compiled.index,
                    kind = %compiled.kind,
                    path = %compiled.path,
                    reason = %reason,
                    "operation failed, continuing"
                );
                warnings.push(OperationWarning::new(
                    compiled.index,
                    compiled.kind.clone(),
                    compiled.path.clone(),
                    reason,
                ));
            }
        }

        let doc = serde_json::to_vec(&value)
            .map_err(|e| EventError::Encoding(format!("cannot serialize document: {e}")))?;
        Ok(ApplyOutcome { doc, warnings })
    }
}
