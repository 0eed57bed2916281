//! The operation catalog: descriptors, compilation, and execution.
//!
//! Operations are configured as [`OperationSpec`] descriptors (kind +
//! path + optional operand) and compiled into [`Op`] values at handler
//! construction. The catalog is a closed set known to the engine;
//! unknown kinds are rejected at compile time.

use crate::path::Path;
use crate::storage::Storage;
use ev_error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative operation descriptor, as supplied by configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Operation kind: `add`, `delete`, `shift`, `store`, or `parse`
    pub kind: String,

    /// Target location within the document
    #[serde(default)]
    pub path: String,

    /// Optional operand (literal or `$variable` reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl OperationSpec {
    /// Create a descriptor with a kind and path.
    pub fn new(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            value: None,
        }
    }

    /// Set the operand value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A compiled operation.
///
/// The exact catalog:
///
/// - `add`: insert or overwrite the value at `path`; the operand may
///   reference Storage variables
/// - `delete`: remove the node at `path`, optionally only when its
///   current value equals the operand; an empty path resets the
///   document to an empty object
/// - `shift`: move the value from one location to another (`from:to`),
///   optionally conditioned on the current value
/// - `store`: copy the document value at `path` into a Storage
///   variable; the only init-eligible kind
/// - `parse`: parse the string at `path` as JSON and replace it in
///   place
#[derive(Debug, Clone)]
pub(crate) enum Op {
    Add { path: Path, value: Template },
    Delete { path: Path, when: Option<Template> },
    Shift { from: Path, to: Path, when: Option<Template> },
    Store { path: Path, variable: String },
    Parse { path: Path },
}

impl Op {
    /// Compile a descriptor into an executable operation.
    pub(crate) fn compile(spec: &OperationSpec) -> Result<Self, ConfigError> {
        match spec.kind.as_str() {
            "add" => {
                let operand = require_operand(spec, "a value to insert is required")?;
                Ok(Op::Add {
                    path: Path::parse(&spec.path)?,
                    value: Template::parse(operand)?,
                })
            }
            "delete" => Ok(Op::Delete {
                path: Path::parse(&spec.path)?,
                when: optional_condition(spec)?,
            }),
            "shift" => {
                let (from, to) = spec.path.split_once(':').ok_or_else(|| {
                    ConfigError::InvalidPath {
                        path: spec.path.clone(),
                        reason: "shift path must be 'source:destination'".to_string(),
                    }
                })?;
                Ok(Op::Shift {
                    from: Path::parse(from)?,
                    to: Path::parse(to)?,
                    when: optional_condition(spec)?,
                })
            }
            "store" => {
                let operand = require_operand(spec, "a '$variable' target is required")?;
                let variable = operand
                    .strip_prefix('$')
                    .filter(|name| is_valid_variable_name(name))
                    .ok_or_else(|| ConfigError::InvalidVariable(operand.to_string()))?;
                Ok(Op::Store {
                    path: Path::parse(&spec.path)?,
                    variable: variable.to_string(),
                })
            }
            "parse" => Ok(Op::Parse {
                path: Path::parse(&spec.path)?,
            }),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }

    /// Whether the operation participates in the init phase.
    ///
    /// Only `store` is init-eligible: harvesting variables into Storage
    /// is useful before the document's final shape exists, while the
    /// mutating kinds are not. The partition is a compile-time property
    /// of the operation, not a separate list; `store` operations run
    /// again during the transform phase.
    pub(crate) fn runs_at_init(&self) -> bool {
        matches!(self, Op::Store { .. })
    }

    /// Apply the operation to a document.
    ///
    /// A failure here is non-fatal: the caller records the reason as a
    /// warning and continues with the next operation.
    pub(crate) fn apply(&self, doc: &mut Value, storage: &Storage) -> Result<(), String> {
        match self {
            Op::Add { path, value } => {
                path.set(doc, value.render(storage));
                Ok(())
            }
            Op::Delete { path, when } => {
                if let Some(condition) = when {
                    let current = path.get(doc).ok_or("path not found")?;
                    if *current != condition.render(storage) {
                        return Ok(());
                    }
                }
                path.remove(doc).map(|_| ())
            }
            Op::Shift { from, to, when } => {
                if let Some(condition) = when {
                    let current = from.get(doc).ok_or("path not found")?;
                    if *current != condition.render(storage) {
                        return Ok(());
                    }
                }
                let moved = from.remove(doc)?;
                to.set(doc, moved);
                Ok(())
            }
            Op::Store { path, variable } => {
                let value = path.get(doc).cloned().ok_or("path not found")?;
                storage.set(variable.clone(), value);
                Ok(())
            }
            Op::Parse { path } => {
                let parsed: Value = {
                    let current = path.get(doc).ok_or("path not found")?;
                    let raw = current.as_str().ok_or("value is not a string")?;
                    serde_json::from_str(raw)
                        .map_err(|e| format!("value is not valid JSON: {e}"))?
                };
                path.set(doc, parsed);
                Ok(())
            }
        }
    }
}

fn require_operand<'a>(spec: &'a OperationSpec, detail: &str) -> Result<&'a str, ConfigError> {
    spec.value
        .as_deref()
        .ok_or_else(|| ConfigError::MissingOperand {
            kind: spec.kind.clone(),
            detail: detail.to_string(),
        })
}

fn optional_condition(spec: &OperationSpec) -> Result<Option<Template>, ConfigError> {
    spec.value.as_deref().map(Template::parse).transpose()
}

/// An operand value with `$variable` references.
///
/// A lone `$variable` substitutes the stored value with its type
/// intact; references embedded in surrounding text interpolate as
/// strings. An unresolved reference renders as its literal token so
/// misconfigured variables stay visible in the output.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
enum Part {
    Text(String),
    Var(String),
}

impl Template {
    /// Parse an operand string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVariable`] when a `$` is not
    /// followed by a valid variable name.
    pub(crate) fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;

        while pos < chars.len() {
            if chars[pos] == '$' {
                let start = pos + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                if !is_valid_variable_name(&name) {
                    return Err(ConfigError::InvalidVariable(raw.to_string()));
                }
                if !text.is_empty() {
                    parts.push(Part::Text(std::mem::take(&mut text)));
                }
                parts.push(Part::Var(name));
                pos = end;
            } else {
                text.push(chars[pos]);
                pos += 1;
            }
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Ok(Self { parts })
    }

    /// Render the operand against the current Storage contents.
    pub(crate) fn render(&self, storage: &Storage) -> Value {
        match self.parts.as_slice() {
            [] => Value::String(String::new()),
            [Part::Var(name)] => storage
                .get(name)
                .unwrap_or_else(|| Value::String(format!("${name}"))),
            [Part::Text(text)] => literal_value(text),
            parts => {
                let mut rendered = String::new();
                for part in parts {
                    match part {
                        Part::Text(text) => rendered.push_str(text),
                        Part::Var(name) => match storage.get(name) {
                            Some(Value::String(s)) => rendered.push_str(&s),
                            Some(other) => rendered.push_str(&other.to_string()),
                            None => rendered.push_str(&format!("${name}")),
                        },
                    }
                }
                Value::String(rendered)
            }
        }
    }
}

/// Interpret a literal operand: JSON if it parses, a plain string if not.
fn literal_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Check if a variable name is valid.
///
/// Valid names contain only alphanumeric characters and underscores,
/// and must start with a letter or underscore.
fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
