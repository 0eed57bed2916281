//! Document path parsing and resolution.
//!
//! Parses paths like `foo.bar[2].baz` and resolves them against JSON
//! documents. Paths are validated at pipeline compile time; resolution
//! failures at apply time are reported as per-operation warnings.

use ev_error::ConfigError;
use serde_json::{Map, Value};

/// One step of a document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// An object field (e.g., "bar")
    Key(String),
    /// An array element (e.g., "[2]")
    Index(usize),
}

/// A parsed document path.
///
/// # Path Format
///
/// - Object fields: dot-separated names like `foo.bar`
/// - Array elements: `[n]` suffixes like `items[0]` or `grid[1][2]`
/// - The empty string addresses the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
    original: String,
}

impl Path {
    /// Parse a document path string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if:
    /// - A segment between dots is empty (`foo..bar`)
    /// - A segment has no field name before its index (`foo.[0]`)
    /// - An index is unclosed, empty, or non-numeric
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();

        if !raw.is_empty() {
            for chunk in raw.split('.') {
                if chunk.is_empty() {
                    return Err(invalid(raw, "empty segment"));
                }

                let (name, indices) = match chunk.find('[') {
                    Some(pos) => (&chunk[..pos], &chunk[pos..]),
                    None => (chunk, ""),
                };

                if name.is_empty() {
                    return Err(invalid(raw, "segment must start with a field name"));
                }
                if name.contains(']') {
                    return Err(invalid(raw, "unexpected ']'"));
                }
                segments.push(Segment::Key(name.to_string()));

                let mut rest = indices;
                while !rest.is_empty() {
                    let Some(stripped) = rest.strip_prefix('[') else {
                        return Err(invalid(raw, "unexpected characters after index"));
                    };
                    let Some(close) = stripped.find(']') else {
                        return Err(invalid(raw, "unclosed index"));
                    };
                    let digits = &stripped[..close];
                    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid(raw, "index must be a non-negative integer"));
                    }
                    let index: usize = digits
                        .parse()
                        .map_err(|_| invalid(raw, "index out of range"))?;
                    segments.push(Segment::Index(index));
                    rest = &stripped[close + 1..];
                }
            }
        }

        Ok(Self {
            segments,
            original: raw.to_string(),
        })
    }

    /// Check whether the path addresses the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the original path string.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Resolve the path against a document.
    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.as_object()?.get(key)?,
                Segment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        Some(current)
    }

    /// Set a value at the path, creating intermediate nodes as needed.
    ///
    /// Intermediate nodes of the wrong shape are replaced: writing
    /// `a.b` into `{"a": 5}` yields `{"a": {"b": ...}}`. Arrays are
    /// padded with nulls up to the addressed index. Setting the root
    /// path replaces the whole document.
    pub fn set(&self, doc: &mut Value, value: Value) {
        let Some((last, init)) = self.segments.split_last() else {
            *doc = value;
            return;
        };

        let mut current = doc;
        for segment in init {
            current = match segment {
                Segment::Key(key) => ensure_object(current)
                    .entry(key.clone())
                    .or_insert(Value::Null),
                Segment::Index(index) => {
                    let array = ensure_array(current);
                    while array.len() <= *index {
                        array.push(Value::Null);
                    }
                    &mut array[*index]
                }
            };
        }

        match last {
            Segment::Key(key) => {
                ensure_object(current).insert(key.clone(), value);
            }
            Segment::Index(index) => {
                let array = ensure_array(current);
                while array.len() <= *index {
                    array.push(Value::Null);
                }
                array[*index] = value;
            }
        }
    }

    /// Remove and return the value at the path.
    ///
    /// Removing the root path resets the document to an empty object.
    /// Unlike [`Path::set`], resolution is strict: a missing node or a
    /// container of the wrong shape is an error.
    pub fn remove(&self, doc: &mut Value) -> Result<Value, String> {
        let Some((last, init)) = self.segments.split_last() else {
            return Ok(std::mem::replace(doc, Value::Object(Map::new())));
        };

        let mut current = doc;
        for segment in init {
            current = match segment {
                Segment::Key(key) => current
                    .as_object_mut()
                    .ok_or("expected an object")?
                    .get_mut(key)
                    .ok_or("path not found")?,
                Segment::Index(index) => current
                    .as_array_mut()
                    .ok_or("expected an array")?
                    .get_mut(*index)
                    .ok_or("path not found")?,
            };
        }

        match last {
            Segment::Key(key) => current
                .as_object_mut()
                .ok_or("expected an object")?
                .remove(key)
                .ok_or_else(|| "path not found".to_string()),
            Segment::Index(index) => {
                let array = current.as_array_mut().ok_or("expected an array")?;
                if *index >= array.len() {
                    return Err("path not found".to_string());
                }
                Ok(array.remove(*index))
            }
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}

fn invalid(path: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(array) => array,
        _ => unreachable!("value was just replaced with an array"),
    }
}
