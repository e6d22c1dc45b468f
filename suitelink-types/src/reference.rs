//! Business references.
//!
//! A business reference is the ordered list of scalar values found at a
//! configured list of path expressions. Two documents describe the same
//! real-world entity iff their references are equal element-wise.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Evaluates path expressions against a document.
pub trait PathExtractor: Send + Sync {
    /// Returns one value per path, in order. Missing paths yield `Value::Null`.
    fn extract(&self, paths: &[String], doc: &Value) -> Vec<Value>;
}

/// Dotted-path extractor: `record.$attributes.internalId`,
/// `record.addressbookList.addressbook[0].addr1` or `items.0.name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotPathExtractor;

impl DotPathExtractor {
    /// Resolves a single path.
    pub fn lookup<'a>(path: &str, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let (key, indices) = split_indices(segment)?;
            if !key.is_empty() {
                current = match current {
                    Value::Object(map) => map.get(key)?,
                    Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                    _ => return None,
                };
            }
            for index in indices {
                current = current.as_array()?.get(index)?;
            }
        }
        Some(current)
    }
}

impl PathExtractor for DotPathExtractor {
    fn extract(&self, paths: &[String], doc: &Value) -> Vec<Value> {
        paths
            .iter()
            .map(|p| Self::lookup(p, doc).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Splits `name[1][2]` into `("name", [1, 2])`.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };
    let (key, mut rest) = segment.split_at(open);
    let mut indices = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let close = stripped.find(']')?;
        indices.push(stripped[..close].trim().parse().ok()?);
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        return None;
    }
    Some((key, indices))
}

/// Ordered business reference values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BusinessReference {
    values: Vec<Value>,
}

impl BusinessReference {
    /// Extracts a reference with the default dotted-path extractor.
    pub fn extract(paths: &[String], doc: &Value) -> Self {
        Self::extract_with(&DotPathExtractor, paths, doc)
    }

    /// Extracts a reference with a caller-supplied extractor.
    pub fn extract_with(extractor: &dyn PathExtractor, paths: &[String], doc: &Value) -> Self {
        Self {
            values: extractor.extract(paths, doc),
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// True when every configured path resolved to a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_null())
    }

    /// The values joined with `.` into a single comparable key.
    pub fn key(&self) -> String {
        self.values
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for BusinessReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for BusinessReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}
