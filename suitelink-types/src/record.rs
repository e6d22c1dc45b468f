//! Remote records and references to them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A reference to a remote record by internal ID and record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub internal_id: String,
    pub record_type: String,
}

impl RecordRef {
    pub fn new(internal_id: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            record_type: record_type.into(),
        }
    }

    /// Renders the reference in the remote's attribute form.
    pub fn to_document(&self) -> Value {
        json!({
            "$attributes": {
                "internalId": self.internal_id,
                "type": self.record_type,
            }
        })
    }
}

/// A record returned by the remote service.
///
/// The body is read-only to the engine except where a correlation step
/// attaches derived data (e.g. `matrixChildren`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    remote_id: String,
    body: Value,
}

impl RemoteRecord {
    /// Wraps a record body. Returns `None` when it has no internal ID.
    pub fn from_value(body: Value) -> Option<Self> {
        let remote_id = internal_id_of(&body)?;
        Some(Self { remote_id, body })
    }

    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Value {
        &mut self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Internal ID of the record's `parent` reference, if any.
    pub fn parent_id(&self) -> Option<String> {
        self.body.get("parent").and_then(internal_id_of)
    }

    /// Internal ID of the record's `createdFrom` back-reference, if any.
    pub fn created_from_id(&self) -> Option<String> {
        self.body.get("createdFrom").and_then(internal_id_of)
    }

    /// Reads a plain top-level field as a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }

    /// The record wrapped as `{"record": body}`, the shape callers receive.
    pub fn to_doc(&self) -> Value {
        json!({ "record": self.body })
    }
}

/// Reads `$attributes.internalId` from a document, accepting string or number.
pub fn internal_id_of(value: &Value) -> Option<String> {
    match value.get("$attributes")?.get("internalId")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizes a "one or many" field: arrays as-is, null as empty, anything
/// else as a singleton.
pub fn one_or_many(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
