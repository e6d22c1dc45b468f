//! Response envelopes.
//!
//! Each remote operation answers with a single keyed envelope. Parsing here
//! turns the raw document into typed data and settles the "one record or
//! many" question once: everything downstream sees sequences.

use crate::error::{SuiteError, SuiteResult};
use serde::Deserialize;
use serde_json::Value;
use suitelink_types::{RemoteRecord, internal_id_of, one_or_many};
use tracing::warn;

/// `status` block present on every envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusDoc {
    #[serde(rename = "$attributes", default)]
    attributes: StatusAttributes,
    #[serde(default)]
    status_detail: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusAttributes {
    #[serde(default)]
    is_success: Value,
}

impl StatusDoc {
    fn is_success(&self) -> bool {
        match &self.attributes.is_success {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        }
    }
}

/// Takes the envelope stored under `key`, or fails as an unrecognized
/// response.
fn take_envelope(response: Value, key: &str) -> SuiteResult<Value> {
    match response {
        Value::Object(mut map) => map.remove(key).ok_or_else(|| {
            SuiteError::RemoteFault(format!("response has no '{key}' envelope"))
        }),
        other => Err(SuiteError::RemoteFault(format!(
            "response is not a document: {other}"
        ))),
    }
}

/// Fails with a protocol fault unless `status` reports success.
fn ensure_success(envelope: &Value) -> SuiteResult<()> {
    let status: StatusDoc = envelope
        .get("status")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .unwrap_or_default();
    if status.is_success() {
        return Ok(());
    }
    Err(SuiteError::ProtocolFault {
        detail: status.status_detail.unwrap_or_else(|| envelope.clone()),
    })
}

fn records_of(values: Vec<Value>) -> Vec<RemoteRecord> {
    values
        .into_iter()
        .filter_map(|body| {
            let record = RemoteRecord::from_value(body);
            if record.is_none() {
                warn!("Ignoring record without an internal ID");
            }
            record
        })
        .collect()
}

/// A parsed `searchResult`.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub search_id: Option<String>,
    pub page_index: u32,
    pub total_pages: u32,
    pub total_records: Option<u64>,
    pub records: Vec<RemoteRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultDoc {
    #[serde(default)]
    search_id: Option<String>,
    #[serde(default)]
    page_index: Option<u32>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total_records: Option<u64>,
    #[serde(default)]
    record_list: Option<RecordListDoc>,
}

#[derive(Debug, Deserialize)]
struct RecordListDoc {
    #[serde(default)]
    record: Value,
}

impl SearchResult {
    /// Parses a `search` or `searchMoreWithId` response.
    pub fn parse(response: Value) -> SuiteResult<Self> {
        let envelope = take_envelope(response, "searchResult")?;
        ensure_success(&envelope)?;
        let doc: SearchResultDoc = serde_json::from_value(envelope)?;

        let total_pages = doc.total_pages.ok_or(SuiteError::NoResultEnvelope)?;
        let records = doc
            .record_list
            .map(|list| records_of(one_or_many(list.record)))
            .unwrap_or_default();

        Ok(Self {
            search_id: doc.search_id,
            page_index: doc.page_index.unwrap_or(1),
            total_pages,
            total_records: doc.total_records,
            records,
        })
    }
}

/// Parses a `get` response into its record.
pub fn parse_read(response: Value) -> SuiteResult<RemoteRecord> {
    let envelope = take_envelope(response, "readResponse")?;
    ensure_success(&envelope)?;
    let body = envelope.get("record").cloned().unwrap_or(Value::Null);
    RemoteRecord::from_value(body)
        .ok_or_else(|| SuiteError::RemoteFault("read response carried no record".to_string()))
}

/// Parses a `getList` response into its records, in response order. Any
/// failed entry fails the whole list.
pub fn parse_read_list(response: Value) -> SuiteResult<Vec<RemoteRecord>> {
    let envelope = take_envelope(response, "readResponseList")?;
    ensure_success(&envelope)?;
    let entries = one_or_many(envelope.get("readResponse").cloned().unwrap_or(Value::Null));

    let mut bodies = Vec::with_capacity(entries.len());
    for entry in entries {
        ensure_success(&entry)?;
        bodies.push(entry.get("record").cloned().unwrap_or(Value::Null));
    }
    Ok(records_of(bodies))
}

/// Parses an `add` or `update` response into the written record's
/// internal ID.
pub fn parse_write(response: Value) -> SuiteResult<String> {
    let envelope = take_envelope(response, "writeResponse")?;
    ensure_success(&envelope)?;
    envelope
        .get("baseRef")
        .and_then(internal_id_of)
        .ok_or_else(|| SuiteError::RemoteFault("write response carried no baseRef".to_string()))
}
