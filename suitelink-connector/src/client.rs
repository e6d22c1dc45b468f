//! Remote client abstraction.
//!
//! The engine talks to the ERP service through [`SuiteClient`]. Every call
//! returns the raw response document or a [`TransportError`]; interpreting
//! either is left to the caller.

use crate::criteria::SearchCriteria;
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use suitelink_types::RecordRef;

/// Result of one raw remote call.
pub type CallResult = Result<Value, TransportError>;

/// Remote operations exposed by the ERP service.
#[async_trait]
pub trait SuiteClient: Send + Sync {
    /// Runs a fresh search.
    async fn search(&self, criteria: &SearchCriteria) -> CallResult;

    /// Resumes a stored search at a 1-based page index.
    async fn search_more_with_id(&self, search_id: &str, page_index: u32) -> CallResult;

    /// Reads a single record.
    async fn get(&self, reference: &RecordRef) -> CallResult;

    /// Reads several records in one call.
    async fn get_list(&self, references: &[RecordRef]) -> CallResult;

    /// Creates a record.
    async fn add(&self, record: &Value) -> CallResult;

    /// Updates a record.
    async fn update(&self, record: &Value) -> CallResult;
}

/// A scripted client for testing.
pub mod mock {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A call the mock received.
    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        Search(Value),
        SearchMoreWithId { search_id: String, page_index: u32 },
        Get(RecordRef),
        GetList(Vec<RecordRef>),
        Add(Value),
        Update(Value),
    }

    impl RecordedCall {
        /// The remote operation name.
        pub fn operation(&self) -> &'static str {
            match self {
                Self::Search(_) => "search",
                Self::SearchMoreWithId { .. } => "searchMoreWithId",
                Self::Get(_) => "get",
                Self::GetList(_) => "getList",
                Self::Add(_) => "add",
                Self::Update(_) => "update",
            }
        }
    }

    /// Replies to calls in FIFO order, whatever the operation. Running out of
    /// scripted replies is a network failure.
    #[derive(Debug, Default)]
    pub struct MockSuiteClient {
        replies: Mutex<VecDeque<CallResult>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockSuiteClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a successful reply.
        pub fn push_ok(&self, response: Value) -> &Self {
            self.push(Ok(response))
        }

        /// Queues a failed reply.
        pub fn push_err(&self, error: TransportError) -> &Self {
            self.push(Err(error))
        }

        fn push(&self, reply: CallResult) -> &Self {
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(reply);
            self
        }

        /// Every call received so far.
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        /// Number of scripted replies not yet consumed.
        pub fn pending(&self) -> usize {
            self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        fn reply(&self, call: RecordedCall) -> CallResult {
            let operation = call.operation();
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(call);
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| {
                    Err(TransportError::network(format!(
                        "no scripted reply for {operation}"
                    )))
                })
        }
    }

    #[async_trait]
    impl SuiteClient for MockSuiteClient {
        async fn search(&self, criteria: &SearchCriteria) -> CallResult {
            self.reply(RecordedCall::Search(criteria.to_document()))
        }

        async fn search_more_with_id(&self, search_id: &str, page_index: u32) -> CallResult {
            self.reply(RecordedCall::SearchMoreWithId {
                search_id: search_id.to_string(),
                page_index,
            })
        }

        async fn get(&self, reference: &RecordRef) -> CallResult {
            self.reply(RecordedCall::Get(reference.clone()))
        }

        async fn get_list(&self, references: &[RecordRef]) -> CallResult {
            self.reply(RecordedCall::GetList(references.to_vec()))
        }

        async fn add(&self, record: &Value) -> CallResult {
            self.reply(RecordedCall::Add(record.clone()))
        }

        async fn update(&self, record: &Value) -> CallResult {
            self.reply(RecordedCall::Update(record.clone()))
        }
    }

    fn success() -> Value {
        json!({ "$attributes": { "isSuccess": "true" } })
    }

    /// A successful search page.
    pub fn search_page(records: Vec<Value>, page_index: u32, total_pages: u32, search_id: &str) -> Value {
        json!({
            "searchResult": {
                "status": success(),
                "totalRecords": records.len(),
                "totalPages": total_pages,
                "pageIndex": page_index,
                "searchId": search_id,
                "recordList": { "record": records },
            }
        })
    }

    /// A successful search with no matches.
    pub fn empty_search() -> Value {
        json!({
            "searchResult": {
                "status": success(),
                "totalRecords": 0,
                "totalPages": 0,
                "searchId": "empty",
            }
        })
    }

    /// A successful single read.
    pub fn read_response(record: Value) -> Value {
        json!({ "readResponse": { "status": success(), "record": record } })
    }

    /// A successful multi-record read.
    pub fn read_response_list(records: Vec<Value>) -> Value {
        let responses: Vec<Value> = records
            .into_iter()
            .map(|record| json!({ "status": success(), "record": record }))
            .collect();
        json!({ "readResponseList": { "status": success(), "readResponse": responses } })
    }

    /// A successful write.
    pub fn write_response(internal_id: &str) -> Value {
        json!({
            "writeResponse": {
                "status": success(),
                "baseRef": { "$attributes": { "internalId": internal_id } },
            }
        })
    }

    /// A response whose status reports a business-level failure.
    pub fn rejected(envelope: &str, detail: Value) -> Value {
        let body = json!({
            "status": { "$attributes": { "isSuccess": "false" }, "statusDetail": detail }
        });
        json!({ envelope: body })
    }

    /// A minimal record with an internal ID.
    pub fn record(internal_id: &str) -> Value {
        json!({ "$attributes": { "internalId": internal_id } })
    }

    /// A record referencing a parent by internal ID.
    pub fn child_record(internal_id: &str, parent_id: &str) -> Value {
        json!({
            "$attributes": { "internalId": internal_id },
            "parent": { "$attributes": { "internalId": parent_id } },
        })
    }
}
