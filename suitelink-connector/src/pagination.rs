//! Pagination cursor engine.
//!
//! [`fetch_page`] issues exactly one remote search call and never chases
//! further pages itself. Callers that need every page loop over the
//! returned [`Cursor`]s, optionally through a [`PageTracker`] that rejects
//! non-monotonic sequences.

use crate::client::SuiteClient;
use crate::criteria::SearchCriteria;
use crate::envelope::SearchResult;
use crate::error::{SuiteError, SuiteResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use suitelink_types::RemoteRecord;
use tracing::debug;

/// Opaque resume token for a stored remote search.
///
/// Only produced from a search response. Serializes as the platform's
/// `{ "searchId", "index" }` paging context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "searchId")]
    search_id: String,
    #[serde(rename = "index")]
    page_index: u32,
}

impl Cursor {
    pub fn search_id(&self) -> &str {
        &self.search_id
    }

    /// 1-based index of the page this cursor resumes at.
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Reads a cursor back from a caller-supplied paging context.
    pub fn from_context(context: &Value) -> SuiteResult<Self> {
        let cursor: Self = serde_json::from_value(context.clone()).map_err(|e| {
            SuiteError::Validation(format!("pagingContext is not a search cursor: {e}"))
        })?;
        if cursor.search_id.is_empty() || cursor.page_index == 0 {
            return Err(SuiteError::Validation(
                "pagingContext must carry a searchId and an index of at least 1".to_string(),
            ));
        }
        Ok(cursor)
    }

    pub fn to_context(&self) -> Value {
        serde_json::json!({ "searchId": self.search_id, "index": self.page_index })
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct Page {
    /// Records in remote response order.
    pub records: Vec<RemoteRecord>,
    pub page_index: u32,
    pub total_pages: u32,
    /// Present iff `page_index < total_pages`.
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// What to run: a fresh search or the continuation of a stored one.
#[derive(Debug, Clone, Copy)]
pub enum SearchRequest<'a> {
    Fresh(&'a SearchCriteria),
    Resume(&'a Cursor),
}

/// Runs one remote search call and returns its page.
pub async fn fetch_page(client: &dyn SuiteClient, request: SearchRequest<'_>) -> SuiteResult<Page> {
    let response = match request {
        SearchRequest::Fresh(criteria) => {
            debug!("Calling search on {}", criteria.record.search_type());
            client.search(criteria).await
        }
        SearchRequest::Resume(cursor) => {
            debug!(
                "Calling searchMoreWithId {} at page {}",
                cursor.search_id, cursor.page_index
            );
            client
                .search_more_with_id(&cursor.search_id, cursor.page_index)
                .await
        }
    }
    .map_err(SuiteError::from_transport)?;

    let result = SearchResult::parse(response)?;

    if let SearchRequest::Resume(cursor) = request {
        if result.page_index != cursor.page_index {
            return Err(SuiteError::CorrelationDefect(format!(
                "asked for page {} of search {} but received page {}",
                cursor.page_index, cursor.search_id, result.page_index
            )));
        }
        if result.page_index > result.total_pages {
            return Err(SuiteError::CorrelationDefect(format!(
                "search {} resumed past its last page ({} of {})",
                cursor.search_id, result.page_index, result.total_pages
            )));
        }
    }

    let next_cursor = if result.page_index < result.total_pages {
        let search_id = result.search_id.clone().ok_or_else(|| {
            SuiteError::RemoteFault("multi-page search result carried no searchId".to_string())
        })?;
        Some(Cursor {
            search_id,
            page_index: result.page_index + 1,
        })
    } else {
        None
    };

    debug!(
        "Received page {} of {} with {} records",
        result.page_index,
        result.total_pages,
        result.records.len()
    );

    Ok(Page {
        records: result.records,
        page_index: result.page_index,
        total_pages: result.total_pages,
        next_cursor,
    })
}

/// Checks that a resumed sequence of pages only moves forward.
#[derive(Debug, Clone, Default)]
pub struct PageTracker {
    last: Option<(u32, u32)>,
}

impl PageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page, failing when its index rewinds or the total shrinks.
    pub fn observe(&mut self, page: &Page) -> SuiteResult<()> {
        if let Some((index, total)) = self.last {
            if page.page_index <= index {
                return Err(SuiteError::CorrelationDefect(format!(
                    "page index went from {index} to {}",
                    page.page_index
                )));
            }
            if page.total_pages < total {
                return Err(SuiteError::CorrelationDefect(format!(
                    "total pages shrank from {total} to {}",
                    page.total_pages
                )));
            }
        }
        self.last = Some((page.page_index, page.total_pages));
        Ok(())
    }
}
