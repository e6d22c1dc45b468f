//! Correlation engine.
//!
//! Combines the results of several remote calls into one domain result:
//! matrix parents with their children, fulfillments with their order
//! numbers, and addresses matched against a customer's address book.
//! Every remote call made here is sequential.

pub mod address;
pub mod fulfillment;
pub mod matrix;

use crate::client::SuiteClient;
use crate::criteria::SearchCriteria;
use crate::error::SuiteResult;
use crate::pagination::{PageTracker, SearchRequest, fetch_page};
use suitelink_types::RemoteRecord;
use tracing::debug;

pub use address::{AddressMatch, match_candidates};
pub use fulfillment::{EnrichedFulfillment, enrich_fulfillments};
pub use matrix::{CorrelationState, MatrixFamily, Stage};

/// Runs a search to exhaustion, returning every record of every page in
/// order.
pub async fn drain_search(
    client: &dyn SuiteClient,
    criteria: &SearchCriteria,
) -> SuiteResult<Vec<RemoteRecord>> {
    let mut tracker = PageTracker::new();
    let mut page = fetch_page(client, SearchRequest::Fresh(criteria)).await?;
    tracker.observe(&page)?;

    let mut records = Vec::new();
    loop {
        records.append(&mut page.records);
        let Some(cursor) = page.next_cursor.take() else {
            break;
        };
        page = fetch_page(client, SearchRequest::Resume(&cursor)).await?;
        tracker.observe(&page)?;
    }

    debug!("Search drained: {} records", records.len());
    Ok(records)
}
