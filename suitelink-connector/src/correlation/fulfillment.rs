//! Fulfillment → sales order enrichment.

use crate::client::SuiteClient;
use crate::envelope::parse_read;
use crate::error::{SuiteError, SuiteResult};
use crate::hints::EnvironmentHints;
use futures::{StreamExt, TryStreamExt, stream};
use suitelink_types::{RecordRef, RemoteRecord};
use tracing::{debug, info};

/// Remote record type of the order a fulfillment was created from.
const SALES_ORDER_RECORD_TYPE: &str = "salesOrder";

/// A fulfillment paired with its originating order.
#[derive(Debug, Clone)]
pub struct EnrichedFulfillment {
    pub fulfillment: RemoteRecord,
    pub sales_order_id: String,
    /// The order's human-readable number (`tranId`).
    pub order_number: String,
}

/// Resolves the order number of every fulfillment on a page, one lookup at
/// a time, in page order.
///
/// Fulfillments filtered out by the ship-status hint, or without a
/// `createdFrom` reference, are skipped. Any failed lookup fails the page,
/// and so does an order that comes back without a number.
pub async fn enrich_fulfillments(
    client: &dyn SuiteClient,
    records: Vec<RemoteRecord>,
    hints: Option<&EnvironmentHints>,
) -> SuiteResult<Vec<EnrichedFulfillment>> {
    let candidates: Vec<(RemoteRecord, String)> = records
        .into_iter()
        .filter(|record| {
            let accepted = hints
                .map(|h| h.accepts_ship_status(record.field_str("shipStatus")))
                .unwrap_or(true);
            if !accepted {
                info!(
                    "Fulfillment {} does not have the requested shipStatus. Skipping.",
                    record.remote_id()
                );
            }
            accepted
        })
        .filter_map(|record| match record.created_from_id() {
            Some(order_id) => Some((record, order_id)),
            None => {
                info!(
                    "Fulfillment {} does not have a 'createdFrom' field. Skipping.",
                    record.remote_id()
                );
                None
            }
        })
        .collect();

    stream::iter(candidates)
        .then(|(fulfillment, sales_order_id)| async move {
            let order_number = lookup_order_number(client, &sales_order_id).await?;
            Ok::<_, SuiteError>(EnrichedFulfillment {
                fulfillment,
                sales_order_id,
                order_number,
            })
        })
        .try_collect()
        .await
}

async fn lookup_order_number(
    client: &dyn SuiteClient,
    sales_order_id: &str,
) -> SuiteResult<String> {
    debug!("Looking up sales order {}", sales_order_id);
    let reference = RecordRef::new(sales_order_id, SALES_ORDER_RECORD_TYPE);
    let response = client
        .get(&reference)
        .await
        .map_err(SuiteError::from_transport)?;
    let order = parse_read(response)?;
    match order.field_str("tranId") {
        Some(number) if !number.is_empty() => Ok(number.to_string()),
        _ => Err(SuiteError::CorrelationDefect(format!(
            "sales order {sales_order_id} has no tranId"
        ))),
    }
}
