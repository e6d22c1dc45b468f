use super::{Connector, FunctionRequest};
use crate::config::ReferenceSet;
use crate::correlation::enrich_fulfillments;
use crate::error::SuiteResult;
use crate::outcome::{Entity, FunctionResponse, Outcome, PagingContext, ResolvedDoc};
use crate::translate::QueryKind;
use serde_json::Value;

impl Connector {
    /// Queries item fulfillments and resolves each one's sales order number.
    pub async fn get_fulfillment_from_query(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.fulfillment_query(request).await)
    }

    async fn fulfillment_query(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.config.business_references.paths(ReferenceSet::Fulfillment);
        let page = self.query_page(QueryKind::Fulfillment, request).await?;
        let enriched = enrich_fulfillments(self.client(), page.records, request.hints()).await?;

        let docs = enriched
            .into_iter()
            .map(|item| {
                let wrapped = item.fulfillment.to_doc();
                let mut doc = ResolvedDoc::new()
                    .with_remote_id(Entity::Fulfillment, item.fulfillment.remote_id())
                    .with_remote_id(Entity::SalesOrder, item.sales_order_id)
                    .with(
                        Entity::SalesOrder.reference_key(),
                        Value::String(item.order_number),
                    );
                if !paths.is_empty() {
                    doc = doc.with_reference(Entity::Fulfillment, &self.reference(paths, &wrapped));
                }
                doc.with("doc", wrapped)
            })
            .collect();

        Ok(Outcome::from_page(docs, page.next_cursor.map(PagingContext::Search)))
    }
}
