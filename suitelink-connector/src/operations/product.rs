use super::{Connector, FunctionRequest};
use crate::config::ReferenceSet;
use crate::correlation::matrix::{discover_families, families_from_context, fetch_family};
use crate::error::SuiteResult;
use crate::outcome::{Entity, FunctionResponse, Outcome, PagingContext, ResolvedDoc};
use crate::translate::{QueryKind, translate};
use serde_json::json;
use suitelink_types::RemoteRecord;
use tracing::info;

/// How a product record is wrapped in the payload `doc`.
#[derive(Debug, Clone, Copy)]
enum DocShape {
    /// `{ "records": [ { "record": ... } ] }`
    Records,
    /// `{ "record": ... }`
    Record,
}

impl Connector {
    /// Queries non-matrix inventory items.
    pub async fn get_product_simple_from_query(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(
            self.product_query(
                QueryKind::ProductSimple,
                ReferenceSet::Product,
                Entity::Product,
                DocShape::Records,
                request,
            )
            .await,
        )
    }

    /// Queries inventory items for pricing.
    pub async fn get_product_pricing_from_query(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(
            self.product_query(
                QueryKind::ProductPricing,
                ReferenceSet::ProductPricing,
                Entity::ProductPricing,
                DocShape::Record,
                request,
            )
            .await,
        )
    }

    /// Queries virtual matrix parents. Environment hints are ignored.
    pub async fn get_product_virtual_matrix_from_query(
        &self,
        request: &FunctionRequest,
    ) -> FunctionResponse {
        FunctionResponse::resolve(
            self.product_query(
                QueryKind::ProductVirtualMatrix,
                ReferenceSet::Product,
                Entity::Product,
                DocShape::Record,
                request,
            )
            .await,
        )
    }

    /// Queries matrix families, one family per call.
    pub async fn get_product_matrix_from_query(&self, request: &FunctionRequest) -> FunctionResponse {
        FunctionResponse::resolve(self.product_matrix(request).await)
    }

    async fn product_query(
        &self,
        kind: QueryKind,
        references: ReferenceSet,
        entity: Entity,
        shape: DocShape,
        request: &FunctionRequest,
    ) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(references)?;
        let page = self.query_page(kind, request).await?;

        let docs = page
            .records
            .iter()
            .map(|record| self.product_doc(record, paths, entity, shape))
            .collect();
        Ok(Outcome::from_page(docs, page.next_cursor.map(PagingContext::Search)))
    }

    fn product_doc(
        &self,
        record: &RemoteRecord,
        paths: &[String],
        entity: Entity,
        shape: DocShape,
    ) -> ResolvedDoc {
        let wrapped = record.to_doc();
        let reference = self.reference(paths, &wrapped);
        let doc = match shape {
            DocShape::Records => json!({ "records": [wrapped] }),
            DocShape::Record => wrapped,
        };
        ResolvedDoc::with_doc(doc)
            .with_remote_id(entity, record.remote_id())
            .with_reference(entity, &reference)
    }

    async fn product_matrix(&self, request: &FunctionRequest) -> SuiteResult<Outcome> {
        let paths = self.reference_paths(ReferenceSet::Product)?;
        let query = self.query_request(request)?;

        let mut families = match &query.resume {
            Some(context) => {
                translate(QueryKind::MatrixParents, &query.descriptor, request.hints())?;
                translate(QueryKind::MatrixChildren, &query.descriptor, request.hints())?;
                families_from_context(context)?
            }
            None => {
                discover_families(
                    self.client(),
                    &query.descriptor,
                    request.hints(),
                    Some(query.page_size),
                )
                .await?
            }
        };
        if families.is_empty() {
            info!("No matrix families to read");
            return Ok(Outcome::Empty);
        }

        let family = families.remove(0);
        let parent = fetch_family(self.client(), &family).await?;
        let doc = self.product_doc(&parent, paths, Entity::Product, DocShape::Record);
        info!(
            "Read matrix family {}; {} remaining",
            family.parent,
            families.len()
        );

        let next = (!families.is_empty()).then(|| PagingContext::Matrix(families));
        Ok(Outcome::from_page(vec![doc], next))
    }
}
