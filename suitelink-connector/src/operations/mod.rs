//! Caller-facing operations.
//!
//! Every operation takes a [`FunctionRequest`] and returns a
//! [`FunctionResponse`]; failures are rendered, never returned.

mod customer;
mod fulfillment;
mod product;
mod sales_order;

use crate::client::SuiteClient;
use crate::config::{ConnectorConfig, ReferenceSet};
use crate::error::{SuiteError, SuiteResult};
use crate::hints::EnvironmentHints;
use crate::http::HttpSuiteClient;
use crate::outcome::FunctionResponse;
use crate::pagination::{Cursor, Page, SearchRequest, fetch_page};
use crate::translate::{QueryKind, translate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use suitelink_types::{BusinessReference, DotPathExtractor, PathExtractor, QueryDescriptor, QueryDoc};
use tracing::{debug, info};

/// Inbound call shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRequest {
    /// Query descriptor or document to write.
    #[serde(default)]
    pub doc: Value,
    #[serde(default, alias = "flowContext", skip_serializing_if = "Option::is_none")]
    pub hints: Option<EnvironmentHints>,
    #[serde(rename = "customerRemoteID", default, skip_serializing_if = "Option::is_none")]
    pub customer_remote_id: Option<String>,
    #[serde(rename = "customerAddressRemoteID", default, skip_serializing_if = "Option::is_none")]
    pub customer_address_remote_id: Option<String>,
}

impl FunctionRequest {
    pub fn with_doc(doc: Value) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    pub fn with_hints(mut self, hints: EnvironmentHints) -> Self {
        self.hints = Some(hints);
        self
    }

    fn hints(&self) -> Option<&EnvironmentHints> {
        self.hints.as_ref()
    }
}

/// Names of every operation, as routed by [`Connector::call`].
pub const OPERATIONS: [&str; 12] = [
    "get_product_simple_from_query",
    "get_product_pricing_from_query",
    "get_product_virtual_matrix_from_query",
    "get_product_matrix_from_query",
    "get_fulfillment_from_query",
    "check_for_customer",
    "check_for_customer_address",
    "insert_sales_order",
    "update_customer",
    "update_customer_address",
    "extract_customer_from_sales_order",
    "extract_customer_address_from_customer",
];

/// A validated query request.
struct QueryRequest {
    descriptor: QueryDescriptor,
    resume: Option<Value>,
    page_size: u32,
}

/// Entry point for all operations.
pub struct Connector {
    client: Arc<dyn SuiteClient>,
    config: ConnectorConfig,
    extractor: Arc<dyn PathExtractor>,
}

impl Connector {
    pub fn new(client: Arc<dyn SuiteClient>, config: ConnectorConfig) -> Self {
        Self {
            client,
            config,
            extractor: Arc::new(DotPathExtractor),
        }
    }

    /// A connector talking HTTP to the configured remote.
    pub fn from_config(config: ConnectorConfig) -> SuiteResult<Self> {
        config.validate()?;
        let client = HttpSuiteClient::new(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Replaces the business reference path evaluator.
    pub fn with_extractor(mut self, extractor: Arc<dyn PathExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Runs the operation called `name`.
    pub async fn call(&self, name: &str, request: &FunctionRequest) -> FunctionResponse {
        info!("Running {}", name);
        match name {
            "get_product_simple_from_query" => self.get_product_simple_from_query(request).await,
            "get_product_pricing_from_query" => self.get_product_pricing_from_query(request).await,
            "get_product_virtual_matrix_from_query" => {
                self.get_product_virtual_matrix_from_query(request).await
            }
            "get_product_matrix_from_query" => self.get_product_matrix_from_query(request).await,
            "get_fulfillment_from_query" => self.get_fulfillment_from_query(request).await,
            "check_for_customer" => self.check_for_customer(request).await,
            "check_for_customer_address" => self.check_for_customer_address(request).await,
            "insert_sales_order" => self.insert_sales_order(request).await,
            "update_customer" => self.update_customer(request).await,
            "update_customer_address" => self.update_customer_address(request).await,
            "extract_customer_from_sales_order" => self.extract_customer_from_sales_order(request),
            "extract_customer_address_from_customer" => {
                self.extract_customer_address_from_customer(request)
            }
            other => FunctionResponse::from_error(&SuiteError::Validation(format!(
                "unknown function '{other}'"
            ))),
        }
    }

    fn client(&self) -> &dyn SuiteClient {
        self.client.as_ref()
    }

    fn reference_paths(&self, set: ReferenceSet) -> SuiteResult<&[String]> {
        self.config.business_references.require(set)
    }

    fn reference(&self, paths: &[String], doc: &Value) -> BusinessReference {
        BusinessReference::extract_with(self.extractor.as_ref(), paths, doc)
    }

    /// Validates a query document before any remote call.
    fn query_request(&self, request: &FunctionRequest) -> SuiteResult<QueryRequest> {
        if request.doc.is_null() {
            return Err(SuiteError::Validation("doc was not provided".to_string()));
        }
        let doc: QueryDoc = serde_json::from_value(request.doc.clone())
            .map_err(|e| SuiteError::Validation(format!("doc is not a query: {e}")))?;
        let descriptor = QueryDescriptor::try_from(&doc)?;
        debug!("Query is valid: {}", descriptor.mode_name());

        Ok(QueryRequest {
            descriptor,
            resume: doc.paging_context.filter(|c| !c.is_null()),
            page_size: doc.page_size.unwrap_or(self.config.page_size),
        })
    }

    /// Runs one page of a single-search workflow: a fresh search, or exactly
    /// the page named by the paging context. Criteria are built even when
    /// resuming, so a request with colliding hints never reaches the remote.
    async fn query_page(&self, kind: QueryKind, request: &FunctionRequest) -> SuiteResult<Page> {
        let query = self.query_request(request)?;
        let criteria = translate(kind, &query.descriptor, request.hints())?
            .with_page_size(Some(query.page_size));
        match &query.resume {
            Some(context) => {
                let cursor = Cursor::from_context(context)?;
                info!("Resuming search at page {}", cursor.page_index());
                fetch_page(self.client(), SearchRequest::Resume(&cursor)).await
            }
            None => fetch_page(self.client(), SearchRequest::Fresh(&criteria)).await,
        }
    }
}
