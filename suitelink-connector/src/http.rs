//! HTTP JSON transport.
//!
//! Posts each operation's request document to `{api_base_url}/{operation}`.
//! A non-2xx answer keeps its status and raw body so the fault classifier
//! can inspect it.

use crate::client::{CallResult, SuiteClient};
use crate::config::ConnectorConfig;
use crate::criteria::SearchCriteria;
use crate::error::{SuiteError, SuiteResult, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use suitelink_types::RecordRef;
use tracing::{debug, info};

/// [`SuiteClient`] over HTTP.
pub struct HttpSuiteClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSuiteClient {
    pub fn new(config: &ConnectorConfig) -> SuiteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SuiteError::RemoteFault(format!("failed to create HTTP client: {e}")))?;

        info!("Remote client configured for {}", config.api_base_url);
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    async fn call(&self, operation: &str, body: &Value) -> CallResult {
        let url = format!("{}/{}", self.base_url, operation);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::network(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::with_body(
                format!("{operation} returned {status}"),
                Some(status.as_u16()),
                text,
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            TransportError::network(format!("{operation} response was not JSON: {e}"))
        })
    }
}

#[async_trait]
impl SuiteClient for HttpSuiteClient {
    async fn search(&self, criteria: &SearchCriteria) -> CallResult {
        self.call("search", &criteria.to_document()).await
    }

    async fn search_more_with_id(&self, search_id: &str, page_index: u32) -> CallResult {
        let body = json!({ "searchId": search_id, "pageIndex": page_index });
        self.call("searchMoreWithId", &body).await
    }

    async fn get(&self, reference: &RecordRef) -> CallResult {
        self.call("get", &json!({ "baseRef": reference.to_document() }))
            .await
    }

    async fn get_list(&self, references: &[RecordRef]) -> CallResult {
        let refs: Vec<Value> = references.iter().map(RecordRef::to_document).collect();
        self.call("getList", &json!({ "record": refs })).await
    }

    async fn add(&self, record: &Value) -> CallResult {
        self.call("add", record).await
    }

    async fn update(&self, record: &Value) -> CallResult {
        self.call("update", record).await
    }
}
