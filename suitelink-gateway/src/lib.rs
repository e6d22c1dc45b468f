//! HTTP API for the suitelink connector.

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use suitelink_connector::{Connector, FunctionRequest, FunctionResponse, OPERATIONS, SuiteError};
use tracing::warn;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub operations: Vec<String>,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        operations: OPERATIONS.iter().map(|s| s.to_string()).collect(),
    })
}

/// Runs one operation. The connector's status travels in `ncStatusCode`;
/// the HTTP status is 200 for every known operation.
async fn function_handler(
    State(connector): State<Arc<Connector>>,
    Path(name): Path<String>,
    Json(request): Json<FunctionRequest>,
) -> (StatusCode, Json<FunctionResponse>) {
    if !OPERATIONS.contains(&name.as_str()) {
        warn!("Rejected call to unknown function {}", name);
        let err = SuiteError::Validation(format!("unknown function '{name}'"));
        return (StatusCode::NOT_FOUND, Json(FunctionResponse::from_error(&err)));
    }
    (StatusCode::OK, Json(connector.call(&name, &request).await))
}

/// Build the HTTP API router around a connector.
pub fn build_router(connector: Arc<Connector>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/functions/{name}", post(function_handler))
        .with_state(connector)
}
