//! Query, pagination and correlation engine for the suitelink ERP connector.
//!
//! This crate provides:
//! - A [`SuiteClient`] abstraction over the remote service, an HTTP
//!   implementation and a scripted mock
//! - Query translation from descriptors and environment hints to search
//!   criteria
//! - Single-call page fetching with opaque resume cursors
//! - Correlation of multi-search results (matrix families, fulfillment
//!   orders, address matching)
//! - Fault classification and status resolution
//! - The caller-facing operations on [`Connector`]
//!
//! # Example
//!
//! ```ignore
//! use suitelink_connector::{Connector, ConnectorConfig, FunctionRequest};
//! use serde_json::json;
//!
//! let connector = Connector::from_config(ConnectorConfig::default())?;
//! let request = FunctionRequest::with_doc(json!({ "remoteIDs": ["100"] }));
//! let response = connector.get_product_simple_from_query(&request).await;
//! println!("{}", response.nc_status_code);
//! ```

pub mod client;
pub mod config;
pub mod correlation;
pub mod criteria;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod hints;
pub mod http;
pub mod operations;
pub mod outcome;
pub mod pagination;
pub mod translate;

pub use client::{CallResult, SuiteClient};
pub use config::{BusinessReferenceConfig, ConnectorConfig, ReferenceSet};
pub use criteria::{SearchCriteria, SearchRecord};
pub use error::{SuiteError, SuiteResult, TransportError};
pub use fault::{FaultClass, classify};
pub use hints::EnvironmentHints;
pub use http::HttpSuiteClient;
pub use operations::{Connector, FunctionRequest, OPERATIONS};
pub use outcome::{Entity, FunctionResponse, Outcome, OutcomeKind, PagingContext, ResolvedDoc};
pub use pagination::{Cursor, Page, PageTracker, SearchRequest, fetch_page};
pub use translate::{QueryKind, translate};
