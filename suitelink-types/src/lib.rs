//! Core type definitions for suitelink.
//!
//! This crate defines the plain data shared by the connector engine and the
//! gateway:
//! - Query descriptors (exact IDs, field filters, modified-date ranges)
//! - Record references and remote records
//! - Business references and the path extractor that builds them
//! - Caller-visible status categories
//!
//! Nothing here performs I/O.

mod descriptor;
mod record;
mod reference;
mod status;

pub use descriptor::{DateRange, DateRangeDoc, FieldFilter, QueryDescriptor, QueryDoc, SearchFieldDoc};
pub use record::{RecordRef, RemoteRecord, internal_id_of, one_or_many};
pub use reference::{BusinessReference, DotPathExtractor, PathExtractor};
pub use status::StatusCategory;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
