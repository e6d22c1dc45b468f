//! Error types for the connector engine.

use crate::fault::{FaultClass, classify};
use serde_json::Value;
use suitelink_types::StatusCategory;
use thiserror::Error;

/// Result type for connector operations.
pub type SuiteResult<T> = Result<T, SuiteError>;

/// A failure reported by the remote transport.
///
/// Transports are opaque; the only structure the engine relies on is whether
/// a response body came back and what text it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Human-readable failure description.
    pub message: String,
    /// HTTP status, when the transport got that far.
    pub status: Option<u16>,
    /// Raw response body, when one was received.
    pub body: Option<String>,
}

impl TransportError {
    /// A failure with no response (connection refused, timeout, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// A failure that carried a response body.
    pub fn with_body(message: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            body: Some(body.into()),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors that can occur in connector operations.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// Malformed request, rejected before any remote call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Transport failure with no recognizable fault, or an unrecognized
    /// response shape.
    #[error("remote fault: {0}")]
    RemoteFault(String),

    /// The remote rejected the request at the business level.
    #[error("protocol fault: {detail}")]
    ProtocolFault { detail: Value },

    /// The remote concurrency or request-rate ceiling was hit.
    #[error("rate limited: {0}")]
    RateLimited(TransportError),

    /// Success was reported but no page data is structurally present.
    #[error("search response reported success but carried no page data")]
    NoResultEnvelope,

    /// An internal invariant was violated. Indicates a logic bug, never bad input.
    #[error("correlation defect: {0}")]
    CorrelationDefect(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SuiteError {
    /// Classifies a transport failure. This is the only place transport
    /// errors are interpreted.
    pub fn from_transport(error: TransportError) -> Self {
        match classify(&error) {
            FaultClass::RateLimited => Self::RateLimited(error),
            FaultClass::ProtocolFault => Self::ProtocolFault {
                detail: Value::String(error.body.clone().unwrap_or(error.message)),
            },
            FaultClass::Fatal => Self::RemoteFault(error.to_string()),
        }
    }

    /// A protocol fault carrying a plain message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolFault {
            detail: Value::String(message.into()),
        }
    }

    /// The caller-visible status this error resolves to.
    pub fn status_category(&self) -> StatusCategory {
        match self {
            Self::Validation(_) => StatusCategory::ValidationError,
            Self::ProtocolFault { .. } => StatusCategory::ProtocolFault,
            Self::RateLimited(_) => StatusCategory::RateLimited,
            Self::RemoteFault(_)
            | Self::NoResultEnvelope
            | Self::CorrelationDefect(_)
            | Self::Serialization(_) => StatusCategory::Fatal,
        }
    }

    /// Diagnostic payload for the caller.
    pub fn diagnostic(&self) -> Value {
        match self {
            Self::ProtocolFault { detail } => detail.clone(),
            Self::RateLimited(e) => Value::String(e.body.clone().unwrap_or_else(|| e.to_string())),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<suitelink_types::Error> for SuiteError {
    fn from(error: suitelink_types::Error) -> Self {
        match error {
            suitelink_types::Error::Validation(message) => Self::Validation(message),
            other @ suitelink_types::Error::InvalidTimestamp(_) => Self::Validation(other.to_string()),
            suitelink_types::Error::Serialization(e) => Self::Serialization(e),
        }
    }
}
