//! Remote fault classification.
//!
//! Pure textual matching over an error's response body. Nothing here knows
//! how the body was produced.

use crate::error::TransportError;
use tracing::error;

/// Marker present in every remote fault body.
pub const FAULT_MARKER: &str = "soapenv:Fault";

/// Markers for the remote's concurrency and request-rate ceilings.
pub const RATE_LIMIT_MARKERS: [&str; 2] = [
    "platformFaults:exceededConcurrentRequestLimitFault",
    "platformFaults:exceededRequestLimitFault",
];

/// How a transport failure should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Retriable after backoff. Retrying is the caller's job.
    RateLimited,
    /// Business-level rejection. Not retriable.
    ProtocolFault,
    /// Anything unrecognized.
    Fatal,
}

/// Classifies a transport failure by inspecting its response body.
pub fn classify(err: &TransportError) -> FaultClass {
    let Some(body) = err.body.as_deref() else {
        error!("Remote call failed without a response: {}", err);
        return FaultClass::Fatal;
    };

    if let Some(marker) = RATE_LIMIT_MARKERS.iter().find(|m| body.contains(*m)) {
        error!("Request limit exceeded ({}): {}", marker, body);
        return FaultClass::RateLimited;
    }

    if body.contains(FAULT_MARKER) {
        error!("Remote fault found: {}", body);
        return FaultClass::ProtocolFault;
    }

    error!("Unrecognized remote failure: {}", err);
    FaultClass::Fatal
}
