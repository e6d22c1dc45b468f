//! Caller-visible status categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of one connector call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    NotFound,
    Found,
    PartialFound,
    Ambiguous,
    Created,
    Updated,
    ValidationError,
    RateLimited,
    ProtocolFault,
    Fatal,
}

impl StatusCategory {
    /// Every category, in declaration order.
    pub const ALL: [StatusCategory; 10] = [
        Self::NotFound,
        Self::Found,
        Self::PartialFound,
        Self::Ambiguous,
        Self::Created,
        Self::Updated,
        Self::ValidationError,
        Self::RateLimited,
        Self::ProtocolFault,
        Self::Fatal,
    ];

    /// The HTTP-style status code the platform expects (`ncStatusCode`).
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 204,
            Self::Found => 200,
            Self::PartialFound => 206,
            Self::Ambiguous => 409,
            Self::Created => 201,
            Self::Updated => 200,
            Self::ValidationError => 400,
            Self::RateLimited => 429,
            Self::ProtocolFault => 400,
            Self::Fatal => 500,
        }
    }

    /// True for statuses the caller may retry after backing off.
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// True for statuses produced by a failure path.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::ValidationError | Self::RateLimited | Self::ProtocolFault | Self::Fatal
        )
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
