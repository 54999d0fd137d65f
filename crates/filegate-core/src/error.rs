//! Gateway error taxonomy
//!
//! Every backend failure is translated into exactly one of these kinds before
//! it leaves the gateway. `Display` output is safe to show to clients; the
//! underlying cause is only reachable through `source()`.

use crate::container::Container;
use filegate_storage::{InvalidKey, StorageError};
use thiserror::Error;

/// Result type alias using `GatewayError`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Boxed cause of a server-side failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a failed gateway operation
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required parameter is missing or unparsable
    #[error("{0}")]
    InvalidRequest(String),

    /// The target filename failed validation
    #[error("Invalid target filename supplied: {reason}")]
    InvalidTarget {
        target: String,
        #[source]
        reason: InvalidKey,
    },

    /// The backend has no such file
    #[error("File \"{target}\" does not exist on {container} container")]
    NotFound { container: Container, target: String },

    /// The backend could not move the bytes
    #[error("{message}")]
    Transfer {
        message: &'static str,
        #[source]
        source: StorageError,
    },

    /// Any other backend failure
    #[error("{message}")]
    Unexpected {
        message: &'static str,
        #[source]
        source: BoxError,
    },
}

impl GatewayError {
    /// Missing or unparsable parameter
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Target rejected by validation
    pub fn invalid_target(target: impl Into<String>, reason: InvalidKey) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason,
        }
    }

    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::InvalidTarget { .. } => "InvalidTarget",
            Self::NotFound { .. } => "NotFound",
            Self::Transfer { .. } => "TransferError",
            Self::Unexpected { .. } => "UnexpectedError",
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidTarget { .. } | Self::NotFound { .. }
        )
    }
}
