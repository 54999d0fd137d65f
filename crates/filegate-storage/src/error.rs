//! Error types for the filegate-storage crate

use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during backend storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object not found
    #[error("object not found: {0}")]
    NotFound(String),

    /// Object key rejected by the backend
    #[error("invalid object key: {0}")]
    InvalidKey(#[from] crate::key::InvalidKey),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP error returned by the object store
    #[error("http error: {status} {message}")]
    Http { status: u16, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Access URI could not be produced
    #[error("presign error: {0}")]
    Presign(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether this error is a failure to move bytes to or from the backend
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Http { .. } | Self::Io(_)
        )
    }

    /// Build an HTTP error from a non-success status code
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }
}

#[cfg(feature = "s3")]
impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        use s3::error::S3Error;

        match err {
            S3Error::HttpFailWithBody(status, body) => StorageError::Http {
                status,
                message: body,
            },
            S3Error::Io(e) => StorageError::Io(e),
            S3Error::Credentials(e) => StorageError::Configuration(e.to_string()),
            S3Error::Region(e) => StorageError::Configuration(e.to_string()),
            // Transport failures, including timeouts, surface through hyper
            S3Error::Hyper(e) => StorageError::Connection(e.to_string()),
            S3Error::Http(e) => StorageError::Connection(e.to_string()),
            other => StorageError::Backend(other.to_string()),
        }
    }
}
