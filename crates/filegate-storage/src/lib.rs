//! # Filegate Storage
//!
//! Object storage layer for the filegate container gateway.
//!
//! This crate provides:
//! - **Storage keys**: Validated, backend-safe object names
//! - **Backend trait**: Store, get, exists and delete over a single container
//! - **Memory backend**: In-process store for development and tests
//! - **S3 backend**: Any S3-compatible service (AWS S3, MinIO, R2) with presigned URLs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Gateway Layer                │
//! ├─────────────────────────────────────────┤
//! │        StorageKey │ FileBackend         │
//! ├────────────────────┬────────────────────┤
//! │   MemoryBackend    │     S3Backend      │
//! ├────────────────────┴────────────────────┤
//! │        S3-compatible object store       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use filegate_storage::{FileBackend, MemoryBackend, StorageKey};
//!
//! let backend = MemoryBackend::new("http://localhost:8090/blobs".parse()?, ttl);
//! let key = StorageKey::parse("reports/2024.pdf")?;
//! let checksum = backend.store(stream, &key).await?;
//! let uri = backend.get(&key).await?;
//! ```

pub mod error;
pub mod hashing;
pub mod key;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use error::{Result, StorageError};
pub use hashing::Md5Reader;
pub use key::{InvalidKey, StorageKey, MAX_KEY_LEN};
pub use memory::MemoryBackend;
#[cfg(feature = "s3")]
pub use s3::{S3Backend, S3Config};

#[cfg(feature = "mock")]
pub use mock::MockFileBackend;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use url::Url;

/// A boxed stream of bytes for streaming uploads.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Wrap any byte stream into a [`ByteStream`]
pub fn byte_stream<S>(stream: S) -> ByteStream
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    Box::pin(stream)
}

/// Trait for container storage backends
///
/// One instance serves exactly one container. Keys reaching a backend have
/// already been validated by [`StorageKey::parse`].
#[async_trait]
pub trait FileBackend: Send + Sync {
    /// Stream an object into storage and return its MD5 digest, base64 encoded
    async fn store(&self, stream: ByteStream, key: &StorageKey) -> Result<String>;

    /// Issue a time-limited access URI for an existing object
    async fn get(&self, key: &StorageKey) -> Result<Url>;

    /// Check if an object exists
    async fn exists(&self, key: &StorageKey) -> Result<bool>;

    /// Delete an object, returning `false` when nothing was deleted
    async fn delete(&self, key: &StorageKey) -> Result<bool>;

    /// Probe that the backend is reachable
    async fn health(&self) -> Result<()>;
}

#[cfg(feature = "mock")]
mod mock {
    use super::*;

    mockall::mock! {
        /// Scriptable backend for gateway tests
        pub FileBackend {}

        #[async_trait]
        impl FileBackend for FileBackend {
            async fn store(&self, stream: ByteStream, key: &StorageKey) -> Result<String>;
            async fn get(&self, key: &StorageKey) -> Result<Url>;
            async fn exists(&self, key: &StorageKey) -> Result<bool>;
            async fn delete(&self, key: &StorageKey) -> Result<bool>;
            async fn health(&self) -> Result<()>;
        }
    }
}
