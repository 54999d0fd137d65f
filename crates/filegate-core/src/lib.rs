//! # Filegate Core
//!
//! Gateway orchestration for the filegate container storage service.
//!
//! This crate provides:
//! - **Containers**: The closed set of logical storage areas
//! - **Container Registry**: One backend per container, fixed at startup
//! - **Checksums**: Backend base64 digests re-encoded as lowercase hex
//! - **Access URIs**: Optional host/port rewriting of presigned URLs
//! - **File Gateway**: Store, retrieve, exists and delete with a stable error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Adapter               │
//! ├─────────────────────────────────────────┤
//! │              FileGateway                │
//! ├──────────────┬─────────────┬────────────┤
//! │  StorageKey  │  Checksum   │ UriOverride│
//! ├──────────────┴─────────────┴────────────┤
//! │          ContainerRegistry              │
//! ├─────────────────────────────────────────┤
//! │        FileBackend (per container)      │
//! └─────────────────────────────────────────┘
//! ```

pub mod checksum;
pub mod container;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod uri;

pub use checksum::{Checksum, ChecksumError};
pub use container::{Container, UnknownContainer};
pub use error::{GatewayError, Result};
pub use gateway::{BackendStatus, FileGateway, HealthReport};
pub use registry::ContainerRegistry;
pub use uri::{UriOverride, UriRewriteError};
