//! # Filegate Gateway
//!
//! HTTP gateway in front of the filegate container backends.
//!
//! This crate provides:
//! - **File API**: Store, retrieve, existence check and delete per container
//! - **Authentication**: HS256 JWT bearer tokens
//! - **Health**: Per-container backend probes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  Filegate Gateway                   │
//! ├─────────────────────────────────────────────────────┤
//! │  Auth Middleware │ Request Id │ Body Limit │ Trace  │
//! ├─────────────────────────────────────────────────────┤
//! │                   File Handlers                     │
//! ├─────────────────────────────────────────────────────┤
//! │                   filegate-core                     │
//! │       (Containers, Validation, Error Mapping)       │
//! ├─────────────────────────────────────────────────────┤
//! │                 filegate-storage                    │
//! │              (S3, In-memory backends)               │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ContainerStoreConfig, GatewayConfig};
pub use error::ApiError;
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
