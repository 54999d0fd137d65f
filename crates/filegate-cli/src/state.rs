//! Application state

use crate::config::GatewayConfig;
use anyhow::Context;
use filegate_core::registry::SharedBackend;
use filegate_core::{ContainerRegistry, FileGateway, UriOverride};
use filegate_storage::MemoryBackend;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Container-aware file service
    pub gateway: FileGateway,
}

impl AppState {
    /// Build one backend per container and the gateway over them
    ///
    /// Fails when any container's backend cannot be built or reached.
    pub async fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let uri_override = UriOverride::new(
            config.uri_host_override.clone(),
            config.uri_port_override,
        )
        .context("invalid access URI override")?;
        if uri_override.is_set() {
            info!(
                host = ?uri_override.host(),
                port = ?uri_override.port(),
                "Access URIs will be rewritten"
            );
        }

        let registry = if config.use_memory_store {
            warn!("⚠ Storage mode: In-memory (NOT persistent - for development only)");
            memory_registry(&config)?
        } else {
            connect_object_stores(&config).await?
        };

        Ok(Self::with_gateway(
            config,
            FileGateway::new(registry, uri_override),
        ))
    }

    /// Wrap an already built gateway
    pub fn with_gateway(config: GatewayConfig, gateway: FileGateway) -> Self {
        Self { config, gateway }
    }
}

fn memory_registry(config: &GatewayConfig) -> anyhow::Result<ContainerRegistry> {
    let ttl = config.access_uri_ttl();
    ContainerRegistry::try_from_fn(|container| {
        let base = format!(
            "{}/{}",
            config.memory_base_url.trim_end_matches('/'),
            container.as_str().to_lowercase()
        );
        let base_url =
            Url::parse(&base).with_context(|| format!("invalid memory base URL {base}"))?;
        let backend: SharedBackend = Arc::new(MemoryBackend::new(base_url, ttl)?);
        Ok::<_, anyhow::Error>(backend)
    })
}

#[cfg(feature = "s3")]
async fn connect_object_stores(config: &GatewayConfig) -> anyhow::Result<ContainerRegistry> {
    use filegate_storage::S3Backend;

    ContainerRegistry::connect(|container| async move {
        let s3 = config
            .container_store(container)
            .s3_config(container, config.access_uri_ttl())?;
        let backend = S3Backend::connect(&s3)
            .await
            .with_context(|| format!("{container} container backend is unavailable"))?;
        info!(container = %container, bucket = %s3.bucket, "✓ Container bound to S3 bucket");
        let backend: SharedBackend = Arc::new(backend);
        Ok::<_, anyhow::Error>(backend)
    })
    .await
}

#[cfg(not(feature = "s3"))]
async fn connect_object_stores(_config: &GatewayConfig) -> anyhow::Result<ContainerRegistry> {
    anyhow::bail!("built without S3 support; enable the in-memory store instead")
}
