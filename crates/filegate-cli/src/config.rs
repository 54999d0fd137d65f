//! Gateway configuration

use filegate_core::Container;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Connection settings for the object store behind one container
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ContainerStoreConfig {
    /// S3 endpoint URL
    pub endpoint: Option<String>,
    /// Bucket name
    pub bucket: Option<String>,
    /// Access key
    pub access_key: Option<String>,
    /// Secret key
    #[serde(skip_serializing, default)]
    pub secret_key: Option<String>,
    /// Signing region
    pub region: Option<String>,
}

impl ContainerStoreConfig {
    /// Read `FILEGATE_<NAME>_S3_*` variables from the process environment
    pub fn from_env(container: Container) -> Self {
        Self::from_lookup(container, |name| std::env::var(name).ok())
    }

    /// Read `FILEGATE_<NAME>_S3_*` variables through `lookup`
    pub fn from_lookup<F>(container: Container, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("FILEGATE_{}_S3_{}", container.as_str(), suffix))
                .filter(|value| !value.trim().is_empty())
        };

        Self {
            endpoint: var("ENDPOINT"),
            bucket: var("BUCKET"),
            access_key: var("ACCESS_KEY"),
            secret_key: var("SECRET_KEY"),
            region: var("REGION"),
        }
    }

    /// Backend settings for `container`, failing on a missing endpoint or bucket
    #[cfg(feature = "s3")]
    pub fn s3_config(
        &self,
        container: Container,
        presign_ttl: Duration,
    ) -> anyhow::Result<filegate_storage::S3Config> {
        let missing = |suffix: &str| {
            anyhow::anyhow!(
                "FILEGATE_{}_S3_{} is not set; every container needs an object store",
                container.as_str(),
                suffix
            )
        };

        let endpoint = self.endpoint.as_deref().ok_or_else(|| missing("ENDPOINT"))?;
        let bucket = self.bucket.as_deref().ok_or_else(|| missing("BUCKET"))?;

        let mut config =
            filegate_storage::S3Config::new(endpoint, bucket).with_presign_ttl(presign_ttl);
        if let Some(region) = &self.region {
            config = config.with_region(region);
        }
        if let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) {
            config = config.with_credentials(access_key, secret_key);
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ContainerStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Use in-memory backends (for testing/development)
    pub use_memory_store: bool,
    /// Base URL of access URIs issued by in-memory backends
    pub memory_base_url: String,
    /// JWT secret for authentication
    #[serde(skip_serializing, default)]
    pub jwt_secret: Option<String>,
    /// Enable authentication
    pub auth_enabled: bool,
    /// Maximum upload size (bytes)
    pub max_upload_size: usize,
    /// Lifetime of issued access URIs (seconds)
    pub access_uri_ttl_secs: u64,
    /// Host substituted into issued access URIs
    pub uri_host_override: Option<String>,
    /// Port substituted into issued access URIs
    pub uri_port_override: Option<u16>,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Object store settings per container
    #[serde(default)]
    pub containers: BTreeMap<Container, ContainerStoreConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            use_memory_store: false,
            memory_base_url: "http://localhost:8090/blobs".to_string(),
            jwt_secret: None,
            auth_enabled: true,
            max_upload_size: 100 * 1024 * 1024, // 100 MiB
            access_uri_ttl_secs: 300,
            uri_host_override: None,
            uri_port_override: None,
            cors_enabled: true,
            containers: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Lifetime of issued access URIs
    pub fn access_uri_ttl(&self) -> Duration {
        Duration::from_secs(self.access_uri_ttl_secs)
    }

    /// Fill `containers` from the process environment
    pub fn with_container_stores_from_env(mut self) -> Self {
        self.containers = Container::ALL
            .into_iter()
            .map(|container| (container, ContainerStoreConfig::from_env(container)))
            .collect();
        self
    }

    /// Object store settings for a container, empty when unset
    pub fn container_store(&self, container: Container) -> ContainerStoreConfig {
        self.containers.get(&container).cloned().unwrap_or_default()
    }
}
