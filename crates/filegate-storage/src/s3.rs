//! S3-compatible backend
//!
//! Works against AWS S3, MinIO, Cloudflare R2 and other S3-compatible
//! services. Access URIs are presigned GET URLs.

use crate::hashing::Md5Reader;
use crate::{ByteStream, FileBackend, Result, StorageError, StorageKey};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::io::StreamReader;
use tracing::{debug, info, instrument};
use url::Url;

/// Connection settings for one S3 bucket
#[derive(Clone)]
pub struct S3Config {
    /// Endpoint URL (e.g., "http://localhost:9000")
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Region; detected from AWS endpoints when `None`
    pub region: Option<String>,
    /// Access key
    pub access_key: Option<String>,
    /// Secret key
    pub secret_key: Option<String>,
    /// Lifetime of presigned access URIs
    pub presign_ttl: Duration,
}

impl S3Config {
    /// Create with an endpoint and bucket
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            region: None,
            access_key: None,
            secret_key: None,
            presign_ttl: Duration::from_secs(300),
        }
    }

    /// Set static credentials
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the presigned URI lifetime
    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    /// Region to sign with: explicit, else parsed from `s3.REGION.amazonaws.com`,
    /// else `us-east-1`
    pub fn resolved_region(&self) -> String {
        if let Some(region) = &self.region {
            return region.clone();
        }

        self.endpoint
            .find("s3.")
            .and_then(|start| {
                let rest = &self.endpoint[start + 3..];
                rest.find(".amazonaws.com").map(|end| rest[..end].to_string())
            })
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| "us-east-1".to_string())
    }
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("presign_ttl", &self.presign_ttl)
            .finish()
    }
}

/// S3-compatible container backend
pub struct S3Backend {
    bucket: Box<s3::Bucket>,
    presign_ttl_secs: u32,
}

impl S3Backend {
    /// Build a backend without contacting the service
    pub fn new(config: &S3Config) -> Result<Self> {
        let region = s3::Region::Custom {
            region: config.resolved_region(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = s3::creds::Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Configuration(format!("invalid S3 credentials: {e}")))?;

        let bucket = s3::Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Configuration(format!("invalid S3 bucket: {e}")))?
            .with_path_style();

        let presign_ttl_secs = u32::try_from(config.presign_ttl.as_secs()).map_err(|_| {
            StorageError::Configuration(format!(
                "presign TTL of {}s is out of range",
                config.presign_ttl.as_secs()
            ))
        })?;

        Ok(Self {
            bucket,
            presign_ttl_secs,
        })
    }

    /// Build a backend and verify the bucket is reachable
    pub async fn connect(config: &S3Config) -> Result<Self> {
        let backend = Self::new(config)?;
        backend.health().await?;
        info!(endpoint = %config.endpoint, bucket = %config.bucket, "Connected to S3 bucket");
        Ok(backend)
    }

    /// Bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn head_status(&self, key: &StorageKey) -> Result<u16> {
        let (_, status) = self.bucket.head_object(key.as_str()).await?;
        Ok(status)
    }

    async fn presign(&self, key: &StorageKey) -> Result<Url> {
        let signed = self
            .bucket
            .presign_get(key.as_str(), self.presign_ttl_secs, None)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Url::parse(&signed).map_err(|e| StorageError::Presign(format!("{e}: {signed}")))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl FileBackend for S3Backend {
    #[instrument(skip(self, stream), fields(bucket = %self.bucket.name(), key = %key))]
    async fn store(&self, stream: ByteStream, key: &StorageKey) -> Result<String> {
        let mut reader = Md5Reader::new(StreamReader::new(stream));

        let response = self.bucket.put_object_stream(&mut reader, key.as_str()).await?;
        let status = response.status_code();
        if !is_success(status) {
            return Err(StorageError::http(status, "upload rejected by object store"));
        }

        debug!(bytes = reader.bytes_read(), "Upload complete");

        Ok(reader.finish())
    }

    async fn get(&self, key: &StorageKey) -> Result<Url> {
        match self.head_status(key).await? {
            404 => Err(StorageError::NotFound(key.to_string())),
            status if is_success(status) => self.presign(key).await,
            status => Err(StorageError::http(status, "object lookup failed")),
        }
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        match self.head_status(key).await? {
            404 => Ok(false),
            status if is_success(status) => Ok(true),
            status => Err(StorageError::http(status, "object lookup failed")),
        }
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool> {
        // S3 deletes are silent about missing objects, so look first.
        if !self.exists(key).await? {
            return Ok(false);
        }

        let response = self.bucket.delete_object(key.as_str()).await?;
        match response.status_code() {
            404 => Ok(false),
            status if is_success(status) => Ok(true),
            status => Err(StorageError::http(status, "object delete failed")),
        }
    }

    async fn health(&self) -> Result<()> {
        let (_, status) = self
            .bucket
            .list_page(String::new(), None, None, None, Some(1))
            .await?;

        if is_success(status) {
            Ok(())
        } else {
            Err(StorageError::http(status, "bucket listing failed"))
        }
    }
}
