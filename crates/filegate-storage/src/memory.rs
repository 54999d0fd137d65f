//! In-memory backend for development and testing

use crate::hashing::encode_digest;
use crate::{ByteStream, FileBackend, Result, StorageError, StorageKey};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::StreamExt;
use md5::{Digest, Md5};
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// An in-memory container backend
///
/// Access URIs point below `base_url` and carry an expiry and a keyed BLAKE3
/// signature, mimicking the presigned URLs of a real object store.
#[derive(Clone)]
pub struct MemoryBackend {
    objects: Arc<DashMap<StorageKey, Bytes>>,
    base_url: Url,
    ttl_secs: i64,
    signing_key: [u8; 32],
}

impl MemoryBackend {
    /// Create a new empty backend issuing URIs under `base_url`
    pub fn new(base_url: Url, ttl: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(StorageError::Configuration(format!(
                "memory backend base URL cannot carry paths: {}",
                base_url
            )));
        }

        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| {
            StorageError::Configuration(format!(
                "memory backend TTL of {}s is out of range",
                ttl.as_secs()
            ))
        })?;

        let mut signing_key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut signing_key);

        Ok(Self {
            objects: Arc::new(DashMap::new()),
            base_url,
            ttl_secs,
            signing_key,
        })
    }

    /// Get the number of objects stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Read back a stored object
    pub fn object(&self, key: &StorageKey) -> Option<Bytes> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    /// Signature for a key and expiry timestamp
    fn sign(&self, key: &StorageKey, expires: i64) -> String {
        let message = format!("{}\n{}", key.as_str(), expires);
        blake3::keyed_hash(&self.signing_key, message.as_bytes())
            .to_hex()
            .to_string()
    }

    fn access_uri(&self, key: &StorageKey) -> Result<Url> {
        let expires = chrono::Utc::now()
            .timestamp()
            .checked_add(self.ttl_secs)
            .ok_or_else(|| {
                StorageError::Presign(format!("expiry {}s from now is out of range", self.ttl_secs))
            })?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Presign(format!("base URL {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(key.as_str().split('/'));
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("sig", &self.sign(key, expires));

        Ok(url)
    }
}

#[async_trait]
impl FileBackend for MemoryBackend {
    #[instrument(skip(self, stream), fields(key = %key))]
    async fn store(&self, mut stream: ByteStream, key: &StorageKey) -> Result<String> {
        let mut hasher = Md5::new();
        let mut buffer = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            buffer.extend_from_slice(&chunk);
        }

        let content_md5 = encode_digest(&hasher.finalize());
        self.objects.insert(key.clone(), buffer.freeze());

        Ok(content_md5)
    }

    async fn get(&self, key: &StorageKey) -> Result<Url> {
        if !self.objects.contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        self.access_uri(key)
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        Ok(self.objects.contains_key(key))
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool> {
        Ok(self.objects.remove(key).is_some())
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("base_url", &self.base_url.as_str())
            .field("ttl_secs", &self.ttl_secs)
            .field("objects", &self.objects.len())
            .finish()
    }
}
