//! File gateway service
//!
//! Validates inputs, routes each request to the backend of its container and
//! translates backend results into [`GatewayError`] kinds.

use crate::checksum::Checksum;
use crate::container::Container;
use crate::error::{GatewayError, Result};
use crate::registry::ContainerRegistry;
use crate::uri::UriOverride;
use filegate_storage::{ByteStream, StorageError, StorageKey};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Gateway operations, for error messages and logs
#[derive(Clone, Copy, Debug)]
enum Operation {
    Store,
    Retrieve,
    Exists,
    Delete,
}

impl Operation {
    fn transfer_message(self) -> &'static str {
        match self {
            Self::Store => "Cannot read data to store a new file",
            Self::Retrieve => "Unable to retrieve file",
            Self::Exists => "Error checking file existence",
            Self::Delete => "Unable to delete file",
        }
    }

    fn unexpected_message(self) -> &'static str {
        match self {
            Self::Store => "Unexpected error during file storage",
            Self::Retrieve => "Unexpected error during file retrieval",
            Self::Exists => "Unexpected error checking file existence",
            Self::Delete => "Unexpected error during file deletion",
        }
    }
}

/// Health of one backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BackendStatus {
    Up,
    Down,
}

/// Health of every backend plus the aggregate
#[derive(Clone, Debug, Serialize)]
pub struct HealthReport {
    pub status: BackendStatus,
    pub containers: BTreeMap<Container, BackendStatus>,
}

impl HealthReport {
    fn from_statuses(containers: BTreeMap<Container, BackendStatus>) -> Self {
        let status = if containers.values().all(|s| *s == BackendStatus::Up) {
            BackendStatus::Up
        } else {
            BackendStatus::Down
        };
        Self { status, containers }
    }

    /// Whether every backend answered
    pub fn is_healthy(&self) -> bool {
        self.status == BackendStatus::Up
    }
}

/// Container-aware file service
#[derive(Clone, Debug)]
pub struct FileGateway {
    registry: ContainerRegistry,
    uri_override: UriOverride,
}

impl FileGateway {
    /// Create a gateway over a registry
    pub fn new(registry: ContainerRegistry, uri_override: UriOverride) -> Self {
        Self {
            registry,
            uri_override,
        }
    }

    /// The active access URI override
    pub fn uri_override(&self) -> &UriOverride {
        &self.uri_override
    }

    /// Stream content into a container and return its checksum
    #[instrument(skip_all, fields(container = %container, target = %target))]
    pub async fn store(
        &self,
        container: Container,
        target: &str,
        stream: ByteStream,
    ) -> Result<Checksum> {
        info!("Storing file");
        let key = validate_target(target)?;

        let encoded = self
            .registry
            .resolve(container)
            .store(stream, &key)
            .await
            .map_err(|e| map_backend_error(Operation::Store, container, target, e))?;

        let checksum = Checksum::from_backend(&encoded).map_err(|e| {
            error!(error = %e, "Backend returned an undecodable checksum");
            GatewayError::Unexpected {
                message: Operation::Store.unexpected_message(),
                source: Box::new(e),
            }
        })?;

        debug!(checksum = %checksum, "File stored");
        Ok(checksum)
    }

    /// Produce a time-limited access URI for a file
    ///
    /// Both parameters are optional at the boundary; a missing one is an
    /// [`GatewayError::InvalidRequest`].
    #[instrument(skip_all, fields(container = ?container, target = ?target))]
    pub async fn retrieve(
        &self,
        container: Option<Container>,
        target: Option<&str>,
    ) -> Result<Url> {
        info!("Retrieving file");
        let (container, target) = match (container, target) {
            (Some(container), Some(target)) => (container, target),
            _ => {
                warn!("Retrieve request without container or target");
                return Err(GatewayError::invalid_request(
                    "Container and target parameters are both required",
                ));
            }
        };
        let key = validate_target(target)?;

        let uri = self
            .registry
            .resolve(container)
            .get(&key)
            .await
            .map_err(|e| map_backend_error(Operation::Retrieve, container, target, e))?;

        let uri = self.uri_override.rewrite(uri).map_err(|e| {
            error!(error = %e, "Access URI could not be rewritten");
            GatewayError::Unexpected {
                message: Operation::Retrieve.unexpected_message(),
                source: Box::new(e),
            }
        })?;

        debug!(uri = %uri, "Access URI issued");
        Ok(uri)
    }

    /// Check that a file exists
    ///
    /// An absent file is [`GatewayError::NotFound`], the same outcome as
    /// retrieving it.
    #[instrument(skip_all, fields(container = %container, target = %target))]
    pub async fn exists(&self, container: Container, target: &str) -> Result<()> {
        debug!("Checking file existence");
        let key = validate_target(target)?;

        let found = self
            .registry
            .resolve(container)
            .exists(&key)
            .await
            .map_err(|e| map_backend_error(Operation::Exists, container, target, e))?;

        if found {
            Ok(())
        } else {
            debug!("File not found");
            Err(GatewayError::NotFound {
                container,
                target: target.to_string(),
            })
        }
    }

    /// Delete a file
    ///
    /// Deleting a missing file succeeds; the backend's refusal is only logged.
    #[instrument(skip_all, fields(container = %container, target = %target))]
    pub async fn delete(&self, container: Container, target: &str) -> Result<()> {
        info!("Deleting file");
        let key = validate_target(target)?;

        let deleted = self
            .registry
            .resolve(container)
            .delete(&key)
            .await
            .map_err(|e| map_backend_error(Operation::Delete, container, target, e))?;

        if deleted {
            debug!("File deleted");
        } else {
            error!("Backend did not delete file");
        }
        Ok(())
    }

    /// Probe every backend
    pub async fn health(&self) -> HealthReport {
        let probes = self.registry.iter().map(|(container, backend)| async move {
            let status = match backend.health().await {
                Ok(()) => BackendStatus::Up,
                Err(e) => {
                    warn!(container = %container, error = %e, "Backend health check failed");
                    BackendStatus::Down
                }
            };
            (container, status)
        });

        let statuses = futures::future::join_all(probes).await;
        HealthReport::from_statuses(statuses.into_iter().collect())
    }
}

fn validate_target(target: &str) -> Result<StorageKey> {
    StorageKey::parse(target).map_err(|reason| {
        warn!(reason = %reason, "Rejected target filename");
        GatewayError::invalid_target(target, reason)
    })
}

fn map_backend_error(
    op: Operation,
    container: Container,
    target: &str,
    err: StorageError,
) -> GatewayError {
    match err {
        StorageError::InvalidKey(reason) => {
            warn!(reason = %reason, "Backend rejected target filename");
            GatewayError::invalid_target(target, reason)
        }
        StorageError::NotFound(_) if matches!(op, Operation::Retrieve | Operation::Exists) => {
            info!("File not found");
            GatewayError::NotFound {
                container,
                target: target.to_string(),
            }
        }
        err if err.is_transfer() => {
            error!(operation = ?op, error = %err, "Backend transfer failed");
            GatewayError::Transfer {
                message: op.transfer_message(),
                source: err,
            }
        }
        err => {
            error!(operation = ?op, error = %err, "Backend operation failed");
            GatewayError::Unexpected {
                message: op.unexpected_message(),
                source: Box::new(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use filegate_storage::{byte_stream, FileBackend, InvalidKey, MockFileBackend};
    use rstest::rstest;
    use std::sync::Arc;

    /// Gateway whose `active` container is backed by `backend`; every other
    /// container gets a mock that panics on any call.
    fn gateway_with(active: Container, backend: MockFileBackend) -> FileGateway {
        gateway_with_override(active, backend, UriOverride::none())
    }

    fn gateway_with_override(
        active: Container,
        backend: MockFileBackend,
        uri_override: UriOverride,
    ) -> FileGateway {
        let mut backend = Some(backend);
        let registry = ContainerRegistry::try_from_fn(|container| {
            let mock = match backend.take() {
                Some(mock) if container == active => mock,
                other => {
                    backend = other;
                    MockFileBackend::new()
                }
            };
            Ok::<_, StorageError>(Arc::new(mock) as Arc<dyn FileBackend>)
        })
        .unwrap();
        FileGateway::new(registry, uri_override)
    }

    fn untouched() -> FileGateway {
        gateway_with(Container::Document, MockFileBackend::new())
    }

    fn body(data: &'static [u8]) -> ByteStream {
        byte_stream(futures::stream::iter(vec![Ok(Bytes::from_static(data))]))
    }

    #[rstest]
    #[case(Container::Dossier)]
    #[case(Container::Document)]
    #[case(Container::Export)]
    #[case(Container::Temporary)]
    #[tokio::test]
    async fn test_store_routes_to_container_and_hex_encodes(#[case] container: Container) {
        let mut backend = MockFileBackend::new();
        backend
            .expect_store()
            .withf(|_, key| key.as_str() == "this is valid")
            .times(1)
            .returning(|_, _| Ok("checksum".to_string()));

        let gateway = gateway_with(container, backend);
        let checksum = gateway.store(container, "this is valid", body(b"x")).await.unwrap();

        assert_eq!(checksum.to_hex(), "72179c92cba6");
    }

    #[test_log::test(tokio::test)]
    async fn test_store_md5_style_digest() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_store()
            .returning(|_, _| Ok("5EB63BBBE01EEED093CB22BB8F5ACDC3".to_string()));

        let gateway = gateway_with(Container::Document, backend);
        let checksum = gateway
            .store(Container::Document, "file1", body(b"x"))
            .await
            .unwrap();

        assert_eq!(
            checksum.to_hex(),
            "e4407adc1041134d441040f4f77081db6041f05e400830b7"
        );
    }

    #[rstest]
    #[case("")]
    #[case("../etc/passwd")]
    #[case("/absolute")]
    #[case("dir\\file")]
    #[tokio::test]
    async fn test_invalid_target_never_reaches_backend(#[case] target: &str) {
        let gateway = untouched();

        let err = gateway
            .store(Container::Document, target, body(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidTarget");

        let err = gateway
            .retrieve(Some(Container::Document), Some(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidTarget");

        let err = gateway.exists(Container::Document, target).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidTarget");

        let err = gateway.delete(Container::Document, target).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidTarget");
    }

    #[tokio::test]
    async fn test_store_transfer_failure() {
        let mut backend = MockFileBackend::new();
        backend.expect_store().returning(|_, _| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "client went away",
            )))
        });

        let gateway = gateway_with(Container::Export, backend);
        let err = gateway
            .store(Container::Export, "file1", body(b"x"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Transfer { .. }));
        assert_eq!(err.to_string(), "Cannot read data to store a new file");
    }

    #[tokio::test]
    async fn test_store_malformed_checksum_is_unexpected() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_store()
            .returning(|_, _| Ok("not base64!".to_string()));

        let gateway = gateway_with(Container::Document, backend);
        let err = gateway
            .store(Container::Document, "file1", body(b"x"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "UnexpectedError");
    }

    #[tokio::test]
    async fn test_backend_invalid_key_maps_to_invalid_target() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_exists()
            .returning(|_| Err(StorageError::InvalidKey(InvalidKey::TrailingDot)));

        let gateway = gateway_with(Container::Temporary, backend);
        let err = gateway.exists(Container::Temporary, "file1").await.unwrap_err();

        assert_eq!(err.kind(), "InvalidTarget");
    }

    #[rstest]
    #[case(None, Some("file1"))]
    #[case(Some(Container::Document), None)]
    #[case(None, None)]
    #[tokio::test]
    async fn test_retrieve_missing_parameters(
        #[case] container: Option<Container>,
        #[case] target: Option<&str>,
    ) {
        let err = untouched().retrieve(container, target).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_retrieve_returns_backend_uri() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_get()
            .withf(|key| key.as_str() == "file1")
            .returning(|_| Ok(Url::parse("http://originalhost:1234/thefile?query=abc").unwrap()));

        let gateway = gateway_with(Container::Document, backend);
        let uri = gateway
            .retrieve(Some(Container::Document), Some("file1"))
            .await
            .unwrap();

        assert_eq!(uri.as_str(), "http://originalhost:1234/thefile?query=abc");
    }

    #[tokio::test]
    async fn test_retrieve_applies_override() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_get()
            .returning(|_| Ok(Url::parse("http://originalhost:1234/thefile?query=abc").unwrap()));

        let uri_override = UriOverride::new(Some("newhost".into()), Some(5678)).unwrap();
        let gateway = gateway_with_override(Container::Dossier, backend, uri_override);
        let uri = gateway
            .retrieve(Some(Container::Dossier), Some("file1"))
            .await
            .unwrap();

        assert_eq!(uri.as_str(), "http://newhost:5678/thefile?query=abc");
    }

    #[tokio::test]
    async fn test_retrieve_not_found() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_get()
            .returning(|key| Err(StorageError::NotFound(key.to_string())));

        let gateway = gateway_with(Container::Document, backend);
        let err = gateway
            .retrieve(Some(Container::Document), Some("file1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::NotFound { container: Container::Document, ref target } if target == "file1"
        ));
    }

    #[tokio::test]
    async fn test_retrieve_transfer_failure() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(StorageError::Connection("refused".into())));

        let gateway = gateway_with(Container::Document, backend);
        let err = gateway
            .retrieve(Some(Container::Document), Some("file1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "TransferError");
        assert_eq!(err.to_string(), "Unable to retrieve file");
    }

    #[tokio::test]
    async fn test_exists_present() {
        let mut backend = MockFileBackend::new();
        backend.expect_exists().times(1).returning(|_| Ok(true));

        let gateway = gateway_with(Container::Dossier, backend);
        gateway.exists(Container::Dossier, "file1").await.unwrap();
    }

    #[tokio::test]
    async fn test_exists_absent_is_not_found() {
        let mut backend = MockFileBackend::new();
        backend.expect_exists().times(1).returning(|_| Ok(false));

        let gateway = gateway_with(Container::Dossier, backend);
        let err = gateway.exists(Container::Dossier, "file1").await.unwrap_err();

        assert!(matches!(
            err,
            GatewayError::NotFound { container: Container::Dossier, ref target } if target == "file1"
        ));
    }

    #[tokio::test]
    async fn test_exists_connection_failure_is_transfer() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_exists()
            .returning(|_| Err(StorageError::Connection("connection reset".into())));

        let gateway = gateway_with(Container::Dossier, backend);
        let err = gateway.exists(Container::Dossier, "file1").await.unwrap_err();
        assert_eq!(err.kind(), "TransferError");
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn test_delete_succeeds_regardless_of_backend_answer(#[case] deleted: bool) {
        let mut backend = MockFileBackend::new();
        backend
            .expect_delete()
            .withf(|key| key.as_str() == "file1")
            .times(1)
            .returning(move |_| Ok(deleted));

        let gateway = gateway_with(Container::Temporary, backend);
        gateway.delete(Container::Temporary, "file1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_backend_failure_is_unexpected() {
        let mut backend = MockFileBackend::new();
        backend
            .expect_delete()
            .returning(|_| Err(StorageError::Backend("AccessDenied".into())));

        let gateway = gateway_with(Container::Temporary, backend);
        let err = gateway.delete(Container::Temporary, "file1").await.unwrap_err();

        assert_eq!(err.kind(), "UnexpectedError");
        assert!(!err.to_string().contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_delete_io_failure_is_transfer() {
        let mut backend = MockFileBackend::new();
        backend.expect_delete().returning(|_| {
            Err(StorageError::Io(std::io::Error::other("disk /var/lib/blobs is read-only")))
        });

        let gateway = gateway_with(Container::Dossier, backend);
        let err = gateway.delete(Container::Dossier, "file1").await.unwrap_err();

        assert_eq!(err.kind(), "TransferError");
        assert_eq!(err.to_string(), "Unable to delete file");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_health_reports_each_container() {
        let mut backends = Container::ALL.map(|container| {
            let mut mock = MockFileBackend::new();
            if container == Container::Export {
                mock.expect_health()
                    .returning(|| Err(StorageError::Connection("refused".into())));
            } else {
                mock.expect_health().returning(|| Ok(()));
            }
            Some(mock)
        });

        let registry = ContainerRegistry::try_from_fn(|container| {
            let index = Container::ALL.iter().position(|c| *c == container).unwrap();
            let mock = backends[index].take().unwrap();
            Ok::<_, StorageError>(Arc::new(mock) as Arc<dyn FileBackend>)
        })
        .unwrap();

        let report = FileGateway::new(registry, UriOverride::none()).health().await;

        assert!(!report.is_healthy());
        assert_eq!(report.containers[&Container::Export], BackendStatus::Down);
        assert_eq!(report.containers[&Container::Dossier], BackendStatus::Up);
        assert_eq!(report.containers.len(), 4);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "DOWN");
        assert_eq!(json["containers"]["EXPORT"], "DOWN");
        assert_eq!(json["containers"]["TEMPORARY"], "UP");
    }
}
