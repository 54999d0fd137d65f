//! Container to backend bindings

use crate::container::Container;
use filegate_storage::FileBackend;
use std::future::Future;
use std::sync::Arc;

/// Shared handle to a backend
pub type SharedBackend = Arc<dyn FileBackend>;

/// One backend per container, fixed for the life of the process
///
/// Every container has a field, so resolution can never miss.
#[derive(Clone)]
pub struct ContainerRegistry {
    dossier: SharedBackend,
    document: SharedBackend,
    export: SharedBackend,
    temporary: SharedBackend,
}

impl ContainerRegistry {
    /// Bind each container explicitly
    pub fn new(
        dossier: SharedBackend,
        document: SharedBackend,
        export: SharedBackend,
        temporary: SharedBackend,
    ) -> Self {
        Self {
            dossier,
            document,
            export,
            temporary,
        }
    }

    /// Build every binding with a synchronous constructor
    pub fn try_from_fn<F, E>(mut init: F) -> Result<Self, E>
    where
        F: FnMut(Container) -> Result<SharedBackend, E>,
    {
        Ok(Self::new(
            init(Container::Dossier)?,
            init(Container::Document)?,
            init(Container::Export)?,
            init(Container::Temporary)?,
        ))
    }

    /// Build every binding with an async constructor, stopping at the first failure
    pub async fn connect<F, Fut, E>(mut init: F) -> Result<Self, E>
    where
        F: FnMut(Container) -> Fut,
        Fut: Future<Output = Result<SharedBackend, E>>,
    {
        Ok(Self::new(
            init(Container::Dossier).await?,
            init(Container::Document).await?,
            init(Container::Export).await?,
            init(Container::Temporary).await?,
        ))
    }

    /// Backend bound to a container
    pub fn resolve(&self, container: Container) -> &dyn FileBackend {
        match container {
            Container::Dossier => self.dossier.as_ref(),
            Container::Document => self.document.as_ref(),
            Container::Export => self.export.as_ref(),
            Container::Temporary => self.temporary.as_ref(),
        }
    }

    /// Every binding, in container order
    pub fn iter(&self) -> impl Iterator<Item = (Container, &dyn FileBackend)> + '_ {
        Container::ALL
            .into_iter()
            .map(move |container| (container, self.resolve(container)))
    }
}

impl std::fmt::Debug for ContainerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(Container::ALL.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filegate_storage::{MemoryBackend, StorageError};
    use std::time::Duration;

    fn memory(container: Container) -> SharedBackend {
        let base = format!("http://localhost:8090/blobs/{}", container.as_str().to_lowercase());
        Arc::new(MemoryBackend::new(base.parse().unwrap(), Duration::from_secs(60)).unwrap())
    }

    #[tokio::test]
    async fn test_resolve_is_per_container() {
        let registry = ContainerRegistry::try_from_fn(|c| Ok::<_, StorageError>(memory(c))).unwrap();
        let key = "file1".parse().unwrap();
        let body = futures::stream::iter(vec![Ok(bytes::Bytes::from_static(b"x"))]);

        registry
            .resolve(Container::Document)
            .store(filegate_storage::byte_stream(body), &key)
            .await
            .unwrap();

        for (container, backend) in registry.iter() {
            let expected = container == Container::Document;
            assert_eq!(backend.exists(&key).await.unwrap(), expected, "{container}");
        }
    }

    #[test]
    fn test_try_from_fn_stops_at_first_failure() {
        let mut seen = Vec::new();
        let result = ContainerRegistry::try_from_fn(|c| {
            seen.push(c);
            if c == Container::Export {
                Err(StorageError::Configuration("missing bucket".into()))
            } else {
                Ok(memory(c))
            }
        });

        assert!(matches!(result, Err(StorageError::Configuration(_))));
        assert_eq!(seen, vec![Container::Dossier, Container::Document, Container::Export]);
    }

    #[tokio::test]
    async fn test_connect() {
        let registry = ContainerRegistry::connect(|c| async move { Ok::<_, StorageError>(memory(c)) })
            .await
            .unwrap();
        assert_eq!(registry.iter().count(), 4);
    }
}
