use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::{BundleStorage, DirectoryStorage, MemoryStorage, StorageKind, StoragePlugin};
use crate::StorageError;

/// Constructs storages of one kind from a location string.
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> StorageKind;

    fn open(&self, location: &str) -> Result<Arc<dyn StoragePlugin>, StorageError>;
}

struct DirectoryBackend;

impl StorageBackend for DirectoryBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Directory
    }

    fn open(&self, location: &str) -> Result<Arc<dyn StoragePlugin>, StorageError> {
        Ok(Arc::new(DirectoryStorage::open(location)?))
    }
}

struct BundleBackend;

impl StorageBackend for BundleBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Bundle
    }

    fn open(&self, location: &str) -> Result<Arc<dyn StoragePlugin>, StorageError> {
        Ok(Arc::new(BundleStorage::open(location)?))
    }
}

struct MemoryBackend;

impl StorageBackend for MemoryBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    fn open(&self, location: &str) -> Result<Arc<dyn StoragePlugin>, StorageError> {
        Ok(Arc::new(MemoryStorage::new(location)))
    }
}

/// Maps storage kinds to the backends able to open them.
#[derive(Default)]
pub struct StorageFactory {
    backends: HashMap<StorageKind, Box<dyn StorageBackend>>,
}

impl StorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the directory, bundle and memory backends registered.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory
            .register(DirectoryBackend)
            .register(BundleBackend)
            .register(MemoryBackend);
        factory
    }

    /// Registers `backend`, replacing any backend of the same kind.
    pub fn register(&mut self, backend: impl StorageBackend + 'static) -> &mut Self {
        self.backends.insert(backend.kind(), Box::new(backend));
        self
    }

    pub fn supports(&self, kind: StorageKind) -> bool {
        self.backends.contains_key(&kind)
    }

    pub fn open(
        &self,
        kind: StorageKind,
        location: &str,
    ) -> Result<Arc<dyn StoragePlugin>, StorageError> {
        let backend = self
            .backends
            .get(&kind)
            .ok_or(StorageError::UnsupportedKind(kind))?;
        let storage = backend.open(location)?;
        log::debug!("opened {} storage at {}", kind, storage.location());
        Ok(storage)
    }

    /// Opens `path` with the backend its shape suggests.
    pub fn open_path(&self, path: &Path) -> Result<Arc<dyn StoragePlugin>, StorageError> {
        let location = path.display().to_string();
        let kind = StorageKind::detect(path).ok_or(StorageError::UnknownLocation(location.clone()))?;
        self.open(kind, &location)
    }
}

impl std::fmt::Debug for StorageFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.backends.keys().map(|kind| kind.label()).collect();
        kinds.sort_unstable();
        f.debug_struct("StorageFactory").field("backends", &kinds).finish()
    }
}
