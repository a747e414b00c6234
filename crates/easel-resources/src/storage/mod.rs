//! Storage plugins: one uniform contract over directories, bundles and
//! in-memory fixtures.

mod bundle;
mod directory;
mod factory;
mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Resource, ResourceItem, ResourceItemIterator, ResourceIterator, ResourceType, StorageError};

pub use bundle::{BundleBuilder, BundleStorage};
pub use directory::{DirectoryStorage, RescanSummary, DEFAULT_MAX_DEPTH};
pub use factory::{StorageBackend, StorageFactory};
pub use memory::MemoryStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Directory,
    Bundle,
    Memory,
}

impl StorageKind {
    pub fn label(self) -> &'static str {
        match self {
            StorageKind::Directory => "directory",
            StorageKind::Bundle => "bundle",
            StorageKind::Memory => "memory",
        }
    }

    /// Picks the backend able to open `path`, if any.
    pub fn detect(path: &std::path::Path) -> Option<Self> {
        if path.is_dir() {
            return Some(StorageKind::Directory);
        }
        if path.is_file() {
            let ext = path.extension()?.to_str()?.to_ascii_lowercase();
            if ext == "bundle" || ext == "zip" {
                return Some(StorageKind::Bundle);
            }
        }
        None
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Backend adapter exposing one storage location.
///
/// Implementations are read-only against their medium during normal
/// operation. Unknown urls are reported as `None`; known items whose
/// content cannot be read are reported as [`StorageError::Corrupt`].
pub trait StoragePlugin: fmt::Debug + Send + Sync {
    /// Location this storage was constructed with. Never changes.
    fn location(&self) -> &str;

    fn kind(&self) -> StorageKind;

    /// Reports whether the underlying medium can still be read.
    fn check(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn resource_item(&self, url: &str) -> Option<ResourceItem>;

    fn resource_items(&self, resource_type: &ResourceType) -> ResourceItemIterator;

    fn resource(&self, url: &str) -> Result<Option<Resource>, StorageError>;

    fn resources(&self, resource_type: &ResourceType) -> ResourceIterator<'_, Self>
    where
        Self: Sized,
    {
        ResourceIterator::new(self, self.resource_items(resource_type))
    }
}

impl<'s> dyn StoragePlugin + 's {
    pub fn resources(
        &self,
        resource_type: &ResourceType,
    ) -> ResourceIterator<'_, dyn StoragePlugin + 's> {
        ResourceIterator::new(self, self.resource_items(resource_type))
    }
}
