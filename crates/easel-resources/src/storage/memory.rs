use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{StorageKind, StoragePlugin};
use crate::{Resource, ResourceItem, ResourceItemIterator, ResourceType, StorageError};

#[derive(Debug, Clone)]
enum Content {
    Bytes(Arc<[u8]>),
    Unreadable(String),
}

#[derive(Debug, Clone)]
struct Stored {
    item: ResourceItem,
    content: Content,
}

/// Storage held entirely in memory. Used for fixtures and embedded assets.
#[derive(Debug)]
pub struct MemoryStorage {
    location: String,
    entries: RwLock<BTreeMap<String, Stored>>,
}

impl MemoryStorage {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Stores `data` under `url`, bumping the version when replacing.
    pub fn insert(
        &self,
        url: impl Into<String>,
        resource_type: ResourceType,
        data: impl Into<Vec<u8>>,
    ) -> ResourceItem {
        self.store(url.into(), resource_type, Content::Bytes(data.into().into()))
    }

    /// Registers an item whose content fails to load with `reason`.
    pub fn insert_unreadable(
        &self,
        url: impl Into<String>,
        resource_type: ResourceType,
        reason: impl Into<String>,
    ) -> ResourceItem {
        self.store(url.into(), resource_type, Content::Unreadable(reason.into()))
    }

    fn store(&self, url: String, resource_type: ResourceType, content: Content) -> ResourceItem {
        let mut entries = self.entries.write();
        let version = entries.get(&url).map_or(1, |stored| stored.item.version + 1);
        let item = ResourceItem::new(url.clone(), resource_type, self.location.clone())
            .with_version(version);
        entries.insert(
            url,
            Stored {
                item: item.clone(),
                content,
            },
        );
        item
    }

    pub fn remove(&self, url: &str) -> Option<ResourceItem> {
        self.entries.write().remove(url).map(|stored| stored.item)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StoragePlugin for MemoryStorage {
    fn location(&self) -> &str {
        &self.location
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    fn resource_item(&self, url: &str) -> Option<ResourceItem> {
        self.entries.read().get(url).map(|stored| stored.item.clone())
    }

    fn resource_items(&self, resource_type: &ResourceType) -> ResourceItemIterator {
        self.entries
            .read()
            .values()
            .filter(|stored| &stored.item.resource_type == resource_type)
            .map(|stored| stored.item.clone())
            .collect()
    }

    fn resource(&self, url: &str) -> Result<Option<Resource>, StorageError> {
        let entries = self.entries.read();
        let Some(stored) = entries.get(url) else {
            return Ok(None);
        };
        match &stored.content {
            Content::Bytes(bytes) => Ok(Some(Resource::new(stored.item.clone(), Arc::clone(bytes)))),
            Content::Unreadable(reason) => Err(StorageError::corrupt(url, reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::SkipReason;

    #[test]
    fn replacing_bumps_version() {
        let storage = MemoryStorage::new("memory://fixtures");
        let first = storage.insert("a.cfg", ResourceType::FilterConfig, "one");
        let second = storage.insert("a.cfg", ResourceType::FilterConfig, "two");
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(storage.resource_item("a.cfg"), Some(second));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn iteration_skips_unreadable_items() {
        let storage = MemoryStorage::new("memory://fixtures");
        storage.insert("a.cfg", ResourceType::FilterConfig, "{}");
        storage.insert_unreadable("b.cfg", ResourceType::FilterConfig, "bad sector");
        storage.insert("c.cfg", ResourceType::FilterConfig, "{}");

        let mut resources = storage.resources(&ResourceType::FilterConfig);
        let urls: Vec<_> = resources.by_ref().map(|r| r.item.url).collect();
        assert_eq!(urls, vec!["a.cfg", "c.cfg"]);
        let skipped = resources.into_skipped();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].url, "b.cfg");
        assert!(matches!(&skipped[0].reason, SkipReason::Unreadable(err) if err.is_corrupt()));
    }

    #[test]
    fn trait_objects_iterate_too() {
        let storage: Arc<dyn StoragePlugin> = Arc::new(MemoryStorage::new("memory://dyn"));
        assert_eq!(storage.resources(&ResourceType::Palette).count(), 0);
        assert!(storage.resource("missing.gpl").unwrap().is_none());
    }
}
