use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::{StorageKind, StoragePlugin};
use crate::{Resource, ResourceItem, ResourceItemIterator, ResourceType, StorageError};

const META_PREFIX: &str = "META-INF/";

#[derive(Debug, Clone)]
struct BundleEntry {
    item: ResourceItem,
    index: usize,
}

/// Read-only view over a zip bundle of resources.
///
/// The archive is indexed once on open. Bundles are immutable, so every
/// item stays at version 1.
pub struct BundleStorage {
    path: PathBuf,
    location: String,
    archive: Mutex<ZipArchive<File>>,
    entries: BTreeMap<String, BundleEntry>,
}

impl std::fmt::Debug for BundleStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleStorage")
            .field("location", &self.location)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl BundleStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let location = path.display().to_string();
        let file = File::open(&path).map_err(|err| StorageError::unavailable(&location, err))?;
        let mut archive =
            ZipArchive::new(file).map_err(|err| StorageError::unavailable(&location, err))?;

        let mut entries = BTreeMap::new();
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|err| StorageError::unavailable(&location, err))?;
            if file.is_dir() || file.name().starts_with(META_PREFIX) {
                continue;
            }
            let url = file.name().trim_start_matches('/').to_owned();
            let Some(resource_type) = ResourceType::classify(&url) else {
                continue;
            };
            let item = ResourceItem::new(url.clone(), resource_type, location.clone());
            entries.insert(url, BundleEntry { item, index });
        }
        log::debug!("bundle {} holds {} resources", location, entries.len());

        Ok(Self {
            path,
            location,
            archive: Mutex::new(archive),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StoragePlugin for BundleStorage {
    fn location(&self) -> &str {
        &self.location
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Bundle
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(StorageError::unavailable(
                self.location.clone(),
                "bundle file no longer exists",
            ))
        }
    }

    fn resource_item(&self, url: &str) -> Option<ResourceItem> {
        self.entries.get(url).map(|entry| entry.item.clone())
    }

    fn resource_items(&self, resource_type: &ResourceType) -> ResourceItemIterator {
        self.entries
            .values()
            .filter(|entry| &entry.item.resource_type == resource_type)
            .map(|entry| entry.item.clone())
            .collect()
    }

    fn resource(&self, url: &str) -> Result<Option<Resource>, StorageError> {
        let Some(entry) = self.entries.get(url) else {
            return Ok(None);
        };
        let mut archive = self.archive.lock();
        let mut file = archive
            .by_index(entry.index)
            .map_err(|err| StorageError::corrupt(url, err))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .map_err(|err| StorageError::corrupt(url, err))?;
        Ok(Some(Resource::new(entry.item.clone(), data.into())))
    }
}

/// Writes resource bundles readable by [`BundleStorage`].
#[derive(Debug, Default)]
pub struct BundleBuilder {
    files: BTreeMap<String, Vec<u8>>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.into(), data.into());
        self
    }

    pub fn build(self) -> zip::result::ZipResult<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (url, data) in &self.files {
            zip.start_file(url.as_str(), options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    pub fn write_to(self, path: impl AsRef<Path>) -> zip::result::ZipResult<()> {
        let bytes = self.build()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn bundle_lists_and_loads_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.bundle");
        BundleBuilder::new()
            .add("filters/blur.cfg", b"{\"format\": 1}".to_vec())
            .add("brushes/pencil.myb", b"{}".to_vec())
            .add("META-INF/manifest.xml", b"<manifest/>".to_vec())
            .write_to(&path)
            .unwrap();

        let storage = BundleStorage::open(&path).unwrap();
        assert_eq!(storage.len(), 2);
        let items: Vec<_> = storage
            .resource_items(&ResourceType::FilterConfig)
            .collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "filters/blur.cfg");
        assert_eq!(items[0].version, 1);
        assert_eq!(items[0].storage_location, storage.location());

        let resource = storage.resource("filters/blur.cfg").unwrap().unwrap();
        assert_eq!(resource.bytes(), b"{\"format\": 1}");
        assert!(storage.resource("filters/none.cfg").unwrap().is_none());
    }

    #[test]
    fn garbage_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.bundle");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(BundleStorage::open(&path).unwrap_err().is_unavailable());
    }

    #[test]
    fn resources_iterates_loaded_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("palettes.zip");
        BundleBuilder::new()
            .add("palettes/a.gpl", b"GIMP Palette\n".to_vec())
            .add("palettes/b.gpl", b"GIMP Palette\n".to_vec())
            .write_to(&path)
            .unwrap();
        let storage = BundleStorage::open(&path).unwrap();
        let urls: Vec<_> = storage
            .resources(&ResourceType::Palette)
            .map(|resource| resource.item.url)
            .collect();
        assert_eq!(urls, vec!["palettes/a.gpl", "palettes/b.gpl"]);
    }
}
