use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use walkdir::WalkDir;

use super::{StorageKind, StoragePlugin};
use crate::{Resource, ResourceItem, ResourceItemIterator, ResourceType, StorageError};

pub const DEFAULT_MAX_DEPTH: usize = 4;

const CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

#[derive(Debug, Clone)]
struct IndexedFile {
    item: ResourceItem,
    path: PathBuf,
    fingerprint: Fingerprint,
}

#[derive(Debug)]
struct CachedContent {
    version: u64,
    payload: Arc<[u8]>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanSummary {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
}

/// Resources stored as plain files below a root directory.
///
/// Files are classified by extension. Urls are paths relative to the root
/// with `/` separators.
#[derive(Debug)]
pub struct DirectoryStorage {
    root: PathBuf,
    location: String,
    max_depth: usize,
    index: RwLock<BTreeMap<String, IndexedFile>>,
    cache: Mutex<HashMap<String, CachedContent>>,
    rescanning: Mutex<()>,
}

impl DirectoryStorage {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::with_max_depth(root, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(root: impl Into<PathBuf>, max_depth: usize) -> Result<Self, StorageError> {
        let root = root.into();
        let location = root.display().to_string();
        if !root.is_dir() {
            return Err(StorageError::unavailable(location, "not a directory"));
        }
        let index = scan_index(&root, max_depth, &location, &BTreeMap::new());
        log::debug!("indexed {} files below {}", index.len(), location);
        Ok(Self {
            root,
            location,
            max_depth,
            index: RwLock::new(index),
            cache: Mutex::new(HashMap::new()),
            rescanning: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Re-reads the directory tree.
    ///
    /// Changed files get their version bumped and any cached content for
    /// them is dropped, so metadata and loaded content stay in step. Readers
    /// keep the old index during the walk; the new one is swapped in whole.
    pub fn rescan(&self) -> Result<RescanSummary, StorageError> {
        self.check()?;
        // one walk at a time so versions are always derived from the latest index
        let _rescanning = self.rescanning.lock();
        let previous = self.index.read().clone();
        let fresh = scan_index(&self.root, self.max_depth, &self.location, &previous);

        let mut summary = RescanSummary::default();
        for (url, file) in &fresh {
            match previous.get(url) {
                None => summary.added += 1,
                Some(known) if known.item.version != file.item.version => summary.changed += 1,
                Some(_) => {}
            }
        }
        summary.removed = previous.keys().filter(|url| !fresh.contains_key(*url)).count();

        let mut cache = self.cache.lock();
        cache.retain(|url, cached| {
            fresh
                .get(url)
                .map_or(false, |file| file.item.version == cached.version)
        });
        *self.index.write() = fresh;
        Ok(summary)
    }

    fn read(&self, file: &IndexedFile) -> Result<Arc<[u8]>, StorageError> {
        let url = &file.item.url;
        if let Some(cached) = self.cache.lock().get(url) {
            if cached.version == file.item.version {
                return Ok(Arc::clone(&cached.payload));
            }
        }
        let payload: Arc<[u8]> = fs::read(&file.path)
            .map_err(|err| StorageError::corrupt(url.clone(), err))?
            .into();
        let mut cache = self.cache.lock();
        if cache.len() < CACHE_CAPACITY || cache.contains_key(url) {
            cache.insert(
                url.clone(),
                CachedContent {
                    version: file.item.version,
                    payload: Arc::clone(&payload),
                },
            );
        }
        Ok(payload)
    }
}

impl StoragePlugin for DirectoryStorage {
    fn location(&self) -> &str {
        &self.location
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Directory
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(StorageError::unavailable(
                self.location.clone(),
                "directory no longer exists",
            ))
        }
    }

    fn resource_item(&self, url: &str) -> Option<ResourceItem> {
        self.index.read().get(url).map(|file| file.item.clone())
    }

    fn resource_items(&self, resource_type: &ResourceType) -> ResourceItemIterator {
        self.index
            .read()
            .values()
            .filter(|file| &file.item.resource_type == resource_type)
            .map(|file| file.item.clone())
            .collect()
    }

    fn resource(&self, url: &str) -> Result<Option<Resource>, StorageError> {
        let Some(file) = self.index.read().get(url).cloned() else {
            return Ok(None);
        };
        let payload = self.read(&file)?;
        Ok(Some(Resource::new(file.item, payload)))
    }
}

fn scan_index(
    root: &Path,
    max_depth: usize,
    location: &str,
    previous: &BTreeMap<String, IndexedFile>,
) -> BTreeMap<String, IndexedFile> {
    let mut index = BTreeMap::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(io) = err.io_error() {
                    log::debug!("skipping entry while scanning {}: {}", root.display(), io);
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(url) = relative_url(root, entry.path()) else {
            continue;
        };
        let Some(resource_type) = ResourceType::classify(&url) else {
            continue;
        };
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::debug!("skipping {}: {}", entry.path().display(), err);
                continue;
            }
        };
        let modified = metadata.modified().ok();
        let fingerprint = Fingerprint {
            len: metadata.len(),
            modified,
        };
        let version = match previous.get(&url) {
            Some(known) if known.fingerprint == fingerprint => known.item.version,
            Some(known) => known.item.version + 1,
            None => 1,
        };
        let mut item = ResourceItem::new(url.clone(), resource_type, location).with_version(version);
        item.modified = modified.map(DateTime::<Utc>::from);
        index.insert(
            url,
            IndexedFile {
                item,
                path: entry.into_path(),
                fingerprint,
            },
        );
    }
    index
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map_or(false, |name| name.starts_with('.'))
}

fn relative_url(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    Some(segments?.join("/"))
}
