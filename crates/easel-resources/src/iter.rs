//! Iteration over storage contents.
//!
//! [`ResourceItemIterator`] owns a snapshot of item metadata taken when the
//! storage created it. [`ResourceIterator`] walks such a snapshot and loads
//! each item on demand, skipping items whose content cannot be read.

use std::iter::FusedIterator;

use crate::{Resource, ResourceItem, StorageError, StoragePlugin};

#[derive(Debug, Default)]
pub struct ResourceItemIterator {
    items: std::vec::IntoIter<ResourceItem>,
}

impl ResourceItemIterator {
    pub fn new(items: Vec<ResourceItem>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Iterator for ResourceItemIterator {
    type Item = ResourceItem;

    fn next(&mut self) -> Option<ResourceItem> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for ResourceItemIterator {}

impl FusedIterator for ResourceItemIterator {}

impl FromIterator<ResourceItem> for ResourceItemIterator {
    fn from_iter<I: IntoIterator<Item = ResourceItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug)]
pub enum SkipReason {
    /// The item disappeared from the storage after the snapshot was taken.
    Vanished,
    Unreadable(StorageError),
}

#[derive(Debug)]
pub struct SkippedResource {
    pub url: String,
    pub reason: SkipReason,
}

/// Loads resources lazily from a storage, one item per call to `next`.
pub struct ResourceIterator<'a, S: StoragePlugin + ?Sized = dyn StoragePlugin> {
    storage: &'a S,
    items: ResourceItemIterator,
    skipped: Vec<SkippedResource>,
}

impl<'a, S: StoragePlugin + ?Sized> ResourceIterator<'a, S> {
    pub fn new(storage: &'a S, items: ResourceItemIterator) -> Self {
        Self {
            storage,
            items,
            skipped: Vec::new(),
        }
    }

    /// Items skipped so far.
    pub fn skipped(&self) -> &[SkippedResource] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedResource> {
        self.skipped
    }
}

impl<S: StoragePlugin + ?Sized> Iterator for ResourceIterator<'_, S> {
    type Item = Resource;

    fn next(&mut self) -> Option<Resource> {
        loop {
            let item = self.items.next()?;
            match self.storage.resource(&item.url) {
                Ok(Some(resource)) => return Some(resource),
                Ok(None) => {
                    log::debug!(
                        "{} vanished from {} while iterating",
                        item.url,
                        self.storage.location()
                    );
                    self.skipped.push(SkippedResource {
                        url: item.url,
                        reason: SkipReason::Vanished,
                    });
                }
                Err(err) => {
                    log::warn!("skipping {}: {}", item.url, err);
                    self.skipped.push(SkippedResource {
                        url: item.url,
                        reason: SkipReason::Unreadable(err),
                    });
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.items.len()))
    }
}

impl<S: StoragePlugin + ?Sized> FusedIterator for ResourceIterator<'_, S> {}
