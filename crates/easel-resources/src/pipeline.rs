use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use easel_config::CodecError;
use serde::Serialize;
use thiserror::Error;

use crate::adapters::{
    ConfigurationAdapter, MyPaintAdapter, PaletteAdapter, PresetAdapter, PresetDraft,
};
use crate::{
    Blacklist, Preset, PresetId, RegistryError, Resource, ResourceItemIterator, ResourceIterator,
    ResourceRegistry, ResourceType, SkipReason, StorageError, StoragePlugin,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// First population of the registry. Registered identities are kept.
    Initial,
    /// Reload after storage changes. Registered identities are replaced.
    Rescan,
}

impl LoadMode {
    fn allow_overwrite(self) -> bool {
        matches!(self, LoadMode::Rescan)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid configuration: {0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Adapter(String),
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Serialize)]
pub struct LoadFailure {
    pub name: String,
    pub url: String,
    pub location: String,
    #[serde(serialize_with = "as_display")]
    pub error: LoadError,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSkipped {
    pub id: PresetId,
    pub location: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UnavailableStorage {
    pub location: String,
    #[serde(serialize_with = "as_display")]
    pub error: StorageError,
}

fn as_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Outcome of one pipeline run: what was published and what was not.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<PresetId>,
    pub failures: Vec<LoadFailure>,
    pub skipped: Vec<DuplicateSkipped>,
    pub unavailable: Vec<UnavailableStorage>,
    pub blacklisted: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unavailable.is_empty()
    }

    pub fn failure_names(&self) -> Vec<&str> {
        self.failures.iter().map(|failure| failure.name.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} loaded, {} failed, {} duplicates skipped, {} blacklisted, {} storages unavailable",
            self.loaded.len(),
            self.failures.len(),
            self.skipped.len(),
            self.blacklisted.len(),
            self.unavailable.len()
        )
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.loaded.extend(other.loaded);
        self.failures.extend(other.failures);
        self.skipped.extend(other.skipped);
        self.unavailable.extend(other.unavailable);
        self.blacklisted.extend(other.blacklisted);
    }
}

/// Pulls resources out of storages, decodes them and publishes presets.
pub struct LoadingPipeline {
    registry: Arc<ResourceRegistry>,
    adapters: Vec<Box<dyn PresetAdapter>>,
    blacklist: Option<Arc<Blacklist>>,
}

impl LoadingPipeline {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            registry,
            adapters: Vec::new(),
            blacklist: None,
        }
    }

    /// Pipeline with adapters for filters, paint-op presets, MyPaint brushes
    /// and palettes.
    pub fn with_default_adapters(registry: Arc<ResourceRegistry>) -> Self {
        Self::new(registry)
            .with_adapter(ConfigurationAdapter::filters())
            .with_adapter(ConfigurationAdapter::paintop_presets())
            .with_adapter(MyPaintAdapter)
            .with_adapter(PaletteAdapter)
    }

    pub fn with_adapter(mut self, adapter: impl PresetAdapter + 'static) -> Self {
        self.register_adapter(adapter);
        self
    }

    /// Registers `adapter`, replacing any adapter for the same type.
    pub fn register_adapter(&mut self, adapter: impl PresetAdapter + 'static) {
        let resource_type = adapter.resource_type();
        self.adapters
            .retain(|existing| existing.resource_type() != resource_type);
        self.adapters.push(Box::new(adapter));
    }

    pub fn with_blacklist(mut self, blacklist: Arc<Blacklist>) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn resource_types(&self) -> Vec<ResourceType> {
        self.adapters
            .iter()
            .map(|adapter| adapter.resource_type())
            .collect()
    }

    /// Loads every type that has an adapter from `storages`, in order.
    pub fn run(&self, storages: &[Arc<dyn StoragePlugin>], mode: LoadMode) -> LoadReport {
        let adapters: Vec<&dyn PresetAdapter> =
            self.adapters.iter().map(|adapter| adapter.as_ref()).collect();
        self.run_adapters(storages, &adapters, mode)
    }

    /// Loads one resource type. Types without an adapter load nothing.
    pub fn run_type(
        &self,
        storages: &[Arc<dyn StoragePlugin>],
        resource_type: &ResourceType,
        mode: LoadMode,
    ) -> LoadReport {
        self.run_types(storages, std::slice::from_ref(resource_type), mode)
    }

    /// Loads `types` in the given order as a single run, so an identity
    /// claimed by an earlier type is not replaced by a later one.
    pub fn run_types(
        &self,
        storages: &[Arc<dyn StoragePlugin>],
        types: &[ResourceType],
        mode: LoadMode,
    ) -> LoadReport {
        let mut adapters: Vec<&dyn PresetAdapter> = Vec::new();
        for resource_type in types {
            match self
                .adapters
                .iter()
                .find(|adapter| &adapter.resource_type() == resource_type)
            {
                Some(adapter) => adapters.push(adapter.as_ref()),
                None => log::debug!("no adapter registered for {}", resource_type),
            }
        }
        if adapters.is_empty() {
            return LoadReport::default();
        }
        self.run_adapters(storages, &adapters, mode)
    }

    fn run_adapters(
        &self,
        storages: &[Arc<dyn StoragePlugin>],
        adapters: &[&dyn PresetAdapter],
        mode: LoadMode,
    ) -> LoadReport {
        let available = self.available(storages);
        let mut report = LoadReport {
            unavailable: available.unavailable,
            ..LoadReport::default()
        };
        // identities are claimed across every type of the run
        let mut claimed = HashSet::new();
        for &adapter in adapters {
            self.load_type(&available.storages, adapter, mode, &mut claimed, &mut report);
        }
        self.finish(&report);
        report
    }

    /// Runs the pipeline on a dedicated worker thread.
    pub fn run_in_background(
        self: Arc<Self>,
        storages: Vec<Arc<dyn StoragePlugin>>,
        mode: LoadMode,
    ) -> io::Result<JoinHandle<LoadReport>> {
        thread::Builder::new()
            .name("easel-resource-loader".into())
            .spawn(move || self.run(&storages, mode))
    }

    fn available<'s>(&self, storages: &'s [Arc<dyn StoragePlugin>]) -> Available<'s> {
        let mut available = Available::default();
        for storage in storages {
            match storage.check() {
                Ok(()) => available.storages.push(storage.as_ref()),
                Err(error) => {
                    log::warn!("storage {} unavailable: {}", storage.location(), error);
                    available.unavailable.push(UnavailableStorage {
                        location: storage.location().to_owned(),
                        error,
                    });
                }
            }
        }
        available
    }

    fn load_type(
        &self,
        storages: &[&dyn StoragePlugin],
        adapter: &dyn PresetAdapter,
        mode: LoadMode,
        claimed: &mut HashSet<PresetId>,
        report: &mut LoadReport,
    ) {
        let resource_type = adapter.resource_type();
        for &storage in storages {
            let items: ResourceItemIterator = storage
                .resource_items(&resource_type)
                .filter(|item| match &self.blacklist {
                    Some(blacklist) if blacklist.contains(&item.url) => {
                        report.blacklisted.push(item.url.clone());
                        false
                    }
                    _ => true,
                })
                .collect();

            let mut resources = ResourceIterator::new(storage, items);
            for resource in resources.by_ref() {
                self.load_one(resource, storage, adapter, mode, claimed, report);
            }

            for skipped in resources.into_skipped() {
                if let SkipReason::Unreadable(error) = skipped.reason {
                    report.failures.push(LoadFailure {
                        name: stem_of(&skipped.url).to_owned(),
                        url: skipped.url,
                        location: storage.location().to_owned(),
                        error: error.into(),
                    });
                }
            }
        }
    }

    fn load_one(
        &self,
        resource: Resource,
        storage: &dyn StoragePlugin,
        adapter: &dyn PresetAdapter,
        mode: LoadMode,
        claimed: &mut HashSet<PresetId>,
        report: &mut LoadReport,
    ) {
        let name = resource.display_name().to_owned();
        let draft = match adapter.decode(&resource, storage) {
            Ok(draft) => draft,
            Err(error) => {
                log::warn!("failed to load {} from {}: {}", resource.url(), storage.location(), error);
                report.failures.push(LoadFailure {
                    name,
                    url: resource.item.url,
                    location: storage.location().to_owned(),
                    error,
                });
                return;
            }
        };

        let PresetDraft {
            engine,
            configuration,
            thumbnail,
        } = draft;
        let id = PresetId::new(engine, name);
        if claimed.contains(&id) {
            report.skipped.push(DuplicateSkipped {
                id,
                location: storage.location().to_owned(),
                url: resource.item.url,
            });
            return;
        }

        let mut preset = Preset::new(id.clone(), adapter.resource_type(), configuration)
            .with_origin(resource.item.clone());
        preset.thumbnail = thumbnail;
        match self.registry.add_resource(preset, mode.allow_overwrite()) {
            Ok(_) => {
                claimed.insert(id.clone());
                report.loaded.push(id);
            }
            Err(RegistryError::AlreadyExists(id)) => {
                claimed.insert(id.clone());
                report.skipped.push(DuplicateSkipped {
                    id,
                    location: storage.location().to_owned(),
                    url: resource.item.url,
                });
            }
            Err(error) => report.failures.push(LoadFailure {
                name: id.name,
                url: resource.item.url,
                location: storage.location().to_owned(),
                error: error.into(),
            }),
        }
    }

    fn finish(&self, report: &LoadReport) {
        if report.loaded.is_empty() && !report.failures.is_empty() {
            log::warn!(
                "no resources loaded: {}; failed: {}",
                report.summary(),
                report.failure_names().join(", ")
            );
        } else {
            log::info!("resource loading finished: {}", report.summary());
        }
    }
}

#[derive(Default)]
struct Available<'s> {
    storages: Vec<&'s dyn StoragePlugin>,
    unavailable: Vec<UnavailableStorage>,
}

fn stem_of(url: &str) -> &str {
    let file_name = url.rsplit('/').next().unwrap_or(url);
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}
