//! Adapters turning raw resources into registry presets.

mod configuration;
mod mypaint;
mod palette;

use easel_config::Configuration;

use crate::{LoadError, Resource, ResourceType, StoragePlugin, ThumbnailRef};

pub use configuration::ConfigurationAdapter;
pub use mypaint::{MyPaintAdapter, MYPAINT_ENGINE};
pub use palette::{Palette, PaletteAdapter, PaletteEntry, PALETTE_ENGINE};

/// Decoded content of one resource, before it gets its registry identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDraft {
    pub engine: String,
    pub configuration: Configuration,
    pub thumbnail: Option<ThumbnailRef>,
}

impl PresetDraft {
    pub fn new(engine: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            engine: engine.into(),
            configuration,
            thumbnail: None,
        }
    }
}

pub trait PresetAdapter: Send + Sync {
    fn resource_type(&self) -> ResourceType;

    /// Decodes `resource`. `storage` is the storage it was loaded from, for
    /// adapters that look up sibling items.
    fn decode(
        &self,
        resource: &Resource,
        storage: &dyn StoragePlugin,
    ) -> Result<PresetDraft, LoadError>;
}
