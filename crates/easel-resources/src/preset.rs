use std::fmt;
use std::sync::Arc;

use easel_config::Configuration;
use serde::{Deserialize, Serialize};

use crate::{ResourceItem, ResourceType};

/// Registry identity of a preset: the engine that consumes it plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PresetId {
    pub engine: String,
    pub name: String,
}

impl PresetId {
    pub fn new(engine: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.engine, self.name)
    }
}

/// Locates a preview image inside some storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailRef {
    pub location: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub id: PresetId,
    pub resource_type: ResourceType,
    pub configuration: Configuration,
    pub thumbnail: Option<ThumbnailRef>,
    /// Bumped every time the registry replaces or edits this preset.
    pub version: u64,
    pub origin: Option<ResourceItem>,
    pub valid: bool,
}

impl Preset {
    pub fn new(id: PresetId, resource_type: ResourceType, configuration: Configuration) -> Self {
        Self {
            id,
            resource_type,
            configuration,
            thumbnail: None,
            version: 1,
            origin: None,
            valid: true,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: ThumbnailRef) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_origin(mut self, origin: ResourceItem) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn engine(&self) -> &str {
        &self.id.engine
    }
}

/// Registry handle. Holders keep a consistent snapshot while the registry
/// moves on.
pub type SharedPreset = Arc<Preset>;
