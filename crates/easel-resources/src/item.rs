use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of asset a resource holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    PaintOpPreset,
    Brush,
    Palette,
    FilterConfig,
    LayerStyle,
    Thumbnail,
    Other(String),
}

impl ResourceType {
    pub fn tag(&self) -> &str {
        match self {
            ResourceType::PaintOpPreset => "paintoppresets",
            ResourceType::Brush => "brushes",
            ResourceType::Palette => "palettes",
            ResourceType::FilterConfig => "filters",
            ResourceType::LayerStyle => "layerstyles",
            ResourceType::Thumbnail => "thumbnails",
            ResourceType::Other(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "paintoppresets" | "presets" => ResourceType::PaintOpPreset,
            "brushes" | "mypaint_brushes" => ResourceType::Brush,
            "palettes" => ResourceType::Palette,
            "filters" => ResourceType::FilterConfig,
            "layerstyles" => ResourceType::LayerStyle,
            "thumbnails" => ResourceType::Thumbnail,
            _ => ResourceType::Other(tag.to_owned()),
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "kpp" => Some(ResourceType::PaintOpPreset),
            "myb" => Some(ResourceType::Brush),
            "gpl" => Some(ResourceType::Palette),
            "cfg" => Some(ResourceType::FilterConfig),
            "asl" => Some(ResourceType::LayerStyle),
            "png" => Some(ResourceType::Thumbnail),
            _ => None,
        }
    }

    /// Classifies a url by its file extension.
    pub fn classify(url: &str) -> Option<Self> {
        Path::new(url)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        value.tag().to_owned()
    }
}

/// Metadata describing one addressable asset, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub url: String,
    pub resource_type: ResourceType,
    pub storage_location: String,
    pub version: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl ResourceItem {
    pub fn new(
        url: impl Into<String>,
        resource_type: ResourceType,
        storage_location: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            resource_type,
            storage_location: storage_location.into(),
            version: 1,
            modified: None,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// File name of the url without its last extension.
    pub fn stem(&self) -> &str {
        let file_name = self.url.rsplit('/').next().unwrap_or(&self.url);
        match file_name.rfind('.') {
            Some(0) | None => file_name,
            Some(dot) => &file_name[..dot],
        }
    }

    /// Directory part of the url, empty for top-level items.
    pub fn parent(&self) -> &str {
        self.url.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// A loaded asset: its metadata plus the raw payload.
#[derive(Debug, Clone)]
pub struct Resource {
    pub item: ResourceItem,
    pub payload: Arc<[u8]>,
    pub name: Option<String>,
}

impl Resource {
    pub fn new(item: ResourceItem, payload: Arc<[u8]>) -> Self {
        Self {
            item,
            payload,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.item.url
    }

    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.payload)
    }

    /// Display name, falling back to the url stem.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.item.stem())
    }
}
