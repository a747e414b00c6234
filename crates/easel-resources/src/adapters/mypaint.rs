use easel_config::Configuration;
use serde_json::Value as JsonValue;

use super::{PresetAdapter, PresetDraft};
use crate::{LoadError, Resource, ResourceType, StoragePlugin, ThumbnailRef};

pub const MYPAINT_ENGINE: &str = "mypaintbrush";

pub const MYPAINT_JSON: &str = "MyPaint/json";
pub const MYPAINT_DIAMETER: &str = "MyPaint/diameter";
pub const MYPAINT_HARDNESS: &str = "MyPaint/hardness";
pub const MYPAINT_OPACITY: &str = "MyPaint/opacity";
pub const MYPAINT_ERASER: &str = "MyPaint/eraser";

// libmypaint defaults for settings a brush file leaves out.
const DEFAULT_RADIUS_LOGARITHMIC: f64 = 2.0;
const DEFAULT_HARDNESS: f64 = 0.8;
const DEFAULT_OPAQUE: f64 = 1.0;
const DEFAULT_ERASER: f64 = 0.0;

const THUMBNAIL_SUFFIX: &str = "_prev.png";

/// Loads MyPaint `.myb` brushes as presets for the MyPaint engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyPaintAdapter;

impl MyPaintAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn base_value(settings: Option<&JsonValue>, name: &str, default: f64) -> f64 {
    settings
        .and_then(|settings| settings.get(name))
        .and_then(|setting| setting.get("base_value"))
        .and_then(JsonValue::as_f64)
        .unwrap_or(default)
}

impl PresetAdapter for MyPaintAdapter {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Brush
    }

    fn decode(
        &self,
        resource: &Resource,
        storage: &dyn StoragePlugin,
    ) -> Result<PresetDraft, LoadError> {
        let brush: JsonValue = serde_json::from_slice(resource.bytes())
            .map_err(|err| LoadError::Adapter(format!("invalid MyPaint brush: {err}")))?;
        if !brush.is_object() {
            return Err(LoadError::Adapter(
                "invalid MyPaint brush: root is not an object".into(),
            ));
        }
        let settings = brush.get("settings");

        let radius = base_value(settings, "radius_logarithmic", DEFAULT_RADIUS_LOGARITHMIC);
        let eraser = base_value(settings, "eraser", DEFAULT_ERASER);

        let configuration = Configuration::new()
            .with("paintop", MYPAINT_ENGINE)
            .with("filename", resource.url())
            .with(MYPAINT_JSON, resource.bytes())
            .with(MYPAINT_DIAMETER, 2.0 * radius.exp())
            .with(MYPAINT_HARDNESS, base_value(settings, "hardness", DEFAULT_HARDNESS))
            .with(MYPAINT_OPACITY, base_value(settings, "opaque", DEFAULT_OPAQUE))
            .with(MYPAINT_ERASER, eraser != 0.0)
            .with("EraserMode", eraser.round() as i64);

        let mut draft = PresetDraft::new(MYPAINT_ENGINE, configuration);
        draft.thumbnail = thumbnail_for(resource, storage);
        Ok(draft)
    }
}

fn thumbnail_for(resource: &Resource, storage: &dyn StoragePlugin) -> Option<ThumbnailRef> {
    let item = &resource.item;
    let file_name = format!("{}{}", item.stem(), THUMBNAIL_SUFFIX);
    let url = match item.parent() {
        "" => file_name,
        parent => format!("{parent}/{file_name}"),
    };
    storage.resource_item(&url).map(|thumbnail| ThumbnailRef {
        location: thumbnail.storage_location,
        url: thumbnail.url,
    })
}
