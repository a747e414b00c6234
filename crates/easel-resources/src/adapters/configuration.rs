use easel_config::{CodecError, Configuration};

use super::{PresetAdapter, PresetDraft};
use crate::{LoadError, Resource, ResourceType, StoragePlugin};

const ENGINE_PROPERTY: &str = "engine";

/// Loads resources stored as configuration text.
///
/// The engine id comes from the `engine` property, or the url stem when the
/// property is absent.
#[derive(Debug, Clone)]
pub struct ConfigurationAdapter {
    resource_type: ResourceType,
}

impl ConfigurationAdapter {
    pub fn new(resource_type: ResourceType) -> Self {
        Self { resource_type }
    }

    pub fn filters() -> Self {
        Self::new(ResourceType::FilterConfig)
    }

    pub fn paintop_presets() -> Self {
        Self::new(ResourceType::PaintOpPreset)
    }
}

impl PresetAdapter for ConfigurationAdapter {
    fn resource_type(&self) -> ResourceType {
        self.resource_type.clone()
    }

    fn decode(
        &self,
        resource: &Resource,
        _storage: &dyn StoragePlugin,
    ) -> Result<PresetDraft, LoadError> {
        let configuration = Configuration::from_text(resource.text()?)?;
        let engine = match configuration.get_str(ENGINE_PROPERTY) {
            Ok(engine) => engine.to_owned(),
            Err(CodecError::MissingField(_)) => resource.item.stem().to_owned(),
            Err(err) => return Err(err.into()),
        };
        Ok(PresetDraft::new(engine, configuration))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::MemoryStorage;

    fn load(storage: &MemoryStorage, url: &str) -> Result<PresetDraft, LoadError> {
        let resource = storage.resource(url).unwrap().unwrap();
        ConfigurationAdapter::filters().decode(&resource, storage)
    }

    #[test]
    fn engine_property_wins_over_stem() {
        let storage = MemoryStorage::new("memory://filters");
        let text = Configuration::new()
            .with("engine", "gaussianblur")
            .with("radius", 3)
            .to_text();
        storage.insert("filters/soft.cfg", ResourceType::FilterConfig, text);
        let draft = load(&storage, "filters/soft.cfg").unwrap();
        assert_eq!(draft.engine, "gaussianblur");
        assert_eq!(draft.configuration.get_i64("radius").unwrap(), 3);
    }

    #[test]
    fn stem_is_the_fallback_engine() {
        let storage = MemoryStorage::new("memory://filters");
        let text = Configuration::new().with("radius", 3).to_text();
        storage.insert("filters/blur.cfg", ResourceType::FilterConfig, text);
        assert_eq!(load(&storage, "filters/blur.cfg").unwrap().engine, "blur");
    }

    #[test]
    fn bad_payloads_are_codec_errors() {
        let storage = MemoryStorage::new("memory://filters");
        storage.insert("a.cfg", ResourceType::FilterConfig, "{ nope");
        storage.insert(
            "b.cfg",
            ResourceType::FilterConfig,
            Configuration::new().with("engine", 7).to_text(),
        );
        storage.insert("c.cfg", ResourceType::FilterConfig, vec![0xffu8, 0xfe]);
        assert!(matches!(load(&storage, "a.cfg"), Err(LoadError::Codec(_))));
        assert!(matches!(
            load(&storage, "b.cfg"),
            Err(LoadError::Codec(CodecError::TypeMismatch { .. }))
        ));
        assert!(matches!(load(&storage, "c.cfg"), Err(LoadError::Encoding(_))));
    }
}
