use std::sync::Arc;

use anyhow::Result;
use easel_resources::adapters::{Palette, PaletteEntry};
use easel_resources::{
    LoadMode, LoadingPipeline, MemoryStorage, PresetId, RegistryEvent, ResourceRegistry,
    ResourceType, StoragePlugin,
};
use pretty_assertions::assert_eq;

const EARTH: &str = "GIMP Palette
Name: Earth
Columns: 3
#
120  72  40\tUmber
204 153  51\tOchre
# Group: Greens
 85 107  47\tOlive
";

#[test]
fn palette_edits_go_through_update() -> Result<()> {
    let storage = MemoryStorage::new("memory://palettes");
    storage.insert("palettes/earth.gpl", ResourceType::Palette, EARTH);
    let storages: Vec<Arc<dyn StoragePlugin>> = vec![Arc::new(storage)];

    let registry = Arc::new(ResourceRegistry::new());
    let pipeline = LoadingPipeline::with_default_adapters(Arc::clone(&registry));
    let report = pipeline.run(&storages, LoadMode::Initial);
    assert!(report.is_clean());

    let id = PresetId::new("palette", "earth");
    let original = registry.get(&id).unwrap();
    let palette = Palette::from_configuration(&original.configuration)?;
    assert_eq!(palette.name, "Earth");
    assert_eq!(palette.entries.len(), 3);

    let events = registry.subscribe();
    let mut edited = palette.clone();
    assert!(edited.change_entry(
        1,
        PaletteEntry {
            id: "OC-1".into(),
            spot: true,
            ..PaletteEntry::new("Yellow Ochre", [227, 168, 87])
        }
    ));
    assert_eq!(edited.rename_group("Greens", "Foliage"), 1);
    let updated = registry.update(&id, |preset| {
        preset.configuration = edited.to_configuration();
    })?;

    assert_eq!(updated.version, original.version + 1);
    assert_eq!(Palette::from_configuration(&original.configuration)?, palette);
    let reread = Palette::from_configuration(&registry.get(&id).unwrap().configuration)?;
    assert_eq!(reread, edited);
    assert_eq!(reread.groups(), vec!["", "Foliage"]);
    assert_eq!(events.try_recv()?, RegistryEvent::Replaced(id));
    Ok(())
}
