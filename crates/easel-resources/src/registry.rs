use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::{Preset, PresetId, ResourceType, SharedPreset};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("preset {0} is already registered")]
    AlreadyExists(PresetId),
    #[error("preset {0} is not registered")]
    NotFound(PresetId),
    #[error("edit changed preset identity from {expected} to {actual}")]
    IdentityChanged { expected: PresetId, actual: PresetId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Added(PresetId),
    Replaced(PresetId),
    Removed(PresetId),
    Cleared,
}

/// Canonical set of loaded presets, at most one per identity.
///
/// Readers receive whole [`SharedPreset`] handles and never observe a
/// partially replaced entry.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: RwLock<IndexMap<PresetId, SharedPreset>>,
    subscribers: Mutex<Vec<Sender<RegistryEvent>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `preset`.
    ///
    /// Without `allow_overwrite` an existing entry is left untouched and
    /// `AlreadyExists` is returned. A replaced entry keeps its list position
    /// and its version moves past the one it replaces.
    pub fn add_resource(
        &self,
        mut preset: Preset,
        allow_overwrite: bool,
    ) -> Result<SharedPreset, RegistryError> {
        let mut entries = self.entries.write();
        let existing_version = entries.get(&preset.id).map(|current| current.version);
        let exists = existing_version.is_some();
        if exists && !allow_overwrite {
            return Err(RegistryError::AlreadyExists(preset.id));
        }
        if let Some(version) = existing_version {
            preset.version = preset.version.max(version + 1);
        }
        let id = preset.id.clone();
        let shared = Arc::new(preset);
        entries.insert(id.clone(), Arc::clone(&shared));
        self.notify(if exists {
            RegistryEvent::Replaced(id)
        } else {
            RegistryEvent::Added(id)
        });
        Ok(shared)
    }

    pub fn get(&self, id: &PresetId) -> Option<SharedPreset> {
        self.entries.read().get(id).cloned()
    }

    pub fn contains(&self, id: &PresetId) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Identities of one type in insertion order.
    pub fn list(&self, resource_type: &ResourceType) -> Vec<PresetId> {
        self.entries
            .read()
            .values()
            .filter(|preset| &preset.resource_type == resource_type)
            .map(|preset| preset.id.clone())
            .collect()
    }

    /// Every registered preset in insertion order.
    pub fn snapshot(&self) -> Vec<SharedPreset> {
        self.entries.read().values().cloned().collect()
    }

    pub fn find_by_name(&self, resource_type: &ResourceType, name: &str) -> Option<SharedPreset> {
        self.entries
            .read()
            .values()
            .find(|preset| &preset.resource_type == resource_type && preset.id.name == name)
            .cloned()
    }

    pub fn remove(&self, id: &PresetId) -> bool {
        let mut entries = self.entries.write();
        let removed = entries.shift_remove(id).is_some();
        if removed {
            self.notify(RegistryEvent::Removed(id.clone()));
        }
        removed
    }

    /// Clones the canonical preset, applies `edit` and publishes the result
    /// with a bumped version.
    pub fn update<F>(&self, id: &PresetId, edit: F) -> Result<SharedPreset, RegistryError>
    where
        F: FnOnce(&mut Preset),
    {
        let mut entries = self.entries.write();
        let current = entries
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let mut edited = Preset::clone(current);
        edit(&mut edited);
        if &edited.id != id {
            return Err(RegistryError::IdentityChanged {
                expected: id.clone(),
                actual: edited.id,
            });
        }
        edited.version = current.version + 1;
        let shared = Arc::new(edited);
        entries.insert(id.clone(), Arc::clone(&shared));
        self.notify(RegistryEvent::Replaced(id.clone()));
        Ok(shared)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        self.notify(RegistryEvent::Cleared);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Receives an event after every mutation.
    pub fn subscribe(&self) -> Receiver<RegistryEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    // Called with the entries write lock held so events arrive in mutation order.
    fn notify(&self, event: RegistryEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use easel_config::Configuration;
    use pretty_assertions::assert_eq;

    use super::*;

    fn preset(engine: &str, name: &str, radius: f64) -> Preset {
        Preset::new(
            PresetId::new(engine, name),
            ResourceType::FilterConfig,
            Configuration::new().with("radius", radius),
        )
    }

    #[test]
    fn add_without_overwrite_keeps_existing() {
        let registry = ResourceRegistry::new();
        registry.add_resource(preset("blur", "soft", 1.0), false).unwrap();
        let err = registry
            .add_resource(preset("blur", "soft", 9.0), false)
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyExists(PresetId::new("blur", "soft")));
        let kept = registry.get(&PresetId::new("blur", "soft")).unwrap();
        assert_eq!(kept.configuration.get_f64("radius").unwrap(), 1.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn overwrite_keeps_position_and_remove_shifts() {
        let registry = ResourceRegistry::new();
        for name in ["a", "b", "c"] {
            registry.add_resource(preset("blur", name, 1.0), false).unwrap();
        }
        registry.add_resource(preset("blur", "a", 2.0), true).unwrap();
        let names = |registry: &ResourceRegistry| -> Vec<String> {
            registry
                .list(&ResourceType::FilterConfig)
                .into_iter()
                .map(|id| id.name)
                .collect()
        };
        assert_eq!(names(&registry), vec!["a", "b", "c"]);
        assert!(registry.remove(&PresetId::new("blur", "b")));
        assert!(!registry.remove(&PresetId::new("blur", "b")));
        assert_eq!(names(&registry), vec!["a", "c"]);
        assert!(registry.list(&ResourceType::Palette).is_empty());
    }

    #[test]
    fn update_bumps_version_and_leaves_old_handles_alone() {
        let registry = ResourceRegistry::new();
        let id = PresetId::new("blur", "soft");
        let before = registry.add_resource(preset("blur", "soft", 1.0), false).unwrap();
        let after = registry
            .update(&id, |preset| {
                preset.configuration.set("radius", 4.0);
            })
            .unwrap();
        assert_eq!(before.version, 1);
        assert_eq!(before.configuration.get_f64("radius").unwrap(), 1.0);
        assert_eq!(after.version, 2);
        assert_eq!(registry.get(&id).unwrap().configuration.get_f64("radius").unwrap(), 4.0);

        let err = registry
            .update(&id, |preset| preset.id.name = "renamed".into())
            .unwrap_err();
        assert!(matches!(err, RegistryError::IdentityChanged { .. }));
        let missing = registry.update(&PresetId::new("blur", "none"), |_| {});
        assert!(matches!(missing, Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn overwrite_after_update_never_lowers_version() {
        let registry = ResourceRegistry::new();
        let id = PresetId::new("blur", "soft");
        registry.add_resource(preset("blur", "soft", 1.0), false).unwrap();
        registry
            .update(&id, |preset| {
                preset.configuration.set("radius", 2.0);
            })
            .unwrap();
        let replaced = registry.add_resource(preset("blur", "soft", 3.0), true).unwrap();
        assert_eq!(replaced.version, 3);
        assert_eq!(registry.get(&id).unwrap().version, 3);
    }

    #[test]
    fn find_by_name_filters_on_type() {
        let registry = ResourceRegistry::new();
        registry.add_resource(preset("blur", "soft", 1.0), false).unwrap();
        assert!(registry
            .find_by_name(&ResourceType::FilterConfig, "soft")
            .is_some());
        assert!(registry.find_by_name(&ResourceType::Palette, "soft").is_none());
    }

    #[test]
    fn subscribers_see_mutations_in_order() {
        let registry = ResourceRegistry::new();
        let events = registry.subscribe();
        let dropped = registry.subscribe();
        drop(dropped);
        let id = PresetId::new("blur", "soft");
        registry.add_resource(preset("blur", "soft", 1.0), false).unwrap();
        registry.add_resource(preset("blur", "soft", 2.0), true).unwrap();
        registry.remove(&id);
        registry.clear();
        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                RegistryEvent::Added(id.clone()),
                RegistryEvent::Replaced(id.clone()),
                RegistryEvent::Removed(id),
                RegistryEvent::Cleared,
            ]
        );
        assert_eq!(registry.subscribers.lock().len(), 1);
    }

    fn paired(value: f64) -> Preset {
        let mut preset = preset("blur", "soft", value);
        preset.configuration.set("shadow", value);
        preset
    }

    #[test]
    fn concurrent_readers_see_whole_presets() {
        let registry = Arc::new(ResourceRegistry::new());
        let id = PresetId::new("blur", "soft");
        registry.add_resource(paired(0.0), false).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let current = registry.get(&id).unwrap();
                        let a = current.configuration.get_f64("radius").unwrap();
                        let b = current.configuration.get_f64("shadow").unwrap();
                        assert_eq!(a, b);
                    }
                })
            })
            .collect();

        for step in 1..200 {
            let value = f64::from(step);
            registry.add_resource(paired(value), true).unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(registry.len(), 1);
    }
}
