//! Resource storage, registry and loading pipeline for Easel Studio.
//!
//! Storage plugins expose assets from directories, bundles or memory.
//! The loading pipeline decodes them through per-type adapters and publishes
//! presets into a [`ResourceRegistry`].

pub mod adapters;
mod blacklist;
mod error;
mod item;
mod iter;
mod pipeline;
mod preset;
mod registry;
pub mod storage;

pub use adapters::{PresetAdapter, PresetDraft};
pub use blacklist::{Blacklist, BlacklistError};
pub use error::StorageError;
pub use item::{Resource, ResourceItem, ResourceType};
pub use iter::{ResourceItemIterator, ResourceIterator, SkipReason, SkippedResource};
pub use pipeline::{
    DuplicateSkipped, LoadError, LoadFailure, LoadMode, LoadReport, LoadingPipeline,
    UnavailableStorage,
};
pub use preset::{Preset, PresetId, SharedPreset, ThumbnailRef};
pub use registry::{RegistryError, RegistryEvent, ResourceRegistry};
pub use storage::{
    BundleBuilder, BundleStorage, DirectoryStorage, MemoryStorage, StorageFactory, StorageKind,
    StoragePlugin,
};
