use std::path::{Path, PathBuf};
use std::sync::Arc;

use easel_resources::{
    Blacklist, LoadMode, LoadReport, LoadingPipeline, ResourceRegistry, ResourceType,
    StorageFactory, StoragePlugin, UnavailableStorage,
};
use easel_utils::profiling::timed;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Types to load. Empty loads every type with an adapter.
    pub types: Vec<ResourceType>,
    pub extra_paths: Vec<PathBuf>,
    pub use_default_roots: bool,
    pub mode: LoadMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            extra_paths: Vec::new(),
            use_default_roots: true,
            mode: LoadMode::Initial,
        }
    }
}

/// Standard resource roots, user locations first so they shadow stock assets.
pub fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(data) = dirs::data_dir() {
        roots.push(data.join("easel-studio/resources"));
    }
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".easel/resources"));
    }
    roots.push(PathBuf::from("/usr/share/easel-studio/resources"));
    roots
}

pub struct Scanner {
    factory: StorageFactory,
    pipeline: LoadingPipeline,
}

impl Scanner {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            factory: StorageFactory::with_defaults(),
            pipeline: LoadingPipeline::with_default_adapters(registry),
        }
    }

    pub fn with_blacklist(mut self, blacklist: Arc<Blacklist>) -> Self {
        self.pipeline = self.pipeline.with_blacklist(blacklist);
        self
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        self.pipeline.registry()
    }

    /// Opens every root in `options`. Missing default roots are ignored;
    /// extra paths that cannot be opened are reported.
    pub fn open_storages(
        &self,
        options: &ScanOptions,
    ) -> (Vec<Arc<dyn StoragePlugin>>, Vec<UnavailableStorage>) {
        let mut storages = Vec::new();
        let mut unavailable = Vec::new();

        if options.use_default_roots {
            for root in default_roots() {
                if !root.is_dir() {
                    tracing::debug!(root = %root.display(), "default resource root missing");
                    continue;
                }
                self.open_into(&root, &mut storages, &mut unavailable);
            }
        }
        for path in &options.extra_paths {
            self.open_into(path, &mut storages, &mut unavailable);
        }
        (storages, unavailable)
    }

    fn open_into(
        &self,
        path: &Path,
        storages: &mut Vec<Arc<dyn StoragePlugin>>,
        unavailable: &mut Vec<UnavailableStorage>,
    ) {
        if storages
            .iter()
            .any(|storage| Path::new(storage.location()) == path)
        {
            return;
        }
        match self.factory.open_path(path) {
            Ok(storage) => storages.push(storage),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "cannot open resource storage");
                unavailable.push(UnavailableStorage {
                    location: path.display().to_string(),
                    error,
                });
            }
        }
    }

    pub fn scan(&self, options: &ScanOptions) -> LoadReport {
        let (storages, unavailable) = self.open_storages(options);
        let (mut report, elapsed) = timed("resource scan", || {
            if options.types.is_empty() {
                self.pipeline.run(&storages, options.mode)
            } else {
                self.pipeline.run_types(&storages, &options.types, options.mode)
            }
        });
        report.unavailable.extend(unavailable);
        tracing::info!(
            storages = storages.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "{}",
            report.summary()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use easel_resources::{BundleBuilder, PresetId};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    const PALETTE: &str = "GIMP Palette\nName: Mono\nColumns: 2\n#\n0 0 0\tBlack\n255 255 255\tWhite\n";

    #[test]
    fn scan_loads_directories_and_bundles() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("resources");
        std::fs::create_dir_all(root.join("palettes")).unwrap();
        std::fs::write(root.join("palettes/mono.gpl"), PALETTE).unwrap();
        let bundle = dir.path().join("stock.bundle");
        BundleBuilder::new()
            .add("brushes/ink.myb", r#"{"version": 3, "settings": {}}"#)
            .write_to(&bundle)
            .unwrap();

        let scanner = Scanner::new(Arc::new(ResourceRegistry::new()));
        let options = ScanOptions {
            extra_paths: vec![root.clone(), bundle, root],
            use_default_roots: false,
            ..ScanOptions::default()
        };
        let report = scanner.scan(&options);
        assert!(report.is_clean(), "{}", report.summary());
        let mut loaded: Vec<String> = report.loaded.iter().map(ToString::to_string).collect();
        loaded.sort();
        assert_eq!(loaded, vec!["mypaintbrush/ink", "palette/mono"]);
        assert!(scanner
            .registry()
            .get(&PresetId::new("palette", "mono"))
            .is_some());
    }

    #[test]
    fn type_filter_and_missing_paths() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("palettes")).unwrap();
        std::fs::write(dir.path().join("palettes/mono.gpl"), PALETTE).unwrap();
        std::fs::write(dir.path().join("soft.cfg"), "{ broken").unwrap();

        let scanner = Scanner::new(Arc::new(ResourceRegistry::new()));
        let options = ScanOptions {
            types: vec![ResourceType::Palette],
            extra_paths: vec![dir.path().to_path_buf(), dir.path().join("missing")],
            use_default_roots: false,
            ..ScanOptions::default()
        };
        let report = scanner.scan(&options);
        assert_eq!(report.loaded, vec![PresetId::new("palette", "mono")]);
        assert!(report.failures.is_empty());
        assert_eq!(report.unavailable.len(), 1);
        assert!(report.unavailable[0].location.ends_with("missing"));
    }
}
