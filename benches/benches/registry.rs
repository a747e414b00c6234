use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use easel_config::Configuration;
use easel_resources::{Preset, PresetId, ResourceRegistry, ResourceType};

fn populated(count: usize) -> Arc<ResourceRegistry> {
    let registry = Arc::new(ResourceRegistry::new());
    for i in 0..count {
        let preset = Preset::new(
            PresetId::new("blur", format!("preset-{i}")),
            ResourceType::FilterConfig,
            Configuration::new().with("radius", i as i64),
        );
        registry.add_resource(preset, false).expect("unique preset");
    }
    registry
}

fn registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    let registry = populated(10_000);
    let id = PresetId::new("blur", "preset-5000");

    group.bench_function("get_10k", |b| {
        b.iter(|| registry.get(black_box(&id)).expect("registered"));
    });
    group.bench_function("overwrite_10k", |b| {
        b.iter(|| {
            let preset = Preset::new(id.clone(), ResourceType::FilterConfig, Configuration::new());
            registry.add_resource(preset, true).expect("overwrite")
        });
    });
    group.bench_function("list_10k", |b| {
        b.iter(|| registry.list(black_box(&ResourceType::FilterConfig)).len());
    });

    group.finish();
}

criterion_group!(benches, registry);
criterion_main!(benches);
