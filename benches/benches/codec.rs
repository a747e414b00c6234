use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use easel_config::{deserialize, serialize, Configuration};

fn brush_configuration() -> Configuration {
    let mut cfg = Configuration::new()
        .with("paintop", "mypaintbrush")
        .with("filename", "brushes/deevad/pencil.myb")
        .with("MyPaint/json", vec![0x7b_u8; 2048]);
    for i in 0..64 {
        cfg.set(format!("curve.{i}"), f64::from(i) * 0.125);
    }
    cfg
}

fn codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.measurement_time(Duration::from_secs(5));

    let cfg = brush_configuration();
    let text = serialize(&cfg);

    group.bench_function("serialize_brush", |b| {
        b.iter(|| serialize(black_box(&cfg)));
    });
    group.bench_function("deserialize_brush", |b| {
        b.iter(|| deserialize(black_box(&text)).expect("valid configuration"));
    });

    group.finish();
}

criterion_group!(benches, codec);
criterion_main!(benches);
