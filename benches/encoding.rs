//! Encoding benchmark: login events → feature table.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loginguard::{CategoryVocabulary, FeatureEncoder, LoginEvent};

const GEOS: [&str; 4] = ["Brazil", "Canada", "Japan", "United States of America"];

fn make_events(n: usize) -> Vec<LoginEvent> {
    (0..n)
        .map(|i| LoginEvent {
            user_id: Some(format!("U{}", i % 50)),
            timestamp: format!("2025-06-{:02} {:02}:30:00", i % 28 + 1, i % 24),
            ip_address: Some("10.0.0.1".to_string()),
            geo_location: GEOS[i % GEOS.len()].to_string(),
            device_id: format!("DF_{}", i % 200),
            is_new_device: (i % 2) as u8,
            bytes_in: 1000 + i as u64,
            bytes_out: 2000 + i as u64,
            success: 1,
        })
        .collect()
}

fn encoder() -> FeatureEncoder {
    FeatureEncoder::new(
        CategoryVocabulary::fit("geo_location", GEOS),
        CategoryVocabulary::fit("device_id", (0..100).map(|i| format!("DF_{}", i))),
    )
}

fn bench_encode_one(c: &mut Criterion) {
    let enc = encoder();
    let ev = make_events(1).remove(0);
    c.bench_function("encode_one", |b| b.iter(|| enc.encode_one(black_box(&ev))));
}

fn bench_encode_batch(c: &mut Criterion) {
    let enc = encoder();
    let mut g = c.benchmark_group("encode_batch");
    for n in [100, 1000, 10_000] {
        let events = make_events(n);
        g.bench_function(format!("serving_{}", n).as_str(), |b| {
            b.iter(|| enc.encode(black_box(&events)))
        });
        g.bench_function(format!("observed_{}", n).as_str(), |b| {
            b.iter(|| enc.encode_observed(black_box(&events)))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_encode_one, bench_encode_batch);
criterion_main!(benches);
