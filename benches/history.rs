//! History benchmark: capped append on the JSON file log vs in memory.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loginguard::storage::{HistoryStore, JsonFileHistory, MemoryHistory, PredictionRecord, DEFAULT_CAPACITY};
use loginguard::ScoreResult;
use serde_json::json;

fn record(i: usize) -> PredictionRecord {
    PredictionRecord::new(
        json!({
            "timestamp": "2025-06-15 14:30:00",
            "geo_location": "Canada",
            "device_id": format!("DF_{}", i),
            "bytes_in": 1000,
            "bytes_out": 2000,
            "is_new_device": 0,
            "success": 1
        }),
        ScoreResult {
            anomaly: 0,
            probability_normal: 0.9,
            probability_anomaly: 0.1,
        },
    )
}

fn bench_file_append_full_log(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileHistory::new(dir.path().join("history.json"), DEFAULT_CAPACITY);
    for i in 0..DEFAULT_CAPACITY {
        store.append(record(i)).unwrap();
    }
    let mut i = 0usize;
    c.bench_function("json_file_append_at_capacity", |b| {
        b.iter(|| {
            i += 1;
            store.append(black_box(record(i))).unwrap()
        })
    });
}

fn bench_memory_append(c: &mut Criterion) {
    let store = MemoryHistory::new(DEFAULT_CAPACITY);
    let mut i = 0usize;
    c.bench_function("memory_append", |b| {
        b.iter(|| {
            i += 1;
            store.append(black_box(record(i))).unwrap()
        })
    });
}

criterion_group!(benches, bench_file_append_full_log, bench_memory_append);
criterion_main!(benches);
