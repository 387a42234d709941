//! Scoring benchmark: feature table → labels + probabilities through a decision forest.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loginguard::features::{FeatureTable, FeatureVector, FEATURE_COUNT};
use loginguard::model::{DecisionTree, ForestClassifier};
use loginguard::Scorer;
use std::sync::Arc;

/// Full binary tree of the given depth splitting on cycling features.
fn tree(depth: u32, seed: usize) -> DecisionTree {
    let n = (1usize << (depth + 1)) - 1;
    let internal = (1usize << depth) - 1;
    let mut t = DecisionTree {
        children_left: vec![-1; n],
        children_right: vec![-1; n],
        feature: vec![-2; n],
        threshold: vec![-2.0; n],
        value: vec![vec![1.0, 1.0]; n],
    };
    for i in 0..internal {
        t.children_left[i] = (2 * i + 1) as i64;
        t.children_right[i] = (2 * i + 2) as i64;
        t.feature[i] = ((i + seed) % FEATURE_COUNT) as i64;
        t.threshold[i] = ((i * 37 + seed) % 100) as f64;
    }
    for (i, v) in t.value.iter_mut().enumerate().skip(internal) {
        *v = vec![(i % 7 + 1) as f64, (i % 5 + 1) as f64];
    }
    t
}

fn table(n: usize) -> FeatureTable {
    (0..n as i64)
        .map(|i| FeatureVector {
            login_hour: i % 24,
            login_day: i % 28 + 1,
            login_month: i % 12 + 1,
            login_year: 2025,
            login_weekday: i % 7,
            is_new_device: i % 2,
            bytes_in: i * 13 % 100,
            bytes_out: i * 17 % 100,
            success: 1,
            geo_location_encoded: i % 40 - 1,
            device_id_encoded: i % 90,
            user_login_frequency: 1,
            device_login_frequency: 1,
            location_login_frequency: 1,
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_score(c: &mut Criterion) {
    let trees = (0..100).map(|s| tree(8, s)).collect();
    let forest = ForestClassifier::new(FEATURE_COUNT, trees).unwrap();
    let scorer = Scorer::new(Arc::new(forest));

    let one = table(1);
    c.bench_function("score_one_100_trees", |b| b.iter(|| scorer.score(black_box(&one))));

    let mut g = c.benchmark_group("score_batch_100_trees");
    for n in [100, 1000] {
        let t = table(n);
        g.bench_function(format!("rows_{}", n).as_str(), |b| {
            b.iter(|| scorer.score(black_box(&t)))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
