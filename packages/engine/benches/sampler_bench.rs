//! Benchmark suite for certprep-engine
//!
//! Run with: cargo bench

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use certprep_engine::{sample, PoolItem, SampleConstraints};

fn pool(size: usize) -> Vec<PoolItem> {
    (0..size)
        .map(|i| {
            let item = PoolItem::new(format!("q{i}"), format!("{}.0", i % 5 + 1))
                .with_weakness((i % 100) as f64 / 100.0);
            if i % 7 == 0 {
                item.with_category("scenario")
            } else {
                item
            }
        })
        .collect()
}

fn bench_sample_exam(c: &mut Criterion) {
    let pool = pool(2_000);
    let constraints = SampleConstraints {
        total_count: 90,
        category_minimums: BTreeMap::from([("scenario".to_string(), 20)]),
        weight_groups: BTreeMap::from([
            ("1.0".to_string(), 0.24),
            ("2.0".to_string(), 0.19),
            ("3.0".to_string(), 0.17),
            ("4.0".to_string(), 0.20),
            ("5.0".to_string(), 0.20),
        ]),
    };
    c.bench_function("sample 90 of 2000", |b| {
        b.iter(|| sample(black_box(&pool), black_box(&constraints), "bench-seed"))
    });
}

criterion_group!(benches, bench_sample_exam);
criterion_main!(benches);
