//! Serialization benchmarks.
//!
//! Measures the cost of serializing to the plain wire form and of the
//! re-validating deserialization path, which reconstructs through the public
//! factories instead of rehydrating internal state.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use immutablecollections::{ImmutableDict, ImmutableSet, immutabledict, immutableset};
use std::hint::black_box;

const SIZES: [usize; 2] = [100, 10_000];

fn benchmark_set_serialize(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("immutableset_serialize");

    for size in SIZES {
        let set = immutableset((0..size as i64).collect::<Vec<_>>());
        group.bench_with_input(BenchmarkId::new("to_json", size), &size, |bencher, _| {
            bencher.iter(|| black_box(serde_json::to_string(black_box(&set)).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_set_deserialize(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("immutableset_deserialize");

    for size in SIZES {
        let json = serde_json::to_string(&immutableset((0..size as i64).collect::<Vec<_>>()))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("from_json", size), &size, |bencher, _| {
            bencher.iter(|| {
                let set: ImmutableSet<i64> = serde_json::from_str(black_box(&json)).unwrap();
                black_box(set)
            });
        });
    }

    group.finish();
}

fn benchmark_dict_round_trip(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("immutabledict_round_trip");

    for size in SIZES {
        let dict = immutabledict(
            (0..size as i64)
                .map(|n| (n.to_string(), n))
                .collect::<Vec<_>>(),
        );
        group.bench_with_input(BenchmarkId::new("round_trip", size), &size, |bencher, _| {
            bencher.iter(|| {
                let json = serde_json::to_string(black_box(&dict)).unwrap();
                let restored: ImmutableDict<String, i64> = serde_json::from_str(&json).unwrap();
                black_box(restored)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_set_serialize,
    benchmark_set_deserialize,
    benchmark_dict_round_trip,
);
criterion_main!(benches);
