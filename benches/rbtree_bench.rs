//! Benchmark for RbTree vs standard BTreeSet.
//!
//! Compares unique insertion (plain and hinted), lookup, erasure and
//! iteration against Rust's standard ordered set.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rbcore::tree::RbTree;
use std::collections::BTreeSet;
use std::hint::black_box;

const SIZES: [u32; 3] = [100, 1000, 10000];

/// Deterministic scattered keys.
fn scattered(size: u32) -> Vec<u32> {
    (0..size).map(|index| index.wrapping_mul(2_654_435_761) % (size * 4)).collect()
}

fn build(keys: &[u32]) -> RbTree<u32> {
    let mut tree = RbTree::new();
    for &key in keys {
        let _ = tree.insert_unique(key);
    }
    tree
}

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in SIZES {
        let keys = scattered(size);

        group.bench_with_input(BenchmarkId::new("RbTree", size), &keys, |bencher, keys| {
            bencher.iter(|| black_box(build(black_box(keys))));
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut set = BTreeSet::new();
                for &key in black_box(keys) {
                    set.insert(key);
                }
                black_box(set)
            });
        });
    }

    group.finish();
}

// =============================================================================
// hinted insert Benchmark
// =============================================================================

fn benchmark_sorted_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sorted_insert");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("RbTree/hint", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut tree = RbTree::new();
                let _ = tree.insert_unique_iter(black_box(0..size));
                black_box(tree)
            });
        });

        group.bench_with_input(BenchmarkId::new("RbTree/plain", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut tree = RbTree::new();
                for key in black_box(0..size) {
                    let _ = tree.insert_unique(key);
                }
                black_box(tree)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, &size| {
            bencher.iter(|| black_box(black_box(0..size).collect::<BTreeSet<u32>>()));
        });
    }

    group.finish();
}

// =============================================================================
// find Benchmark
// =============================================================================

fn benchmark_find(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find");

    for size in SIZES {
        let keys = scattered(size);
        let tree = build(&keys);
        let set: BTreeSet<u32> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("RbTree", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                for key in keys {
                    black_box(tree.find(black_box(key)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                for key in keys {
                    black_box(set.get(black_box(key)));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// erase Benchmark
// =============================================================================

fn benchmark_erase(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("erase");

    for size in SIZES {
        let keys = scattered(size);
        let tree = build(&keys);
        let set: BTreeSet<u32> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("RbTree", size), &keys, |bencher, keys| {
            bencher.iter_batched(
                || tree.try_clone().unwrap_or_default(),
                |mut tree| {
                    for key in keys {
                        tree.erase_key(key);
                    }
                    tree
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter_batched(
                || set.clone(),
                |mut set| {
                    for key in keys {
                        set.remove(key);
                    }
                    set
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in SIZES {
        let tree = build(&scattered(size));
        let set: BTreeSet<u32> = tree.iter().copied().collect();

        group.bench_function(BenchmarkId::new("RbTree", size), |bencher| {
            bencher.iter(|| black_box(tree.iter().map(|&key| u64::from(key)).sum::<u64>()));
        });

        group.bench_function(BenchmarkId::new("BTreeSet", size), |bencher| {
            bencher.iter(|| black_box(set.iter().map(|&key| u64::from(key)).sum::<u64>()));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_sorted_insert,
    benchmark_find,
    benchmark_erase,
    benchmark_iteration
);

criterion_main!(benches);
