//! Basic benchmarks for the `managed_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use managed_pool::{ManagedPool, PoolOwned};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("mp_basic");

    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(ManagedPool::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    group.bench_function("insert_first", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(ManagedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();
            let mut handles = Vec::with_capacity(pools.len());

            let start = Instant::now();

            for pool in &mut pools {
                handles.push(black_box(pool.insert(black_box(TEST_VALUE))));
            }

            start.elapsed()
        });
    });

    group.bench_function("insert_reused", |b| {
        b.iter_custom(|iters| {
            let mut pool = ManagedPool::<TestItem>::new();

            // Pre-warm the pool so every insert reuses a recycled slot.
            drop(pool.insert(TEST_VALUE).unwrap());

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(pool.insert(black_box(TEST_VALUE))));
            }

            start.elapsed()
        });
    });

    group.bench_function("clone_drop_handle", |b| {
        b.iter_custom(|iters| {
            let mut pool = ManagedPool::<TestItem>::new();
            let handle = pool.insert(TEST_VALUE).unwrap();

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(handle.clone()));
            }

            start.elapsed()
        });
    });

    group.bench_function("get_by_id", |b| {
        b.iter_custom(|iters| {
            let mut pool = ManagedPool::<TestItem, 64, PoolOwned>::new();

            for _ in 0..1000 {
                drop(pool.insert(TEST_VALUE).unwrap());
            }

            let start = Instant::now();

            for id in 0..iters {
                let id = u32::try_from(id % 1000).unwrap();
                drop(black_box(pool.get(black_box(id))));
            }

            start.elapsed()
        });
    });

    group.bench_function("iterate_1000", |b| {
        b.iter_custom(|iters| {
            let mut pool = ManagedPool::<TestItem, 64, PoolOwned>::new();

            for _ in 0..1000 {
                drop(pool.insert(TEST_VALUE).unwrap());
            }

            let start = Instant::now();

            for _ in 0..iters {
                for handle in &pool {
                    black_box(*handle);
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}
