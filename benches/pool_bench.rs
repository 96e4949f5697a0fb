use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use rayon::prelude::*;
use workpool::ThreadPool;

const DATA_LEN: usize = 1 << 16;
const CHUNKS: usize = 8;

fn checksum(chunk: &[u64]) -> u64 {
    chunk
        .iter()
        .fold(0u64, |acc, &x| acc.wrapping_mul(31).wrapping_add(x))
}

fn checksum_bench(c: &mut Criterion) {
    let mut rng = thread_rng();
    let data: Arc<Vec<u64>> = Arc::new((0..DATA_LEN).map(|_| rng.gen()).collect());
    let chunk_len = DATA_LEN / CHUNKS;

    let mut group = c.benchmark_group("checksum");

    group.bench_function("sequential", |b| {
        let data = Arc::clone(&data);
        b.iter(|| {
            data.chunks(chunk_len)
                .map(checksum)
                .fold(0u64, |acc, sum| acc ^ sum)
        });
    });

    group.bench_function("workpool", |b| {
        let pool = ThreadPool::new(num_cpus::get() as u32).unwrap();
        let data = Arc::clone(&data);
        b.iter(|| {
            let handles: Vec<_> = (0..CHUNKS)
                .map(|i| {
                    let data = Arc::clone(&data);
                    pool.submit(move || checksum(&data[i * chunk_len..(i + 1) * chunk_len]))
                        .unwrap()
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.wait().unwrap())
                .fold(0u64, |acc, sum| acc ^ sum)
        });
    });

    group.bench_function("rayon", |b| {
        let data = Arc::clone(&data);
        b.iter(|| {
            data.par_chunks(chunk_len)
                .map(checksum)
                .reduce(|| 0u64, |acc, sum| acc ^ sum)
        });
    });

    group.finish();
}

fn lifecycle_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    group.bench_function("single_worker", |b| {
        b.iter_batched(
            || ThreadPool::new(1).unwrap(),
            |mut pool| {
                for _ in 0..100 {
                    pool.spawn(|| {}).unwrap();
                }
                pool.shutdown();
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("one_worker_per_cpu", |b| {
        b.iter_batched(
            || ThreadPool::with_default_threads().unwrap(),
            |mut pool| {
                for _ in 0..100 {
                    pool.spawn(|| {}).unwrap();
                }
                pool.shutdown();
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, checksum_bench, lifecycle_bench);
criterion_main!(benches);
