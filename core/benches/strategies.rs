//! Throughput of DES-ECB over a 16 MiB buffer: serial baseline against both
//! concurrency strategies at a few worker counts.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use des_parallel_core::prelude::*;

const BUFFER_LEN: usize = 16 * 1024 * 1024;
const CHUNK_SIZE: usize = 1024 * 1024;

fn bench_encrypt(c: &mut Criterion) {
    let engine = DesEngine::new(None).unwrap();
    let data: Vec<u8> = (0..BUFFER_LEN).map(|i| (i % 251) as u8).collect();

    let mut group = c.benchmark_group("des_encrypt");
    group.throughput(Throughput::Bytes(BUFFER_LEN as u64));
    group.sample_size(10);

    group.bench_function("serial", |b| {
        b.iter(|| engine.encrypt_serial(black_box(&data)).unwrap())
    });

    for kind in StrategyKind::ALL {
        let strategy = kind.build(Duration::from_secs(120));
        for workers in [1usize, 2, 4, 8] {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), workers), &workers, |b, &w| {
                b.iter(|| {
                    engine
                        .encrypt_parallel(data.clone(), w, CHUNK_SIZE, strategy.as_ref())
                        .unwrap()
                })
            });
        }
    }
    group.finish();
}

fn bench_dispatch_overhead(c: &mut Criterion) {
    let data = vec![0u8; BUFFER_LEN];
    let identity: std::sync::Arc<dyn BlockTransform> = std::sync::Arc::new(IdentityTransform);

    let mut group = c.benchmark_group("dispatch_overhead");
    group.sample_size(10);
    for kind in StrategyKind::ALL {
        let strategy = kind.build(Duration::from_secs(120));
        for chunk_size in [64 * 1024, CHUNK_SIZE] {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), chunk_size), &chunk_size, |b, &cs| {
                b.iter(|| strategy.encode(identity.clone(), data.clone().into(), 4, cs).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt, bench_dispatch_overhead);
criterion_main!(benches);
