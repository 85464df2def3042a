//! Benchmarks for the spectral index pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fieldscan_algorithms::imagery::{
    compute_all, ndvi, normalize_stack, summarize, EngineOptions, SessionMetadata,
};
use fieldscan_core::{BandStack, Raster};

fn create_band(size: usize, base: f64) -> Raster {
    let mut r = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn create_stack(size: usize) -> BandStack {
    let bases = [80.0, 120.0, 150.0, 100.0, 180.0, 220.0, 260.0, 300.0];
    BandStack::from_rasters(bases.iter().map(|&b| create_band(size, b)).collect()).unwrap()
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024, 2048] {
        let nir = create_band(size, 300.0);
        let red = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/catalog");
    group.sample_size(20);
    let options = EngineOptions::default();
    for size in [256, 512, 1024] {
        let stack = create_stack(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compute_all(black_box(&stack), &options).unwrap())
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/normalize");
    for size in [256, 1024] {
        let stack = create_stack(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| normalize_stack(black_box(&stack)).unwrap())
        });
    }
    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let stack = create_stack(512);
    let indices = compute_all(&stack, &EngineOptions::default()).unwrap();
    c.bench_function("imagery/summary/512", |b| {
        b.iter(|| summarize(black_box(&indices), SessionMetadata::default()).unwrap())
    });
}

criterion_group!(benches, bench_ndvi, bench_catalog, bench_normalize, bench_summary);
criterion_main!(benches);
