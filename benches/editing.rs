//! Benchmarks for complete editing runs.
//!
//! Key questions:
//! - How does a full run scale with n for each variant?
//! - What does the noise pre-filter cost on its own?

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dropreg::{Dataset, DropEngine, EnnReg, Instance, NoiseFilter, Variant};
use rand::prelude::*;

// === Generators ===

/// Noisy samples of a smooth function of the features.
fn regression_dataset(n: usize, dim: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let x: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
            let y = x.iter().map(|v| v.sin()).sum::<f64>() + rng.gen::<f64>() * 0.1;
            Instance::new(x, y)
        })
        .collect()
}

// === Benchmarks ===

fn bench_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_steps");
    group.sample_size(10);

    for n in [100, 250, 500].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let data = regression_dataset(*n, 4);

        for variant in Variant::ALL {
            group.bench_with_input(
                BenchmarkId::new(variant.name(), n),
                &data,
                |bench, data| {
                    bench.iter(|| {
                        let mut engine = DropEngine::new(variant);
                        engine.reset_with_identity(black_box(data.clone())).unwrap();
                        engine.all_steps().unwrap();
                        engine.output_indices().len()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_neighbours(c: &mut Criterion) {
    let mut group = c.benchmark_group("k");
    group.sample_size(10);
    let data = regression_dataset(300, 4);

    for k in [1usize, 3, 5, 9].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, &k| {
            bench.iter(|| {
                let mut engine = DropEngine::new(Variant::Drop2Threshold);
                engine.set_num_neighbors(k).unwrap();
                engine.reset_with_identity(data.clone()).unwrap();
                engine.all_steps().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_noise_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("enn_reg");

    for n in [100, 500, 1000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let data = regression_dataset(*n, 4);
        let indices: Vec<usize> = (0..*n).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                EnnReg::default()
                    .run(black_box(&data), &indices, 1.0, 3)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_variants, bench_neighbours, bench_noise_filter);
criterion_main!(benches);
