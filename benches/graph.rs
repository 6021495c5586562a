//! Benchmarks for building and repairing the neighbour/associate graph.
//!
//! Repair cost after a removal is what separates DROP from naive
//! "recompute everything" editing; these measure both sides.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dropreg::{Dataset, Instance, LinearSearch, NeighborGraph, NeighborSearch};
use rand::prelude::*;

fn random_dataset(n: usize, dim: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let x: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>()).collect();
            let y = rng.gen::<f64>();
            Instance::new(x, y)
        })
        .collect()
}

fn built(data: &Dataset, k: usize) -> (NeighborGraph, LinearSearch) {
    let mut search = LinearSearch::default();
    search.set_reference_set(data).unwrap();
    let positions: Vec<usize> = (0..data.len()).collect();
    let mut graph = NeighborGraph::new(data.len(), k);
    graph.compute_neighbors(data, &search, &positions).unwrap();
    graph.compute_associates(data, &search);
    (graph, search)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for n in [100, 500, 1000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let data = random_dataset(*n, 8);

        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |bench, data| {
            bench.iter(|| built(black_box(data), 3));
        });
    }

    group.finish();
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_repair");

    for n in [100, 500, 1000].iter() {
        let data = random_dataset(*n, 8);
        let (graph, mut search) = built(&data, 3);

        // Remove the instance with the most associates: the worst single repair.
        let victim = (0..data.len())
            .max_by_key(|&p| graph.associates(p).len())
            .unwrap_or(0);
        let survivors: Dataset = data
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != victim)
            .map(|(_, i)| i.clone())
            .collect();
        let to_working: Vec<usize> = (0..data.len()).filter(|&p| p != victim).collect();
        search.set_reference_set(&survivors).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                let mut g = graph.clone();
                let plan = g
                    .plan_repair(victim, &data, &search, &to_working)
                    .unwrap();
                g.apply_repair(plan)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_repair);
criterion_main!(benches);
