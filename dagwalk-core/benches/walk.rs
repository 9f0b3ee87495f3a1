//! Walk benchmarks: a wide fan-out and a long chain through both walkers.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use dagwalk_core::{AcyclicGraph, BoxError, DependencyWalker, Edge, Graph};

fn fan_out(width: u32) -> AcyclicGraph<u32> {
    Graph::from_parts(0..=width, (1..=width).map(|v| Edge::new(0, v))).into()
}

fn chain(length: u32) -> AcyclicGraph<u32> {
    Graph::from_parts(0..length, (1..length).map(|v| Edge::new(v - 1, v))).into()
}

fn static_walk(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("static_walk");

    for size in [100u32, 1_000] {
        let wide = fan_out(size);
        group.bench_with_input(BenchmarkId::new("fan_out", size), &wide, |b, graph| {
            b.to_async(&runtime)
                .iter(|| graph.walk(|_| async { Ok::<(), BoxError>(()) }));
        });

        let long = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &long, |b, graph| {
            b.to_async(&runtime)
                .iter(|| graph.walk(|_| async { Ok::<(), BoxError>(()) }));
        });
    }

    group.finish();
}

fn dependency_walk(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("dependency_walk");

    for size in [100u32, 1_000] {
        let wide = fan_out(size);
        group.bench_with_input(BenchmarkId::new("fan_out", size), &wide, |b, graph| {
            b.to_async(&runtime).iter(|| async {
                let walker = DependencyWalker::new(|_: u32| async { Ok::<(), BoxError>(()) });
                walker.update_graph(graph);
                walker.wait().await
            });
        });
    }

    group.finish();
}

criterion_group!(benches, static_walk, dependency_walk);
criterion_main!(benches);
