//! Benchmarks for per-frame grid maintenance and proximity queries.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orbfield::prelude::*;

const WIDTH: f32 = 1920.0;
const HEIGHT: f32 = 1080.0;

fn field(count: usize) -> Simulation {
    let config = OrbConfig::default()
        .with_particle_count(count)
        .with_seed(1);
    match Simulation::new(config, WIDTH, HEIGHT) {
        Ok(sim) => sim,
        Err(e) => panic!("bench setup failed: {e}"),
    }
}

/// All-pairs scan the grid is meant to replace.
fn brute_force_edges(orbs: &[Orb], threshold: f32) -> usize {
    let threshold_sq = threshold * threshold;
    let mut edges = 0;
    for i in 0..orbs.len() {
        for j in (i + 1)..orbs.len() {
            if orbs[i].position().distance_squared(orbs[j].position()) <= threshold_sq {
                edges += 1;
            }
        }
    }
    edges
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for count in [250, 1_000, 4_000] {
        group.bench_with_input(BenchmarkId::new("advance_all", count), &count, |b, &count| {
            let mut sim = field(count);
            b.iter(|| black_box(sim.step().ok()))
        });
    }

    group.finish();
}

fn bench_proximity(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity");

    for count in [250, 1_000, 4_000] {
        let sim = field(count);
        group.bench_with_input(BenchmarkId::new("grid", count), &sim, |b, sim| {
            b.iter(|| black_box(sim.query().map(|g| g.len()).ok()))
        });
        group.bench_with_input(BenchmarkId::new("brute_force", count), &sim, |b, sim| {
            b.iter(|| black_box(brute_force_edges(sim.orbs(), sim.config().threshold)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_proximity);
criterion_main!(benches);
