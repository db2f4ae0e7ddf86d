/*
 * Particle Swarm Benchmark
 *
 * Measures the per-frame update with brute force and grid neighbor queries,
 * and the cost of spawning with automatic spring formation.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use particle_swarm::{Emitter, ParticleSystem, SimulationParams, SpatialGrid};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn populated_system(n: usize, springs: bool) -> ParticleSystem {
    let mut rng = StdRng::seed_from_u64(42);
    let mut system = ParticleSystem::with_seed(Rect::from_w_h(WIDTH, HEIGHT), n, 42);
    system.spring_formation.enabled = springs;

    let emitter = Emitter::default();
    for _ in 0..n {
        let position = pt2(
            rng.gen_range(-WIDTH / 2.0..WIDTH / 2.0),
            rng.gen_range(-HEIGHT / 2.0..HEIGHT / 2.0),
        );
        system.add_particle(emitter.build(position, &mut rng));
    }
    system
}

// Benchmark the overall update loop
fn bench_update_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_loop");
    let config = SimulationParams::default().frame_config();

    for num_particles in [100, 500, 1200].iter() {
        group.bench_with_input(BenchmarkId::new("brute_force", num_particles), num_particles, |b, &n| {
            let mut system = populated_system(n, false);
            b.iter(|| {
                system.update(black_box(&config));
            });
        });

        group.bench_with_input(BenchmarkId::new("spatial_grid", num_particles), num_particles, |b, &n| {
            let mut system = populated_system(n, false);
            system.set_neighbor_query(Box::new(SpatialGrid::new(50.0)));
            b.iter(|| {
                system.update(black_box(&config));
            });
        });
    }

    group.finish();
}

// Benchmark spawning with spring formation
fn bench_spawning(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawning");

    for num_particles in [100, 500, 1200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_particles), num_particles, |b, &n| {
            b.iter(|| black_box(populated_system(n, true).spring_count()));
        });
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_update_loop, bench_spawning
}

criterion_main!(benches);
