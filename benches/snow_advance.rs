//! Benchmarks for the CPU-side frame work: snowfall stepping, field
//! setup and pointer picking.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use snowglobe::camera::OrbitCamera;
use snowglobe::picking;
use snowglobe::scene;
use snowglobe::snow::SnowField;
use snowglobe::{Vec2, Vec3};

const RADIUS: f32 = 30.0;

fn bench_snow_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("snow_advance");

    for candidates in [1_000, 10_000, 50_000] {
        group.bench_with_input(
            BenchmarkId::new("flakes", candidates),
            &candidates,
            |b, &candidates| {
                let mut field = SnowField::with_seed(candidates, RADIUS, 42);
                b.iter(|| field.advance())
            },
        );
    }

    group.finish();
}

fn bench_snow_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("snow_setup");

    group.bench_function("placement", |b| {
        b.iter(|| black_box(SnowField::with_seed(10_000, RADIUS, 42)))
    });

    group.bench_function("recolor_all", |b| {
        let mut field = SnowField::with_seed(10_000, RADIUS, 42);
        b.iter(|| field.recolor_all())
    });

    group.finish();
}

fn bench_picking(c: &mut Criterion) {
    let mut group = c.benchmark_group("picking");

    let snowman = scene::build_snowman();
    let world = scene::build_world();
    let camera = OrbitCamera::new();

    // World center of the snowman's base sphere, projected back to a
    // pixel so the hit ray passes straight through the figure.
    let ndc = camera
        .view_projection()
        .project_point3(Vec3::new(0.0, -16.0, 5.0));
    let hit_pixel = Vec2::new((ndc.x + 1.0) * 0.5 * 800.0, (1.0 - ndc.y) * 0.5 * 600.0);

    group.bench_function("click_hit", |b| {
        b.iter(|| {
            black_box(picking::test_click(
                hit_pixel,
                800,
                600,
                &camera,
                Some(&snowman),
            ))
        })
    });

    // A miss walks every triangle of the subtree; this is the worst case.
    group.bench_function("click_miss", |b| {
        let pixel = Vec2::new(4.0, 4.0);
        b.iter(|| {
            black_box(picking::test_click(
                pixel,
                800,
                600,
                &camera,
                Some(&snowman),
            ))
        })
    });

    group.bench_function("world_bounding_sphere", |b| {
        b.iter(|| black_box(world.bounding_sphere()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_snow_advance,
    bench_snow_setup,
    bench_picking,
);
criterion_main!(benches);
