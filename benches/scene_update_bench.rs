//! Update pipeline benchmarks.
//!
//! Measures one frame of `SceneManager::update` over scenes of animated
//! layers, and the idle frame where nothing is keyed.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use vanim::scene::components::{SolidFillComponent, TransformKeyframeComponent};
use vanim::scene::path::{PathListComponent, StarPolygonPath};
use vanim::scene::{SceneHandle, SceneManager};

const LAYER_COUNTS: [usize; 3] = [100, 1_000, 5_000];

fn build_scene(layers: usize, animated: bool) -> (SceneManager, SceneHandle) {
    let mut manager = SceneManager::new();
    let scene = manager.create_scene(None);

    for i in 0..layers {
        let min = Vec2::new((i % 64) as f32 * 20.0, (i / 64) as f32 * 20.0);
        let entity = if i % 2 == 0 {
            manager.create_rect_fill_stroke_layer(scene, min, Vec2::splat(16.0))
        } else {
            manager.create_star_fill_layer(scene, min, Vec2::splat(16.0))
        };
        if !animated {
            continue;
        }

        let mut keyframes = TransformKeyframeComponent::default();
        keyframes.position.add(0, min);
        keyframes.position.add(60, min + Vec2::new(0.0, 40.0));
        keyframes.rotation.add(0, 0.0);
        keyframes.rotation.add(60, 360.0);
        manager.add_component(entity, keyframes);

        let fill = manager.get_component_mut::<SolidFillComponent>(entity);
        fill.color_track.add(0, Vec3::new(255.0, 0.0, 0.0));
        fill.color_track.add(60, Vec3::new(0.0, 0.0, 255.0));

        if let Ok(star) = manager
            .get_component_mut::<PathListComponent>(entity)
            .get_mut::<StarPolygonPath>(0)
        {
            star.points_track.add(0, 5);
            star.points_track.add(60, 12);
        }
    }

    manager.update(scene, 0.0);
    (manager, scene)
}

fn bench_animated_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_animated");

    for layers in LAYER_COUNTS {
        let (mut manager, scene) = build_scene(layers, true);
        let mut frame = 0.0_f32;

        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| {
                frame = (frame + 1.0) % 60.0;
                black_box(manager.update(scene, black_box(frame)))
            });
        });
    }

    group.finish();
}

fn bench_idle_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_idle");

    for layers in LAYER_COUNTS {
        let (mut manager, scene) = build_scene(layers, false);

        group.bench_with_input(BenchmarkId::from_parameter(layers), &layers, |b, _| {
            b.iter(|| black_box(manager.update(scene, black_box(0.0))));
        });
    }

    group.finish();
}

fn bench_reorder(c: &mut Criterion) {
    let (mut manager, scene) = build_scene(1_000, false);

    c.bench_function("reorder_1000", |b| {
        b.iter(|| manager.reorder(black_box(scene)));
    });
}

criterion_group!(benches, bench_animated_frame, bench_idle_frame, bench_reorder);
criterion_main!(benches);
