//! Authors a short animation through the edit API, then plays it back.
//!
//! Run with `RUST_LOG=info` (or `debug` to see every committed edit).

use glam::{Vec2, Vec3};
use vanim::animation::{AnimationClock, LoopMode};
use vanim::edit::api::{self, EditTransform};
use vanim::scene::components::ShapeComponent;
use vanim::{EditStatus, Editor, EditorSettings};

fn main() -> vanim::Result<()> {
    env_logger::init();

    let settings = EditorSettings::from_json_str(r#"{ "star_points": 6 }"#)?;
    let mut editor = Editor::new(settings);
    let canvas = editor.create_canvas();
    editor.focus(canvas);

    let Some(scene_id) = editor.main_scene_id() else {
        log::error!("No focused canvas");
        return Ok(());
    };
    let star = api::create_star_path_entity(&mut editor, scene_id, Vec2::new(-40.0, -200.0), Vec2::splat(80.0));
    log::info!("Created star {star}");

    // === 1. Author keyframes while paused ===
    let keys = [
        (0.0, Vec2::new(0.0, -160.0), 0.0),
        (15.0, Vec2::new(0.0, 160.0), 90.0),
        (30.0, Vec2::new(0.0, -160.0), 180.0),
    ];
    for (frame, position, rotation) in keys {
        seek(&mut editor, frame);
        let transform = EditTransform {
            position,
            scale: Vec2::ONE,
            rotation,
        };
        check(api::update_entity_transform(&mut editor, star, &transform, true));
    }

    seek(&mut editor, 15.0);
    check(api::update_fill_color(&mut editor, star, Vec3::new(255.0, 180.0, 0.0), true));
    check(api::update_star_path_inner_radius(&mut editor, star, 0, 12.0, true));

    // === 2. Play back one loop ===
    if let Some(canvas) = editor.focused_canvas_mut() {
        canvas.timeline.stop();
        canvas.timeline.end_frame = 30.0;
        canvas.timeline.loop_mode = LoopMode::Loop;
        canvas.timeline.play();
    }

    for _ in 0..10 {
        let changed = editor.tick(1.0 / 10.0);
        let manager = editor.manager();
        let Some(entity) = manager.try_get_entity_by_id(star) else {
            break;
        };
        let shape = &manager.get_component::<ShapeComponent>(entity).shape;
        log::info!(
            "frame {:5.1}: origin {:?}, {} points, repaint {changed}",
            editor.current_frame(),
            shape.transform.transform_point2(Vec2::ZERO),
            shape.points().len(),
        );
    }

    Ok(())
}

fn seek(editor: &mut Editor, frame: f32) {
    if let Some(canvas) = editor.focused_canvas_mut() {
        canvas.timeline.seek(frame);
    }
}

fn check(status: EditStatus) {
    if !status.is_success() {
        log::warn!("Edit returned status {}", status.code());
    }
}
