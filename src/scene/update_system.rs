//! Update system
//!
//! Per-frame work for a single scene, split into two phases that never
//! interleave:
//!
//! 1. **Simulation**: keyframe tracks are sampled into components. Anything
//!    that changed is marked dirty.
//! 2. **Reconciliation**: each entity in the change set pushes its dirty
//!    component state into its [`Shape`](crate::scene::Shape), then its
//!    dirty mask is cleared.
//!
//! Only entities that were marked dirty pay for reconciliation.
//! [`SceneManager::update`](crate::scene::SceneManager::update) runs these
//! steps and then the transform system.

use glam::Mat3;

use crate::scene::components::{
    DirtyFlags, ShapeComponent, SolidFillComponent, StrokeComponent,
};
use crate::scene::path::PathListComponent;
use crate::scene::registry::{Registry, Storages};
use crate::scene::shape::{FillPaint, StrokePaint, to_rgba};
use crate::scene::{EntityKey, SceneHandle};

// ============================================================================
// Simulation
// ============================================================================

fn mark_all(registry: &mut Registry, keys: Vec<EntityKey>, flags: DirtyFlags) {
    for key in keys {
        registry.mark_dirty(key, flags);
    }
}

/// Samples transform keyframes into entities that have both a transform and
/// a [`TransformKeyframeComponent`](crate::scene::components::TransformKeyframeComponent).
pub fn sample_transform_keyframes(registry: &mut Registry, frame: f32) {
    let storages = &mut registry.storages;
    let mut changed = Vec::new();

    for (key, keyframes) in &storages.transform_keyframes {
        if storages.tombstones.contains_key(key) {
            continue;
        }
        if let Some(transform) = storages.transforms.get_mut(key)
            && keyframes.apply(frame, transform)
        {
            changed.push(key);
        }
    }

    mark_all(registry, changed, DirtyFlags::TRANSFORM);
}

/// Samples every path variant of every path list.
pub fn sample_paths(registry: &mut Registry, frame: f32) {
    let storages = &mut registry.storages;
    let mut changed = Vec::new();

    for (key, paths) in &mut storages.path_lists {
        if !storages.tombstones.contains_key(key) && paths.update(frame) {
            changed.push(key);
        }
    }

    mark_all(registry, changed, DirtyFlags::PATH);
}

/// Samples fill and stroke tracks.
pub fn sample_paint(registry: &mut Registry, frame: f32) {
    let storages = &mut registry.storages;
    let mut fills = Vec::new();
    let mut strokes = Vec::new();

    for (key, fill) in &mut storages.fills {
        if !storages.tombstones.contains_key(key) && fill.update(frame) {
            fills.push(key);
        }
    }
    for (key, stroke) in &mut storages.strokes {
        if !storages.tombstones.contains_key(key) && stroke.update(frame) {
            strokes.push(key);
        }
    }

    mark_all(registry, fills, DirtyFlags::FILL);
    mark_all(registry, strokes, DirtyFlags::STROKE);
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Rebuilds a shape's outline and paint from its components.
///
/// An entity without paths is hidden rather than given an empty outline.
pub fn rebuild_shape(
    shape: &mut ShapeComponent,
    paths: Option<&PathListComponent>,
    fill: Option<&SolidFillComponent>,
    stroke: Option<&StrokeComponent>,
) {
    match paths {
        Some(paths) if !paths.is_empty() => {
            shape.shape.reset();
            paths.append_to(&mut shape.shape);
            shape.shape.visible = !shape.hidden;
        }
        _ => shape.shape.visible = false,
    }

    shape.shape.fill = fill.map(|f| FillPaint {
        rgba: to_rgba(f.color, f.alpha),
        rule: f.rule,
    });
    shape.shape.stroke = stroke.map(|s| StrokePaint {
        width: s.width,
        rgba: to_rgba(s.color, s.alpha),
    });
}

/// Reconciles one entity and clears its dirty mask.
///
/// A scene proxy whose transform changed reports `(child scene, matrix)` in
/// `scene_transforms`; the caller owns the other scenes and applies it.
pub fn reconcile_entity(
    storages: &mut Storages,
    key: EntityKey,
    scene_transforms: &mut Vec<(SceneHandle, Mat3)>,
) -> bool {
    if storages.tombstones.contains_key(key) {
        return false;
    }
    let Some(dirty) = storages.dirty.get_mut(key) else {
        return false;
    };
    let flags = std::mem::take(dirty);
    if flags.is_empty() {
        return false;
    }

    if flags.contains(DirtyFlags::TRANSFORM)
        && let Some(transform) = storages.transforms.get_mut(key)
    {
        transform.update();
        let matrix = *transform.matrix();
        if let Some(shape) = storages.shapes.get_mut(key) {
            shape.shape.transform = matrix;
        }
        if let Some(scene) = storages.scenes.get(key) {
            scene_transforms.push((scene.scene, matrix));
        }
    }

    if flags.intersects(DirtyFlags::GEOMETRY)
        && let Some(shape) = storages.shapes.get_mut(key)
    {
        rebuild_shape(
            shape,
            storages.path_lists.get(key),
            storages.fills.get(key),
            storages.strokes.get(key),
        );
    }

    log::trace!("Reconciled {key:?} ({flags:?})");
    true
}

/// Reconciles the whole change set, leaving it empty.
///
/// Returns the nested-scene transforms to push (see [`reconcile_entity`]).
pub fn reconcile(registry: &mut Registry) -> Vec<(SceneHandle, Mat3)> {
    let change_set = std::mem::take(&mut registry.change_set);
    let mut scene_transforms = Vec::new();

    for key in change_set {
        reconcile_entity(&mut registry.storages, key, &mut scene_transforms);
    }

    scene_transforms
}
