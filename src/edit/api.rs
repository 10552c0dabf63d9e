//! Id-based edit operations
//!
//! Everything here addresses entities and scenes by [`EntityId`] and reports
//! an [`EditStatus`] (or `0` for a failed creation) instead of panicking.
//! Rejected edits are no-ops and leave the scene untouched.
//!
//! While the focused canvas is paused, every property edit also writes a
//! keyframe at the current frame, so scrubbing and editing is how animation
//! is authored. `is_end` marks the last edit of a drag gesture.

use glam::Vec2;

use crate::animation::Color;
use crate::edit::{Canvas, Editor};
use crate::errors::{EditStatus, Result, VanimError};
use crate::scene::components::{
    ControlOutlineComponent, DirtyFlags, ShapeComponent, SolidFillComponent, StrokeComponent,
    TransformKeyframeComponent,
};
use crate::scene::path::{
    EllipsePath, PathPoint, PathPointType, PathVariant, PolygonPath, RawPath, RectPath,
    StarPolygonPath,
};
use crate::scene::transform::{TransformComponent, WorldTransformComponent};
use crate::scene::{
    ChangeOrder, Component, Entity, EntityId, NULL_ENTITY_ID, SceneHandle, SceneManager,
};

/// Full transform edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditTransform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Degrees.
    pub rotation: f32,
}

/// A raw path point as seen by the path editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditPathPoint {
    pub position: Vec2,
    /// Offset of the incoming control point from `position`.
    pub left_control: Vec2,
    /// Offset of the outgoing control point from `position`.
    pub right_control: Vec2,
    pub point_type: PathPointType,
}

impl From<&EditPathPoint> for PathPoint {
    fn from(point: &EditPathPoint) -> Self {
        let mut converted = PathPoint::new(point.position, point.point_type);
        converted.left_control = point.left_control;
        converted.right_control = point.right_control;
        converted
    }
}

impl From<&PathPoint> for EditPathPoint {
    fn from(point: &PathPoint) -> Self {
        Self {
            position: point.position,
            left_control: point.left_control,
            right_control: point.right_control,
            point_type: point.point_type,
        }
    }
}

/// Values an edit can carry. NaN and infinities are rejected before any
/// state changes.
trait EditValue {
    fn finite(&self) -> bool;
}

impl EditValue for f32 {
    fn finite(&self) -> bool {
        self.is_finite()
    }
}

impl EditValue for i32 {
    fn finite(&self) -> bool {
        true
    }
}

impl EditValue for Vec2 {
    fn finite(&self) -> bool {
        self.is_finite()
    }
}

impl EditValue for Color {
    fn finite(&self) -> bool {
        self.is_finite()
    }
}

impl EditValue for EditTransform {
    fn finite(&self) -> bool {
        self.position.is_finite() && self.scale.is_finite() && self.rotation.is_finite()
    }
}

impl EditValue for EditPathPoint {
    fn finite(&self) -> bool {
        self.position.is_finite() && self.left_control.is_finite() && self.right_control.is_finite()
    }
}

fn ensure_finite<V: EditValue>(value: &V) -> Result<()> {
    if value.finite() {
        Ok(())
    } else {
        Err(VanimError::NonFiniteValue)
    }
}

fn report(op: &str, id: EntityId, result: Result<()>, is_end: bool) -> EditStatus {
    match &result {
        Err(err) => log::warn!("{op}({id}) rejected: {err}"),
        Ok(()) if is_end => log::debug!("{op}({id}) committed"),
        Ok(()) => {}
    }
    EditStatus::from(result)
}

fn find_scene(manager: &SceneManager, scene_id: EntityId) -> Result<SceneHandle> {
    manager
        .find_scene(scene_id)
        .ok_or(VanimError::SceneNotFound(scene_id))
}

fn entity_id_or_null(manager: &SceneManager, entity: Entity) -> EntityId {
    manager.entity_id(entity).unwrap_or(NULL_ENTITY_ID)
}

// ============================================================================
// Creation and destruction
// ============================================================================

fn create_layer(
    editor: &mut Editor,
    scene_id: EntityId,
    bounds: (Vec2, Vec2),
    factory: impl FnOnce(&mut SceneManager, SceneHandle) -> Entity,
) -> EntityId {
    let manager = editor.manager_mut();
    let scene = ensure_finite(&bounds.0)
        .and_then(|()| ensure_finite(&bounds.1))
        .and_then(|()| find_scene(manager, scene_id));
    match scene {
        Ok(scene) => {
            let entity = factory(manager, scene);
            entity_id_or_null(manager, entity)
        }
        Err(err) => {
            log::warn!("Layer creation rejected: {err}");
            NULL_ENTITY_ID
        }
    }
}

/// Rectangle layer covering `min .. min + size`. Returns `0` for an unknown scene.
pub fn create_rect_path_entity(editor: &mut Editor, scene_id: EntityId, min: Vec2, size: Vec2) -> EntityId {
    create_layer(editor, scene_id, (min, size), |m, s| m.create_rect_fill_layer(s, min, size))
}

pub fn create_ellipse_path_entity(editor: &mut Editor, scene_id: EntityId, min: Vec2, size: Vec2) -> EntityId {
    create_layer(editor, scene_id, (min, size), |m, s| m.create_ellipse_fill_layer(s, min, size))
}

pub fn create_polygon_path_entity(editor: &mut Editor, scene_id: EntityId, min: Vec2, size: Vec2) -> EntityId {
    create_layer(editor, scene_id, (min, size), |m, s| m.create_polygon_fill_layer(s, min, size))
}

pub fn create_star_path_entity(editor: &mut Editor, scene_id: EntityId, min: Vec2, size: Vec2) -> EntityId {
    create_layer(editor, scene_id, (min, size), |m, s| m.create_star_fill_layer(s, min, size))
}

/// Freeform path through scene-space `points`. Returns `0` for an unknown
/// scene or an empty point list.
pub fn create_path_entity(editor: &mut Editor, scene_id: EntityId, points: &[EditPathPoint]) -> EntityId {
    let manager = editor.manager_mut();
    let result = points
        .iter()
        .try_for_each(ensure_finite)
        .and_then(|()| find_scene(manager, scene_id))
        .and_then(|scene| manager.create_path_layer(scene, points.iter().map(PathPoint::from).collect()));
    match result {
        Ok(entity) => entity_id_or_null(manager, entity),
        Err(err) => {
            log::warn!("Path layer creation rejected: {err}");
            NULL_ENTITY_ID
        }
    }
}

pub fn destroy(editor: &mut Editor, id: EntityId) -> EditStatus {
    let manager = editor.manager_mut();
    // A live entity the manager refuses to destroy is a top-level scene proxy
    let result = manager.resolve(id).and_then(|entity| {
        if manager.destroy_entity(entity) {
            Ok(())
        } else {
            Err(VanimError::ProtectedEntity(id))
        }
    });
    report("destroy", id, result, true)
}

pub fn set_dirty(editor: &mut Editor, id: EntityId, flags: DirtyFlags) -> EditStatus {
    let manager = editor.manager_mut();
    let result = manager.resolve(id).map(|entity| manager.set_dirty(entity, flags));
    report("set_dirty", id, result, false)
}

// ============================================================================
// Transform
// ============================================================================

#[derive(Clone, Copy)]
enum TransformChannel {
    Position,
    Scale,
    Rotation,
}

/// Applies `edit` to the entity's transform and, when authoring, keys the
/// listed channels at the current frame. A non-finite `value` is rejected.
fn edit_transform(
    editor: &mut Editor,
    id: EntityId,
    channels: &[TransformChannel],
    value: &impl EditValue,
    edit: impl FnOnce(&mut TransformComponent),
) -> Result<()> {
    ensure_finite(value)?;
    let frame = editor.authoring_frame();
    let manager = editor.manager_mut();
    let entity = manager.resolve(id)?;

    let transform = manager
        .try_get_component_mut::<TransformComponent>(entity)
        .ok_or(VanimError::MissingComponent(TransformComponent::NAME))?;
    edit(transform);
    let (position, scale, rotation) = (transform.position, transform.scale, transform.rotation);

    if let Some(frame) = frame {
        manager.try_add_component(entity, TransformKeyframeComponent::default());
        let tracks = manager
            .try_get_component_mut::<TransformKeyframeComponent>(entity)
            .ok_or(VanimError::MissingComponent(TransformKeyframeComponent::NAME))?;
        for channel in channels {
            match channel {
                TransformChannel::Position => tracks.position.add(frame, position),
                TransformChannel::Scale => tracks.scale.add(frame, scale),
                TransformChannel::Rotation => tracks.rotation.add(frame, rotation),
            }
        }
    }

    manager.set_dirty(entity, DirtyFlags::TRANSFORM);
    Ok(())
}

pub fn update_entity_transform(editor: &mut Editor, id: EntityId, value: &EditTransform, is_end: bool) -> EditStatus {
    use TransformChannel::{Position, Rotation, Scale};
    let result = edit_transform(editor, id, &[Position, Scale, Rotation], value, |t| {
        t.position = value.position;
        t.scale = value.scale;
        t.rotation = value.rotation;
    });
    report("update_entity_transform", id, result, is_end)
}

pub fn update_entity_position(editor: &mut Editor, id: EntityId, position: Vec2, is_end: bool) -> EditStatus {
    let result = edit_transform(editor, id, &[TransformChannel::Position], &position, |t| t.position = position);
    report("update_entity_position", id, result, is_end)
}

pub fn update_entity_delta_position(editor: &mut Editor, id: EntityId, delta: Vec2, is_end: bool) -> EditStatus {
    let result = edit_transform(editor, id, &[TransformChannel::Position], &delta, |t| t.position += delta);
    report("update_entity_delta_position", id, result, is_end)
}

/// `rotation` in degrees.
pub fn update_entity_rotation(editor: &mut Editor, id: EntityId, rotation: f32, is_end: bool) -> EditStatus {
    let result = edit_transform(editor, id, &[TransformChannel::Rotation], &rotation, |t| t.rotation = rotation);
    report("update_entity_rotation", id, result, is_end)
}

pub fn update_entity_delta_rotation(editor: &mut Editor, id: EntityId, delta: f32, is_end: bool) -> EditStatus {
    let result = edit_transform(editor, id, &[TransformChannel::Rotation], &delta, |t| t.rotation += delta);
    report("update_entity_delta_rotation", id, result, is_end)
}

pub fn update_entity_scale(editor: &mut Editor, id: EntityId, scale: Vec2, is_end: bool) -> EditStatus {
    let result = edit_transform(editor, id, &[TransformChannel::Scale], &scale, |t| t.scale = scale);
    report("update_entity_scale", id, result, is_end)
}

/// Translates the entity without keying it.
pub fn move_by_delta(editor: &mut Editor, id: EntityId, delta: Vec2) -> EditStatus {
    let manager = editor.manager_mut();
    let result = ensure_finite(&delta).and_then(|()| manager.resolve(id)).and_then(|entity| {
        if manager.move_by_delta(entity, delta) {
            Ok(())
        } else {
            Err(VanimError::MissingComponent(TransformComponent::NAME))
        }
    });
    report("move_by_delta", id, result, false)
}

// ============================================================================
// Paint
// ============================================================================

/// Applies `edit` to the entity's `T` and marks `flags`. The closure receives
/// the authoring frame, if any.
fn edit_component<T: Component>(
    editor: &mut Editor,
    id: EntityId,
    flags: DirtyFlags,
    value: &impl EditValue,
    edit: impl FnOnce(&mut T, Option<u32>),
) -> Result<()> {
    ensure_finite(value)?;
    let frame = editor.authoring_frame();
    let manager = editor.manager_mut();
    let entity = manager.resolve(id)?;
    let component = manager
        .try_get_component_mut::<T>(entity)
        .ok_or(VanimError::MissingComponent(T::NAME))?;
    edit(component, frame);
    manager.set_dirty(entity, flags);
    Ok(())
}

pub fn update_fill_color(editor: &mut Editor, id: EntityId, color: Color, is_end: bool) -> EditStatus {
    let result = edit_component::<SolidFillComponent>(editor, id, DirtyFlags::FILL, &color, |fill, frame| {
        fill.color = color;
        if let Some(frame) = frame {
            fill.color_track.add(frame, color);
        }
    });
    report("update_fill_color", id, result, is_end)
}

pub fn update_fill_alpha(editor: &mut Editor, id: EntityId, alpha: f32, is_end: bool) -> EditStatus {
    let result = edit_component::<SolidFillComponent>(editor, id, DirtyFlags::FILL, &alpha, |fill, frame| {
        fill.alpha = alpha;
        if let Some(frame) = frame {
            fill.alpha_track.add(frame, alpha);
        }
    });
    report("update_fill_alpha", id, result, is_end)
}

pub fn update_stroke_width(editor: &mut Editor, id: EntityId, width: f32, is_end: bool) -> EditStatus {
    let result = edit_component::<StrokeComponent>(editor, id, DirtyFlags::STROKE, &width, |stroke, frame| {
        stroke.width = width;
        if let Some(frame) = frame {
            stroke.width_track.add(frame, width);
        }
    });
    report("update_stroke_width", id, result, is_end)
}

pub fn update_stroke_color(editor: &mut Editor, id: EntityId, color: Color, is_end: bool) -> EditStatus {
    let result = edit_component::<StrokeComponent>(editor, id, DirtyFlags::STROKE, &color, |stroke, frame| {
        stroke.color = color;
        if let Some(frame) = frame {
            stroke.color_track.add(frame, color);
        }
    });
    report("update_stroke_color", id, result, is_end)
}

pub fn update_stroke_alpha(editor: &mut Editor, id: EntityId, alpha: f32, is_end: bool) -> EditStatus {
    let result = edit_component::<StrokeComponent>(editor, id, DirtyFlags::STROKE, &alpha, |stroke, frame| {
        stroke.alpha = alpha;
        if let Some(frame) = frame {
            stroke.alpha_track.add(frame, alpha);
        }
    });
    report("update_stroke_alpha", id, result, is_end)
}

fn toggle_component(
    editor: &mut Editor,
    id: EntityId,
    toggle: impl FnOnce(&mut SceneManager, Entity) -> bool,
    flags: DirtyFlags,
) -> EditStatus {
    let manager = editor.manager_mut();
    let Some(entity) = manager.try_get_entity_by_id(id) else {
        log::warn!("Component toggle on unknown entity {id}");
        return EditStatus::InvalidEntity;
    };
    if toggle(manager, entity) {
        manager.set_dirty(entity, flags);
        EditStatus::Success
    } else {
        EditStatus::Fail
    }
}

/// Attaches a default fill. Fails if the entity already has one.
pub fn add_fill_component(editor: &mut Editor, id: EntityId) -> EditStatus {
    let fill = SolidFillComponent::from_settings(editor.manager().settings());
    toggle_component(editor, id, |m, e| m.try_add_component(e, fill), DirtyFlags::FILL)
}

pub fn remove_fill_component(editor: &mut Editor, id: EntityId) -> EditStatus {
    toggle_component(
        editor,
        id,
        |m, e| m.try_remove_component::<SolidFillComponent>(e),
        DirtyFlags::PATH,
    )
}

/// Attaches a default stroke. Fails if the entity already has one.
pub fn add_stroke_component(editor: &mut Editor, id: EntityId) -> EditStatus {
    let stroke = StrokeComponent::from_settings(editor.manager().settings());
    toggle_component(editor, id, |m, e| m.try_add_component(e, stroke), DirtyFlags::STROKE)
}

pub fn remove_stroke_component(editor: &mut Editor, id: EntityId) -> EditStatus {
    toggle_component(
        editor,
        id,
        |m, e| m.try_remove_component::<StrokeComponent>(e),
        DirtyFlags::PATH,
    )
}

// ============================================================================
// Paths
// ============================================================================

/// Resolves path `path_index` of `id` as a `P` and applies `edit` with the
/// authoring frame. An entity without paths reports an invalid index.
fn set_path_property<P: PathVariant>(
    editor: &mut Editor,
    id: EntityId,
    path_index: usize,
    value: &impl EditValue,
    edit: impl FnOnce(&mut P, Option<u32>) -> Result<()>,
) -> Result<()> {
    ensure_finite(value)?;
    let frame = editor.authoring_frame();
    let manager = editor.manager_mut();
    let entity = manager.resolve(id)?;
    edit(manager.path_mut::<P>(entity, path_index)?, frame)?;
    manager.set_dirty(entity, DirtyFlags::PATH);
    Ok(())
}

macro_rules! path_property_setters {
    ($($(#[$meta:meta])* $name:ident => $path:ty, $field:ident, $track:ident: $value:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(
                editor: &mut Editor,
                id: EntityId,
                path_index: usize,
                value: $value,
                is_end: bool,
            ) -> EditStatus {
                let result = set_path_property::<$path>(editor, id, path_index, &value, |path, frame| {
                    path.$field = value;
                    if let Some(frame) = frame {
                        path.$track.add(frame, value);
                    }
                    Ok(())
                });
                report(stringify!($name), id, result, is_end)
            }
        )*
    };
}

path_property_setters! {
    /// Corner radius of a rect path.
    update_rect_path_radius => RectPath, radius, radius_track: f32;
    update_rect_path_position => RectPath, position, position_track: Vec2;
    update_rect_path_scale => RectPath, scale, scale_track: Vec2;

    update_ellipse_path_position => EllipsePath, position, position_track: Vec2;
    update_ellipse_path_scale => EllipsePath, scale, scale_track: Vec2;

    /// Corner count; fewer than 3 is drawn as a triangle.
    update_polygon_path_points => PolygonPath, points, points_track: i32;
    /// Degrees.
    update_polygon_path_rotation => PolygonPath, rotation, rotation_track: f32;
    update_polygon_path_outer_radius => PolygonPath, outer_radius, outer_radius_track: f32;
    update_polygon_path_position => PolygonPath, position, position_track: Vec2;

    update_star_path_points => StarPolygonPath, points, points_track: i32;
    update_star_path_rotation => StarPolygonPath, rotation, rotation_track: f32;
    update_star_path_outer_radius => StarPolygonPath, outer_radius, outer_radius_track: f32;
    update_star_path_inner_radius => StarPolygonPath, inner_radius, inner_radius_track: f32;
    update_star_path_position => StarPolygonPath, position, position_track: Vec2;
}

/// Inserts a point into a raw path before `point_index`, or appends it.
///
/// Inserting reshapes the path rather than animating it, so no keyframe is written.
pub fn add_path_point(
    editor: &mut Editor,
    id: EntityId,
    path_index: usize,
    point: &EditPathPoint,
    point_index: Option<usize>,
) -> EditStatus {
    let result = set_path_property::<RawPath>(editor, id, path_index, point, |path, _| {
        path.insert_point(point_index, PathPoint::from(point))
    });
    report("add_path_point", id, result, true)
}

/// Moves an existing raw path point and its control handles.
pub fn update_path_point(
    editor: &mut Editor,
    id: EntityId,
    path_index: usize,
    point_index: usize,
    point: &EditPathPoint,
    is_end: bool,
) -> EditStatus {
    let result = set_path_property::<RawPath>(editor, id, path_index, point, |path, frame| {
        let target = path.point_mut(point_index)?;
        target.position = point.position;
        target.left_control = point.left_control;
        target.right_control = point.right_control;
        target.point_type = point.point_type;
        if let Some(frame) = frame {
            target.position_track.add(frame, point.position);
            target.left_control_track.add(frame, point.left_control);
            target.right_control_track.add(frame, point.right_control);
        }
        Ok(())
    });
    report("update_path_point", id, result, is_end)
}

/// Reads back a raw path point, e.g. to seed a drag.
pub fn path_point(editor: &Editor, id: EntityId, path_index: usize, point_index: usize) -> Result<EditPathPoint> {
    let manager = editor.manager();
    let entity = manager.resolve(id)?;
    let path = manager.path::<RawPath>(entity, path_index)?;
    path.points
        .get(point_index)
        .map(EditPathPoint::from)
        .ok_or(VanimError::PointIndexOutOfRange {
            index: point_index,
            len: path.points.len(),
        })
}

/// Moves path `path_index` of `source_id` to the end of `target_id`'s list.
pub fn move_path(editor: &mut Editor, source_id: EntityId, path_index: usize, target_id: EntityId) -> EditStatus {
    let manager = editor.manager_mut();
    let result = manager.resolve(source_id).and_then(|source| {
        let target = manager.resolve(target_id)?;
        manager.move_path(source, path_index, target)
    });
    report("move_path", source_id, result, true)
}

// ============================================================================
// Draw order and queries
// ============================================================================

/// `Success` if the entity moved. Moving past either end is a `Fail` no-op.
pub fn change_draw_order(editor: &mut Editor, id: EntityId, order: ChangeOrder) -> EditStatus {
    let manager = editor.manager_mut();
    let Some(entity) = manager.try_get_entity_by_id(id) else {
        return EditStatus::InvalidEntity;
    };
    if manager.change_draw_order(entity, order) {
        EditStatus::Success
    } else {
        EditStatus::Fail
    }
}

/// Ids of the live entities in scene `scene_id` that carry a `T`.
#[must_use]
pub fn find_by_component<T: Component>(editor: &Editor, scene_id: EntityId) -> Vec<EntityId> {
    let manager = editor.manager();
    let Some(scene) = manager.find_scene(scene_id) else {
        return Vec::new();
    };
    manager
        .find_by_component::<T>(scene)
        .into_iter()
        .filter_map(|entity| manager.entity_id(entity))
        .collect()
}

// ============================================================================
// Selection
// ============================================================================

fn focused_control_scene(editor: &Editor) -> Result<SceneHandle> {
    editor
        .focused_canvas()
        .map(Canvas::control_scene)
        .ok_or(VanimError::CanvasNotFound)
}

/// Draws a selection quad around `id` in the focused canvas's control scene.
///
/// Returns the quad's id, or `0` if there is no focused canvas or the entity
/// has nothing to outline.
pub fn hover_outline(editor: &mut Editor, id: EntityId) -> EntityId {
    let control_scene = match focused_control_scene(editor) {
        Ok(scene) => scene,
        Err(err) => {
            log::warn!("hover_outline({id}) rejected: {err}");
            return NULL_ENTITY_ID;
        }
    };
    let manager = editor.manager_mut();
    let Some(entity) = manager.try_get_entity_by_id(id) else {
        return NULL_ENTITY_ID;
    };

    let Some(bounds) = manager
        .try_get_component::<ShapeComponent>(entity)
        .and_then(|c| c.shape.bounds())
    else {
        return NULL_ENTITY_ID;
    };
    let world = manager
        .try_get_component::<WorldTransformComponent>(entity)
        .map_or(glam::Mat3::IDENTITY, |w| *w.world());
    let (min, max) = bounds;
    let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
        .map(|p| world.transform_point2(p));

    let outline = manager.create_obb(control_scene, corners);
    let (color, width) = (manager.settings().outline_color, manager.settings().outline_width);
    manager.add_component(outline, ControlOutlineComponent { target: id });
    if let Some(stroke) = manager.try_get_component_mut::<StrokeComponent>(outline) {
        stroke.color = color;
        stroke.width = width;
    }
    manager.set_dirty(outline, DirtyFlags::STROKE);
    manager.update_entity(outline);
    entity_id_or_null(manager, outline)
}

/// Destroys every selection quad in the focused canvas's control scene.
pub fn clear_control_scene(editor: &mut Editor) -> usize {
    let control_scene = match focused_control_scene(editor) {
        Ok(scene) => scene,
        Err(err) => {
            log::debug!("clear_control_scene skipped: {err}");
            return 0;
        }
    };
    let manager = editor.manager_mut();
    manager
        .find_by_component::<ControlOutlineComponent>(control_scene)
        .into_iter()
        .filter(|&entity| manager.destroy_entity(entity))
        .count()
}
