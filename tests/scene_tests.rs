//! Scene graph tests
//!
//! Tests for:
//! - Entity creation, ids and the global id index
//! - Layer factories (rect / ellipse / polygon / star / path / obb)
//! - Destruction: tombstones, handle safety, sweep
//! - Draw order moves and paint order rebuilds
//! - Nested scenes and their teardown
//! - Component access and typed path lookups

use glam::Vec2;
use vanim::errors::VanimError;
use vanim::scene::components::{
    IdComponent, NameComponent, RelationshipComponent, SceneComponent, ShapeComponent,
    SolidFillComponent, StrokeComponent,
};
use vanim::scene::path::{
    EllipsePath, PathListComponent, PathPoint, PathPointType, PolygonPath, RawPath, RectPath,
    StarPolygonPath,
};
use vanim::scene::{
    ChangeOrder, Entity, PaintNode, SceneHandle, SceneManager, TransformComponent,
};
use vanim::settings::EditorSettings;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn setup() -> (SceneManager, SceneHandle) {
    let mut manager = SceneManager::new();
    let scene = manager.create_scene(None);
    (manager, scene)
}

fn id_of(manager: &SceneManager, entity: Entity) -> u32 {
    manager.get_component::<IdComponent>(entity).id
}

fn draw_order(manager: &SceneManager, scene: SceneHandle) -> Vec<Entity> {
    manager
        .scene(scene)
        .unwrap()
        .draw_order()
        .iter()
        .map(|&key| Entity::new(scene, key))
        .collect()
}

fn three_rects(manager: &mut SceneManager, scene: SceneHandle) -> [Entity; 3] {
    [0.0, 10.0, 20.0].map(|x| manager.create_rect_fill_layer(scene, Vec2::new(x, 0.0), Vec2::splat(5.0)))
}

// ============================================================================
// Entity creation
// ============================================================================

#[test]
fn created_entity_has_standard_components() {
    let (mut manager, scene) = setup();
    let entity = manager.create_entity(scene, "");

    assert!(manager.has_component::<IdComponent>(entity));
    assert!(manager.has_component::<TransformComponent>(entity));
    assert!(manager.has_component::<RelationshipComponent>(entity));
    assert_eq!(manager.get_component::<NameComponent>(entity).name, "Entity");
    assert!(draw_order(&manager, scene).contains(&entity));
}

#[test]
fn ids_are_unique_and_indexed() {
    let (mut manager, scene) = setup();
    let a = manager.create_entity(scene, "a");
    let b = manager.create_entity(scene, "b");

    assert_ne!(id_of(&manager, a), id_of(&manager, b));
    assert_eq!(manager.get_entity_by_id(id_of(&manager, a)), a);
    assert_eq!(manager.try_get_entity_by_id(id_of(&manager, b)), Some(b));
    assert_eq!(manager.try_get_entity_by_id(0), None);
}

#[test]
#[should_panic(expected = "No entity with id")]
fn get_entity_by_unknown_id_panics() {
    let (manager, _) = setup();
    let _ = manager.get_entity_by_id(4242);
}

#[test]
fn scene_id_resolves_to_scene() {
    let (manager, scene) = setup();
    let id = manager.scene(scene).unwrap().id();
    assert_eq!(manager.find_scene(id), Some(scene));
}

#[test]
fn top_level_proxy_is_not_drawn() {
    let (manager, scene) = setup();
    let proxy = manager.scene(scene).unwrap().proxy().unwrap();
    assert_eq!(proxy.scene, scene);
    assert!(manager.has_component::<SceneComponent>(proxy));
    assert!(draw_order(&manager, scene).is_empty());
}

// ============================================================================
// Factories
// ============================================================================

#[test]
fn rect_fill_layer_scenario() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::splat(100.0));

    let transform = manager.get_component::<TransformComponent>(rect);
    assert_eq!(transform.position, Vec2::new(50.0, 50.0));

    let paths = manager.get_component::<PathListComponent>(rect);
    assert_eq!(paths.len(), 1);
    let path = manager.path::<RectPath>(rect, 0).unwrap();
    assert_eq!(path.scale, Vec2::splat(100.0));
    assert_eq!(path.radius, 0.0);

    let fill = manager.get_component::<SolidFillComponent>(rect);
    let defaults = EditorSettings::default();
    assert_eq!(fill.color, defaults.fill_color);
    assert_eq!(fill.alpha, defaults.fill_alpha);

    assert_eq!(manager.get_component::<NameComponent>(rect).name, "Rect Layer");
    assert!(!manager.has_component::<StrokeComponent>(rect));
}

#[test]
fn factory_output_is_paintable_immediately() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::splat(100.0));

    let shape = &manager.get_component::<ShapeComponent>(rect).shape;
    assert!(shape.visible);
    assert!(shape.fill.is_some());
    let (min, max) = shape.bounds().unwrap();
    assert_eq!(min, Vec2::splat(-50.0));
    assert_eq!(max, Vec2::splat(50.0));
    assert_eq!(
        shape.transform.transform_point2(Vec2::ZERO),
        Vec2::new(50.0, 50.0)
    );
    assert!(
        manager
            .scene(scene)
            .unwrap()
            .paint_order()
            .contains(&PaintNode::Shape(rect.key))
    );
}

#[test]
fn fill_stroke_variant_adds_stroke() {
    let (mut manager, scene) = setup();
    let ellipse = manager.create_ellipse_fill_stroke_layer(scene, Vec2::ZERO, Vec2::new(40.0, 20.0));

    assert_eq!(manager.path::<EllipsePath>(ellipse, 0).unwrap().scale, Vec2::new(40.0, 20.0));
    let stroke = manager.get_component::<StrokeComponent>(ellipse);
    assert_eq!(stroke.width, EditorSettings::default().stroke_width);
    assert!(manager.get_component::<ShapeComponent>(ellipse).shape.stroke.is_some());
}

#[test]
fn star_fill_stroke_keeps_fill() {
    let (mut manager, scene) = setup();
    let star = manager.create_star_fill_stroke_layer(scene, Vec2::ZERO, Vec2::splat(30.0));

    let shape = &manager.get_component::<ShapeComponent>(star).shape;
    assert!(shape.fill.is_some());
    assert!(shape.stroke.is_some());
    assert_eq!(shape.points().len(), 2 * EditorSettings::default().star_points as usize);
}

#[test]
fn polygon_layer_stretches_to_width() {
    let (mut manager, scene) = setup();
    let polygon = manager.create_polygon_fill_layer(scene, Vec2::ZERO, Vec2::new(200.0, 100.0));

    let path = manager.path::<PolygonPath>(polygon, 0).unwrap();
    assert_eq!(path.points, EditorSettings::default().polygon_points);
    assert!(approx_eq(path.outer_radius, 50.0));

    let transform = manager.get_component::<TransformComponent>(polygon);
    assert!(approx_eq(transform.scale.x, 2.0));
    assert_eq!(transform.position, Vec2::new(100.0, 50.0));
}

#[test]
fn degenerate_star_becomes_unit_sized() {
    let (mut manager, scene) = setup();
    let star = manager.create_star_fill_layer(scene, Vec2::new(10.0, 10.0), Vec2::ZERO);

    let path = manager.path::<StarPolygonPath>(star, 0).unwrap();
    assert!(approx_eq(path.outer_radius, 0.5));
    assert!(approx_eq(path.inner_radius, 0.25));
    let transform = manager.get_component::<TransformComponent>(star);
    assert!(transform.scale.is_finite());
    assert_eq!(transform.position, Vec2::new(10.5, 10.5));
}

#[test]
fn non_finite_size_becomes_unit_sized() {
    let (mut manager, scene) = setup();
    let star = manager.create_star_fill_layer(scene, Vec2::ZERO, Vec2::NAN);

    let path = manager.path::<StarPolygonPath>(star, 0).unwrap();
    assert!(approx_eq(path.outer_radius, 0.5));
    let transform = manager.get_component::<TransformComponent>(star);
    assert_eq!(transform.position, Vec2::splat(0.5));
    assert!(transform.scale.is_finite());
}

#[test]
fn path_layer_is_reorigined_on_first_point() {
    let (mut manager, scene) = setup();
    let points = vec![
        PathPoint::new(Vec2::new(10.0, 10.0), PathPointType::MoveTo),
        PathPoint::new(Vec2::new(30.0, 10.0), PathPointType::LineTo),
        PathPoint::new(Vec2::new(30.0, 40.0), PathPointType::LineTo),
    ];
    let layer = manager.create_path_layer(scene, points).unwrap();

    assert_eq!(manager.get_component::<TransformComponent>(layer).position, Vec2::new(10.0, 10.0));
    let raw = manager.path::<RawPath>(layer, 0).unwrap();
    assert_eq!(raw.points[0].position, Vec2::ZERO);
    assert_eq!(raw.points[2].position, Vec2::new(20.0, 30.0));
    assert_eq!(
        manager.get_component::<StrokeComponent>(layer).width,
        EditorSettings::default().path_line_width
    );
    assert!(!manager.has_component::<SolidFillComponent>(layer));
}

#[test]
fn empty_path_layer_is_rejected() {
    let (mut manager, scene) = setup();
    let result = manager.create_path_layer(scene, Vec::new());
    assert!(matches!(result, Err(VanimError::EmptyPath)));
    assert!(draw_order(&manager, scene).is_empty());
}

#[test]
fn obb_is_centred_on_its_corners() {
    let (mut manager, scene) = setup();
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 4.0),
        Vec2::new(0.0, 4.0),
    ];
    let obb = manager.create_obb(scene, corners);

    assert_eq!(manager.get_component::<TransformComponent>(obb).position, Vec2::new(5.0, 2.0));
    let raw = manager.path::<RawPath>(obb, 0).unwrap();
    assert_eq!(raw.points.len(), 5);
    assert_eq!(raw.points[0].point_type, PathPointType::MoveTo);
    assert_eq!(raw.points[4].point_type, PathPointType::Close);
    assert!(manager.has_component::<StrokeComponent>(obb));
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn destroy_removes_lookup_and_draw_order() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::splat(100.0));
    let id = id_of(&manager, rect);

    assert!(manager.destroy_entity(rect));

    assert_eq!(manager.try_get_entity_by_id(id), None);
    assert!(!draw_order(&manager, scene).contains(&rect));
    assert!(
        !manager
            .scene(scene)
            .unwrap()
            .paint_order()
            .contains(&PaintNode::Shape(rect.key))
    );
}

#[test]
fn stale_handles_report_missing_components() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::splat(100.0));
    manager.destroy_entity(rect);

    assert!(!manager.is_alive(rect));
    assert!(!manager.has_component::<TransformComponent>(rect));
    assert!(manager.try_get_component::<ShapeComponent>(rect).is_none());
    assert!(!manager.destroy_entity(rect));

    // Still safe after the slot is reclaimed
    assert_eq!(manager.sweep(scene), 1);
    assert!(!manager.has_component::<TransformComponent>(rect));
}

#[test]
fn destroying_parent_orphans_children() {
    let (mut manager, scene) = setup();
    let parent = manager.create_entity(scene, "parent");
    let child = manager.create_entity_with_parent(scene, "child", Some(parent));

    manager.destroy_entity(parent);
    assert_eq!(manager.get_component::<RelationshipComponent>(child).parent, None);
}

// ============================================================================
// Draw order
// ============================================================================

#[test]
fn to_front_on_last_is_noop() {
    let (mut manager, scene) = setup();
    let [_, _, c] = three_rects(&mut manager, scene);
    let before = draw_order(&manager, scene);

    assert!(!manager.change_draw_order(c, ChangeOrder::ToFront));
    assert_eq!(draw_order(&manager, scene), before);
}

#[test]
fn to_forward_swaps_with_next() {
    let (mut manager, scene) = setup();
    let [a, b, c] = three_rects(&mut manager, scene);

    assert!(manager.change_draw_order(a, ChangeOrder::ToForward));
    assert_eq!(draw_order(&manager, scene), vec![b, a, c]);

    assert!(manager.change_draw_order(a, ChangeOrder::ToForward));
    assert_eq!(draw_order(&manager, scene), vec![b, c, a]);

    assert!(!manager.change_draw_order(a, ChangeOrder::ToForward));
}

#[test]
fn to_back_and_backward() {
    let (mut manager, scene) = setup();
    let [a, b, c] = three_rects(&mut manager, scene);

    assert!(!manager.change_draw_order(a, ChangeOrder::ToBackward));
    assert!(!manager.change_draw_order(a, ChangeOrder::ToBack));

    assert!(manager.change_draw_order(c, ChangeOrder::ToBack));
    assert_eq!(draw_order(&manager, scene), vec![c, a, b]);

    assert!(manager.change_draw_order(b, ChangeOrder::ToBackward));
    assert_eq!(draw_order(&manager, scene), vec![c, b, a]);
}

#[test]
fn reorder_follows_draw_order() {
    let (mut manager, scene) = setup();
    let [a, b, c] = three_rects(&mut manager, scene);
    manager.change_draw_order(a, ChangeOrder::ToFront);

    let paint: Vec<PaintNode> = manager.scene(scene).unwrap().paint_order().to_vec();
    assert_eq!(
        paint,
        vec![PaintNode::Shape(b.key), PaintNode::Shape(c.key), PaintNode::Shape(a.key)]
    );
}

// ============================================================================
// Nested scenes
// ============================================================================

#[test]
fn nested_scene_interleaves_with_shapes() {
    let (mut manager, scene) = setup();
    let below = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);
    let nested = manager.create_scene(Some(scene));
    let above = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);
    manager.reorder(scene);

    let paint: Vec<PaintNode> = manager.scene(scene).unwrap().paint_order().to_vec();
    assert_eq!(
        paint,
        vec![
            PaintNode::Shape(below.key),
            PaintNode::Scene(nested),
            PaintNode::Shape(above.key),
        ]
    );
    assert_eq!(manager.scene(nested).unwrap().parent(), Some(scene));
}

#[test]
fn destroying_proxy_removes_nested_scene() {
    let (mut manager, scene) = setup();
    let nested = manager.create_scene(Some(scene));
    let inner = manager.create_rect_fill_layer(nested, Vec2::ZERO, Vec2::ONE);
    let inner_id = id_of(&manager, inner);
    let nested_id = manager.scene(nested).unwrap().id();
    let proxy = manager.scene(nested).unwrap().proxy().unwrap();

    assert!(manager.destroy_entity(proxy));

    assert!(manager.scene(nested).is_none());
    assert_eq!(manager.find_scene(nested_id), None);
    assert_eq!(manager.try_get_entity_by_id(inner_id), None);
    assert!(
        !manager
            .scene(scene)
            .unwrap()
            .paint_order()
            .contains(&PaintNode::Scene(nested))
    );
}

#[test]
fn top_level_proxy_survives_destroy() {
    let (mut manager, scene) = setup();
    let scene_id = manager.scene(scene).unwrap().id();
    let proxy = manager.scene(scene).unwrap().proxy().unwrap();

    assert!(!manager.destroy_entity(proxy));
    assert!(manager.is_alive(proxy));
    assert_eq!(manager.try_get_entity_by_id(scene_id), Some(proxy));
    assert_eq!(manager.find_scene(scene_id), Some(scene));

    // Removing the scene is what retires its id
    assert!(manager.remove_scene(scene));
    assert_eq!(manager.find_scene(scene_id), None);
    assert_eq!(manager.try_get_entity_by_id(scene_id), None);
}

#[test]
fn remove_scene_destroys_proxy_in_parent() {
    let (mut manager, scene) = setup();
    let nested = manager.create_scene(Some(scene));
    let proxy = manager.scene(nested).unwrap().proxy().unwrap();

    assert!(manager.remove_scene(nested));
    assert!(!manager.is_alive(proxy));
    assert!(!manager.remove_scene(nested));
}

// ============================================================================
// Components and paths
// ============================================================================

#[test]
fn try_add_refuses_duplicates() {
    let (mut manager, scene) = setup();
    let entity = manager.create_entity(scene, "e");

    assert!(manager.try_add_component(entity, StrokeComponent::default()));
    assert!(!manager.try_add_component(entity, StrokeComponent::default()));
    assert!(manager.try_remove_component::<StrokeComponent>(entity));
    assert!(!manager.try_remove_component::<StrokeComponent>(entity));
}

#[test]
fn find_by_component_is_scene_scoped() {
    let (mut manager, scene) = setup();
    let other = manager.create_scene(None);
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);
    manager.create_rect_fill_layer(other, Vec2::ZERO, Vec2::ONE);
    manager.create_entity(scene, "no fill");

    assert_eq!(manager.find_by_component::<SolidFillComponent>(scene), vec![rect]);
}

#[test]
fn typed_path_lookup_reports_mismatch() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);

    assert!(matches!(
        manager.path::<EllipsePath>(rect, 0),
        Err(VanimError::PathTypeMismatch { .. })
    ));
    assert!(matches!(
        manager.path::<RectPath>(rect, 3),
        Err(VanimError::PathIndexOutOfRange { index: 3, len: 1 })
    ));
    assert_eq!(manager.find_path::<RectPath>(rect, 0).map(|(i, _)| i), Some(0));
    assert!(manager.find_path::<RectPath>(rect, 1).is_none());
}

#[test]
fn move_path_transfers_between_entities() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);
    let ellipse = manager.create_ellipse_fill_layer(scene, Vec2::ZERO, Vec2::ONE);

    manager.move_path(rect, 0, ellipse).unwrap();
    manager.update(scene, 0.0);

    assert!(manager.get_component::<PathListComponent>(rect).is_empty());
    assert_eq!(manager.get_component::<PathListComponent>(ellipse).len(), 2);
    assert!(manager.path::<RectPath>(ellipse, 1).is_ok());
    // An entity without paths is hidden rather than drawn empty
    assert!(!manager.get_component::<ShapeComponent>(rect).shape.visible);
}

#[test]
fn set_hidden_survives_rebuilds() {
    let (mut manager, scene) = setup();
    let rect = manager.create_rect_fill_layer(scene, Vec2::ZERO, Vec2::ONE);

    assert!(manager.set_hidden(rect, true));
    manager.set_dirty(rect, vanim::scene::DirtyFlags::PATH);
    manager.update(scene, 0.0);
    assert!(!manager.get_component::<ShapeComponent>(rect).shape.visible);

    manager.set_hidden(rect, false);
    assert!(manager.get_component::<ShapeComponent>(rect).shape.visible);
}
