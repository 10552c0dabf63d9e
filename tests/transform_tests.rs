//! Transform and world-transform propagation tests
//!
//! Tests for:
//! - Local matrix composition order (anchor as pivot)
//! - Cached matrix dirty check
//! - Closed-form inverse and the degenerate fallback
//! - Parent-before-child world propagation through the scene manager
//! - Nested scenes hanging from their proxy's world matrix

use glam::{Mat3, Vec2};
use vanim::scene::components::DirtyFlags;
use vanim::scene::transform::inverse_or_identity;
use vanim::scene::{Entity, SceneHandle, SceneManager, TransformComponent, WorldTransformComponent};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec2_approx(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn mat3_approx(a: &Mat3, b: &Mat3) -> bool {
    a.abs_diff_eq(*b, 1e-4)
}

fn set_local(manager: &mut SceneManager, entity: Entity, position: Vec2, rotation: f32, scale: Vec2) {
    let transform = manager.get_component_mut::<TransformComponent>(entity);
    transform.position = position;
    transform.rotation = rotation;
    transform.scale = scale;
    manager.set_dirty(entity, DirtyFlags::TRANSFORM);
}

fn world(manager: &SceneManager, entity: Entity) -> Mat3 {
    *manager.get_component::<WorldTransformComponent>(entity).world()
}

fn local(manager: &SceneManager, entity: Entity) -> Mat3 {
    *manager.get_component::<TransformComponent>(entity).matrix()
}

fn root_scene(manager: &mut SceneManager) -> SceneHandle {
    manager.create_scene(None)
}

// ============================================================================
// Local transform
// ============================================================================

#[test]
fn default_is_identity() {
    let t = TransformComponent::new();
    assert_eq!(t.position, Vec2::ZERO);
    assert_eq!(t.scale, Vec2::ONE);
    assert_eq!(t.rotation, 0.0);
    assert_eq!(*t.matrix(), Mat3::IDENTITY);
}

#[test]
fn anchor_is_the_pivot() {
    let mut t = TransformComponent::new();
    t.anchor = Vec2::new(1.0, 0.0);
    t.position = Vec2::new(10.0, 0.0);
    t.rotation = 90.0;
    t.scale = Vec2::new(2.0, 1.0);
    t.update();

    // The anchor lands on the position regardless of rotation and scale
    assert!(vec2_approx(t.matrix().transform_point2(t.anchor), t.position));
    // (2,0) is one unit right of the anchor: scaled to 2, rotated to +y
    assert!(vec2_approx(
        t.matrix().transform_point2(Vec2::new(2.0, 0.0)),
        Vec2::new(10.0, 2.0)
    ));
}

#[test]
fn update_reports_matrix_changes_only() {
    let mut t = TransformComponent::new();
    assert!(!t.update());

    t.position = Vec2::new(3.0, 4.0);
    assert!(t.update());
    assert!(!t.update());

    t.rotation = 45.0;
    assert!(t.update());
}

#[test]
fn from_position_is_pre_composed() {
    let t = TransformComponent::from_position(Vec2::new(5.0, -2.0));
    assert!(vec2_approx(t.matrix().transform_point2(Vec2::ZERO), Vec2::new(5.0, -2.0)));
}

// ============================================================================
// Inverse
// ============================================================================

#[test]
fn inverse_times_matrix_is_identity() {
    let mut t = TransformComponent::new();
    t.position = Vec2::new(12.0, -7.0);
    t.rotation = 33.0;
    t.scale = Vec2::new(1.5, 0.25);
    t.anchor = Vec2::new(4.0, 4.0);
    t.update();

    let product = t.inverse() * *t.matrix();
    assert!(mat3_approx(&product, &Mat3::IDENTITY));
}

#[test]
fn inverse_matches_glam() {
    let m = Mat3::from_scale_angle_translation(Vec2::new(2.0, 3.0), 0.7, Vec2::new(-4.0, 9.0));
    assert!(mat3_approx(&inverse_or_identity(&m), &m.inverse()));
}

#[test]
fn singular_matrix_inverts_to_identity() {
    let m = Mat3::from_scale(Vec2::new(0.0, 1.0));
    assert_eq!(inverse_or_identity(&m), Mat3::IDENTITY);

    let nan = Mat3::from_cols_array(&[f32::NAN; 9]);
    assert_eq!(inverse_or_identity(&nan), Mat3::IDENTITY);
}

// ============================================================================
// World propagation
// ============================================================================

#[test]
fn three_level_chain_composes_locals() {
    let mut manager = SceneManager::new();
    let scene = root_scene(&mut manager);

    let parent = manager.create_entity(scene, "parent");
    let child = manager.create_entity_with_parent(scene, "child", Some(parent));
    let grandchild = manager.create_entity_with_parent(scene, "grandchild", Some(child));

    set_local(&mut manager, parent, Vec2::new(100.0, 0.0), 90.0, Vec2::ONE);
    set_local(&mut manager, child, Vec2::new(10.0, 0.0), 0.0, Vec2::splat(2.0));
    set_local(&mut manager, grandchild, Vec2::new(1.0, 1.0), -30.0, Vec2::new(1.0, 3.0));
    manager.update(scene, 0.0);

    let expected = local(&manager, parent) * local(&manager, child) * local(&manager, grandchild);
    assert!(mat3_approx(&world(&manager, grandchild), &expected));

    let w = manager.get_component::<WorldTransformComponent>(grandchild);
    assert!(mat3_approx(&(*w.inverse() * *w.world()), &Mat3::IDENTITY));
}

#[test]
fn world_position_is_the_mapped_pivot() {
    let mut manager = SceneManager::new();
    let scene = root_scene(&mut manager);
    let parent = manager.create_entity(scene, "parent");
    let child = manager.create_entity_with_parent(scene, "child", Some(parent));

    set_local(&mut manager, parent, Vec2::new(20.0, 30.0), 0.0, Vec2::ONE);
    set_local(&mut manager, child, Vec2::new(5.0, 0.0), 0.0, Vec2::ONE);
    manager.update(scene, 0.0);

    let w = manager.get_component::<WorldTransformComponent>(child);
    assert!(vec2_approx(w.position(), Vec2::new(25.0, 30.0)));
    assert!(vec2_approx(w.to_local(Vec2::new(25.0, 30.0)), Vec2::ZERO));
}

#[test]
fn child_created_before_parent_moves_still_follows() {
    let mut manager = SceneManager::new();
    let scene = root_scene(&mut manager);
    let parent = manager.create_entity(scene, "parent");
    let child = manager.create_entity_with_parent(scene, "child", Some(parent));
    manager.update(scene, 0.0);

    set_local(&mut manager, parent, Vec2::new(7.0, 0.0), 0.0, Vec2::ONE);
    manager.update(scene, 1.0);

    assert!(vec2_approx(
        world(&manager, child).transform_point2(Vec2::ZERO),
        Vec2::new(7.0, 0.0)
    ));
}

#[test]
fn reparenting_rebases_world() {
    let mut manager = SceneManager::new();
    let scene = root_scene(&mut manager);
    let a = manager.create_entity(scene, "a");
    let b = manager.create_entity(scene, "b");
    let child = manager.create_entity_with_parent(scene, "child", Some(a));

    set_local(&mut manager, a, Vec2::new(10.0, 0.0), 0.0, Vec2::ONE);
    set_local(&mut manager, b, Vec2::new(0.0, 50.0), 0.0, Vec2::ONE);
    manager.update(scene, 0.0);
    assert!(vec2_approx(world(&manager, child).transform_point2(Vec2::ZERO), Vec2::new(10.0, 0.0)));

    assert!(manager.set_parent(child, Some(b)));
    manager.update(scene, 0.0);
    assert!(vec2_approx(world(&manager, child).transform_point2(Vec2::ZERO), Vec2::new(0.0, 50.0)));
}

#[test]
fn cycles_and_self_parenting_are_rejected() {
    let mut manager = SceneManager::new();
    let scene = root_scene(&mut manager);
    let a = manager.create_entity(scene, "a");
    let b = manager.create_entity_with_parent(scene, "b", Some(a));

    assert!(!manager.set_parent(a, Some(a)));
    assert!(!manager.set_parent(a, Some(b)));
    assert_eq!(manager.get_component::<WorldTransformComponent>(a).parent, None);
}

#[test]
fn nested_scene_hangs_from_proxy_world() {
    let mut manager = SceneManager::new();
    let outer = root_scene(&mut manager);
    let inner = manager.create_scene(Some(outer));
    let proxy = manager.scene(inner).and_then(|s| s.proxy()).unwrap();
    assert_eq!(proxy.scene, outer);

    let entity = manager.create_entity(inner, "inner entity");
    set_local(&mut manager, proxy, Vec2::new(-40.0, 15.0), 0.0, Vec2::ONE);
    set_local(&mut manager, entity, Vec2::new(1.0, 2.0), 0.0, Vec2::ONE);
    manager.update(outer, 0.0);

    assert!(vec2_approx(
        world(&manager, entity).transform_point2(Vec2::ZERO),
        Vec2::new(-39.0, 17.0)
    ));
    // The proxy's local matrix is pushed to the nested scene's paint transform
    let paint = *manager.scene(inner).unwrap().paint_transform();
    assert!(mat3_approx(&paint, &local(&manager, proxy)));
}

#[test]
fn detaching_in_nested_scene_keeps_proxy_base() {
    let mut manager = SceneManager::new();
    let outer = root_scene(&mut manager);
    let inner = manager.create_scene(Some(outer));
    let proxy = manager.scene(inner).and_then(|s| s.proxy()).unwrap();

    let parent = manager.create_entity(inner, "parent");
    let child = manager.create_entity_with_parent(inner, "child", Some(parent));
    set_local(&mut manager, proxy, Vec2::new(-40.0, 15.0), 0.0, Vec2::ONE);
    set_local(&mut manager, parent, Vec2::new(3.0, 0.0), 0.0, Vec2::ONE);
    manager.update(outer, 0.0);

    // Recomputed eagerly, before the next update
    assert!(manager.set_parent(child, None));
    assert!(vec2_approx(
        world(&manager, child).transform_point2(Vec2::ZERO),
        Vec2::new(-40.0, 15.0)
    ));

    assert!(manager.set_parent(child, Some(parent)));
    assert!(vec2_approx(
        world(&manager, child).transform_point2(Vec2::ZERO),
        Vec2::new(-37.0, 15.0)
    ));
}
