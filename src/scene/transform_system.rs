//! Transform system
//!
//! Propagates world transforms through one scene's hierarchy. Works on the
//! registry storages directly so it can read local transforms while writing
//! world transforms without going through the registry's accessors.
//!
//! Traversal is an explicit stack seeded with every root, so a parent's world
//! matrix is always final before any of its children reads it.

use glam::Mat3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scene::EntityKey;
use crate::scene::registry::Storages;
use crate::scene::transform::TransformComponent;

type ChildList = SmallVec<[EntityKey; 4]>;

#[inline]
fn is_live(storages: &Storages, key: EntityKey) -> bool {
    storages.world_transforms.contains_key(key) && !storages.tombstones.contains_key(key)
}

/// Splits the scene's live world-transform entities into roots and a
/// parent → children index. A stale parent makes the entity a root.
fn build_hierarchy(storages: &Storages) -> (Vec<EntityKey>, FxHashMap<EntityKey, ChildList>) {
    let mut roots = Vec::new();
    let mut children: FxHashMap<EntityKey, ChildList> = FxHashMap::default();

    for (key, world) in &storages.world_transforms {
        if storages.tombstones.contains_key(key) {
            continue;
        }
        match world.parent {
            Some(parent) if parent != key && is_live(storages, parent) => {
                children.entry(parent).or_default().push(key);
            }
            _ => roots.push(key),
        }
    }

    (roots, children)
}

fn propagate(
    storages: &mut Storages,
    children: &FxHashMap<EntityKey, ChildList>,
    mut stack: Vec<(EntityKey, Mat3)>,
) -> usize {
    let identity = TransformComponent::new();
    let mut visited = 0;

    while let Some((key, parent_world)) = stack.pop() {
        let local = storages.transforms.get(key).unwrap_or(&identity);
        let Some(world) = storages.world_transforms.get_mut(key) else {
            continue;
        };

        // 1. Compose with the (already final) parent
        world.update(&parent_world, local);
        visited += 1;

        // 2. Push children in reverse to keep their original order
        let current = world.world;
        if let Some(kids) = children.get(&key) {
            for &child in kids.iter().rev() {
                stack.push((child, current));
            }
        }
    }

    visited
}

/// Recomputes every world transform in the scene, parent before child.
///
/// `base` is the world matrix the scene's roots hang from: identity for a
/// top-level scene, the proxy entity's world matrix for a nested one.
pub fn update_hierarchy_iterative(storages: &mut Storages, base: &Mat3) {
    let (roots, children) = build_hierarchy(storages);

    let stack: Vec<(EntityKey, Mat3)> = roots.iter().rev().map(|&root| (root, *base)).collect();
    let visited = propagate(storages, &children, stack);

    let expected = storages
        .world_transforms
        .keys()
        .filter(|&key| !storages.tombstones.contains_key(key))
        .count();
    if visited < expected {
        log::warn!(
            "World transform cycle: {} entities unreachable from any root",
            expected - visited
        );
    }
}

/// Recomputes the world transforms of `root` and its descendants only.
///
/// The root's parent world matrix is read from its (assumed current) parent,
/// or `base` if it has none.
pub fn update_subtree(storages: &mut Storages, root: EntityKey, base: &Mat3) {
    if !is_live(storages, root) {
        return;
    }
    let parent_world = storages
        .world_transforms
        .get(root)
        .and_then(|w| w.parent)
        .filter(|&parent| parent != root && is_live(storages, parent))
        .and_then(|parent| storages.world_transforms.get(parent))
        .map_or(*base, |w| w.world);

    let (_, children) = build_hierarchy(storages);
    propagate(storages, &children, vec![(root, parent_world)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::registry::Registry;
    use crate::scene::transform::WorldTransformComponent;
    use glam::Vec2;

    fn spawn(registry: &mut Registry, parent: Option<EntityKey>, position: Vec2) -> EntityKey {
        let key = registry.create();
        registry.insert(key, TransformComponent::from_position(position));
        registry.insert(key, WorldTransformComponent::new(parent));
        key
    }

    #[test]
    fn child_reads_final_parent_world() {
        let mut registry = Registry::new();
        // The parent gets its transform components only after the child exists
        let placeholder = registry.create();
        let child = spawn(&mut registry, Some(placeholder), Vec2::new(1.0, 0.0));
        registry.insert(placeholder, TransformComponent::from_position(Vec2::new(10.0, 0.0)));
        registry.insert(placeholder, WorldTransformComponent::new(None));

        update_hierarchy_iterative(&mut registry.storages, &Mat3::IDENTITY);

        let world = registry.get::<WorldTransformComponent>(child).unwrap();
        assert_eq!(world.world().transform_point2(Vec2::ZERO), Vec2::new(11.0, 0.0));
    }

    #[test]
    fn dead_parent_makes_root() {
        let mut registry = Registry::new();
        let parent = spawn(&mut registry, None, Vec2::new(5.0, 5.0));
        let child = spawn(&mut registry, Some(parent), Vec2::new(1.0, 1.0));
        registry.tombstone(parent);

        update_hierarchy_iterative(&mut registry.storages, &Mat3::IDENTITY);

        let world = registry.get::<WorldTransformComponent>(child).unwrap();
        assert_eq!(world.position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn base_matrix_offsets_roots() {
        let mut registry = Registry::new();
        let root = spawn(&mut registry, None, Vec2::ZERO);
        let base = Mat3::from_translation(Vec2::new(3.0, 4.0));

        update_hierarchy_iterative(&mut registry.storages, &base);

        let world = registry.get::<WorldTransformComponent>(root).unwrap();
        assert_eq!(world.position(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn subtree_update_leaves_siblings_alone() {
        let mut registry = Registry::new();
        let a = spawn(&mut registry, None, Vec2::new(1.0, 0.0));
        let b = spawn(&mut registry, None, Vec2::new(2.0, 0.0));

        update_subtree(&mut registry.storages, a, &Mat3::IDENTITY);

        assert_eq!(registry.get::<WorldTransformComponent>(a).unwrap().position(), Vec2::new(1.0, 0.0));
        assert_eq!(registry.get::<WorldTransformComponent>(b).unwrap().position(), Vec2::ZERO);
    }
}
