//! Scene manager
//!
//! Owns every [`Scene`], the global id → entity index and the id → scene
//! index. All structural mutation (creating and destroying entities and
//! scenes, reparenting, reordering) goes through here so the indices never
//! drift from the registries.
//!
//! Accessors named `get_*` treat a missing entity or component as a broken
//! precondition and panic; their `try_*` counterparts return `Option` or
//! `bool` instead.

use glam::{Mat3, Vec2};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{Result, VanimError};
use crate::scene::components::{
    DirtyFlags, IdComponent, NameComponent, RelationshipComponent, SceneComponent,
    ShapeComponent, SolidFillComponent, StrokeComponent,
};
use crate::scene::path::{
    EllipsePath, Path, PathListComponent, PathPoint, PathPointType, PathVariant, PolygonPath,
    RawPath, RectPath, StarPolygonPath,
};
use crate::scene::registry::Component;
use crate::scene::scene::{PaintNode, Scene};
use crate::scene::transform::{TransformComponent, WorldTransformComponent};
use crate::scene::{
    ChangeOrder, Entity, EntityId, NULL_ENTITY_ID, SceneHandle, transform_system,
    update_system,
};
use crate::settings::EditorSettings;

/// Nested scenes deeper than this are not updated or reordered.
const MAX_SCENE_DEPTH: usize = 64;

/// Parametric shapes smaller than this (w·h) are created at 1×1.
const MIN_SHAPE_AREA: f32 = 1e-6;

pub struct SceneManager {
    scenes: SlotMap<SceneHandle, Scene>,
    entity_index: FxHashMap<EntityId, Entity>,
    scene_index: FxHashMap<EntityId, SceneHandle>,
    next_id: EntityId,
    settings: EditorSettings,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            scenes: SlotMap::with_key(),
            entity_index: FxHashMap::default(),
            scene_index: FxHashMap::default(),
            next_id: NULL_ENTITY_ID + 1,
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    /// Creates a scene, nested inside `parent` if given.
    ///
    /// Every scene gets a proxy entity carrying a [`SceneComponent`]; its id
    /// doubles as the scene id. A nested scene's proxy lives in (and is drawn
    /// by) the parent. A top-level scene's proxy lives in the scene itself,
    /// outside its draw order, and its transform acts as the view transform.
    pub fn create_scene(&mut self, parent: Option<SceneHandle>) -> SceneHandle {
        let parent = parent.filter(|&p| {
            let known = self.scenes.contains_key(p);
            if !known {
                log::warn!("Parent scene {p:?} not found, creating a top-level scene");
            }
            known
        });

        let handle = self
            .scenes
            .insert_with_key(|handle| Scene::new(handle, parent));
        let host = parent.unwrap_or(handle);

        let proxy = self.create_entity(host, "Scene");
        self.add_component(proxy, SceneComponent { scene: handle });
        let id = self.get_component::<IdComponent>(proxy).id;

        let host_scene = self.scene_mut(host);
        if host == handle {
            host_scene.draw_order.retain(|&k| k != proxy.key);
        } else {
            host_scene.paint_order.push(PaintNode::Scene(handle));
        }

        let scene = self.scene_mut(handle);
        scene.id = id;
        scene.proxy = Some(proxy);
        self.scene_index.insert(id, handle);

        log::debug!("Created scene {id} ({handle:?}), parent {parent:?}");
        handle
    }

    /// Removes a scene, every scene nested inside it, and its proxy.
    pub fn remove_scene(&mut self, handle: SceneHandle) -> bool {
        let Some(scene) = self.scenes.get(handle) else {
            log::warn!("Attempted to remove unknown scene {handle:?}");
            return false;
        };

        let nested = nested_scenes(scene);
        let proxy = scene.proxy;
        let scene_id = scene.id;

        for child in nested {
            self.remove_scene(child);
        }

        if let Some(scene) = self.scenes.remove(handle) {
            for key in scene.registry.keys() {
                if let Some(id) = scene.registry.get::<IdComponent>(key) {
                    self.entity_index.remove(&id.id);
                }
            }
        }
        self.scene_index.remove(&scene_id);

        if let Some(proxy) = proxy
            && proxy.scene != handle
        {
            self.destroy_entity(proxy);
        }

        log::debug!("Removed scene {scene_id} ({handle:?})");
        true
    }

    #[inline]
    #[must_use]
    pub fn scene(&self, handle: SceneHandle) -> Option<&Scene> {
        self.scenes.get(handle)
    }

    /// Resolves a scene id (its proxy's entity id).
    #[inline]
    #[must_use]
    pub fn find_scene(&self, id: EntityId) -> Option<SceneHandle> {
        self.scene_index.get(&id).copied()
    }

    pub fn scenes(&self) -> impl Iterator<Item = (SceneHandle, &Scene)> {
        self.scenes.iter()
    }

    fn scene_mut(&mut self, handle: SceneHandle) -> &mut Scene {
        self.scenes
            .get_mut(handle)
            .unwrap_or_else(|| panic!("Scene {handle:?} does not exist"))
    }

    // ========================================================================
    // Entities
    // ========================================================================

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Creates an entity with the standard component set: id, transform,
    /// world transform, name, relationship and dirty mask. It is appended to
    /// the draw order and marked fully dirty.
    ///
    /// # Panics
    ///
    /// Panics if `scene` does not exist.
    pub fn create_entity(&mut self, scene: SceneHandle, name: &str) -> Entity {
        self.create_entity_with_parent(scene, name, None)
    }

    /// Like [`create_entity`](Self::create_entity), attached under `parent`.
    ///
    /// A parent from another scene, or one that is no longer alive, is ignored.
    pub fn create_entity_with_parent(
        &mut self,
        scene: SceneHandle,
        name: &str,
        parent: Option<Entity>,
    ) -> Entity {
        let parent = parent.filter(|p| {
            let valid = p.scene == scene && self.is_alive(*p);
            if !valid {
                log::warn!("Ignoring invalid parent {p:?} for new entity in {scene:?}");
            }
            valid
        });
        let parent_id = parent.and_then(|p| self.entity_id(p));

        let id = self.allocate_id();
        let target = self.scene_mut(scene);
        let registry = &mut target.registry;

        let key = registry.create();
        registry.insert(key, IdComponent { id });
        registry.insert(key, TransformComponent::new());
        registry.insert(key, WorldTransformComponent::new(parent.map(|p| p.key)));
        registry.insert(
            key,
            NameComponent {
                name: if name.is_empty() { "Entity" } else { name }.to_owned(),
            },
        );
        registry.insert(
            key,
            RelationshipComponent {
                parent: parent_id,
                ..Default::default()
            },
        );
        registry.insert(key, DirtyFlags::empty());

        if let Some(parent) = parent
            && let Some(relationship) = registry.get_mut::<RelationshipComponent>(parent.key)
        {
            relationship.children.push(id);
        }

        target.draw_order.push(key);
        target.dirty = true;
        registry.mark_dirty(key, DirtyFlags::all());

        let entity = Entity::new(scene, key);
        self.entity_index.insert(id, entity);
        log::debug!("Created entity {id} `{name}` in {scene:?}");
        entity
    }

    /// Destroys an entity.
    ///
    /// The entity leaves the id index, the draw order and the paint order at
    /// once; its slot is tombstoned and reclaimed by [`sweep`](Self::sweep).
    /// Destroying a scene proxy removes the nested scene too. The proxy of a
    /// top-level scene is owned by the scene itself and is never destroyed
    /// here; use [`remove_scene`](Self::remove_scene).
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        let Some(scene) = self.scenes.get_mut(entity.scene) else {
            log::warn!("Attempted to destroy entity in unknown scene {:?}", entity.scene);
            return false;
        };
        let registry = &mut scene.registry;
        if !registry.is_alive(entity.key) {
            return false;
        }
        if registry
            .get::<SceneComponent>(entity.key)
            .is_some_and(|c| c.scene == entity.scene)
        {
            log::warn!("Refusing to destroy the proxy of top-level scene {:?}", entity.scene);
            return false;
        }

        let id = registry.get::<IdComponent>(entity.key).map(|c| c.id);
        let nested = registry
            .get::<SceneComponent>(entity.key)
            .map(|c| c.scene)
            .filter(|&s| s != entity.scene);

        if let Some(shape) = registry.get_mut::<ShapeComponent>(entity.key) {
            shape.shape.visible = false;
        }

        // Detach from the tree: children become roots
        let relationship = registry
            .get::<RelationshipComponent>(entity.key)
            .cloned()
            .unwrap_or_default();
        for child_id in &relationship.children {
            if let Some(child) = self.entity_index.get(child_id).copied()
                && child.scene == entity.scene
            {
                if let Some(r) = registry.get_mut::<RelationshipComponent>(child.key) {
                    r.parent = None;
                }
                if let Some(w) = registry.get_mut::<WorldTransformComponent>(child.key) {
                    w.parent = None;
                }
            }
        }
        if let (Some(parent_id), Some(id)) = (relationship.parent, id)
            && let Some(parent) = self.entity_index.get(&parent_id).copied()
            && parent.scene == entity.scene
            && let Some(r) = registry.get_mut::<RelationshipComponent>(parent.key)
        {
            r.children.retain(|c| *c != id);
        }

        registry.tombstone(entity.key);
        scene.draw_order.retain(|&k| k != entity.key);
        scene
            .paint_order
            .retain(|&n| n != PaintNode::Shape(entity.key));
        if let Some(nested) = nested {
            scene.paint_order.retain(|&n| n != PaintNode::Scene(nested));
        }
        scene.dirty = true;

        if let Some(id) = id {
            self.entity_index.remove(&id);
            log::debug!("Destroyed entity {id}");
        }
        if let Some(nested) = nested
            && self.scenes.contains_key(nested)
        {
            self.remove_scene(nested);
        }
        true
    }

    /// Reclaims tombstoned slots in `handle` and every scene nested in it.
    pub fn sweep(&mut self, handle: SceneHandle) -> usize {
        self.sweep_recursive(handle, 0)
    }

    fn sweep_recursive(&mut self, handle: SceneHandle, depth: usize) -> usize {
        if depth > MAX_SCENE_DEPTH {
            return 0;
        }
        let Some(scene) = self.scenes.get_mut(handle) else {
            return 0;
        };
        let mut freed = scene.registry.sweep();
        for child in nested_scenes(scene) {
            freed += self.sweep_recursive(child, depth + 1);
        }
        if freed > 0 {
            log::debug!("Swept {freed} destroyed entities from {handle:?}");
        }
        freed
    }

    /// `true` if the entity exists and has not been destroyed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.scenes
            .get(entity.scene)
            .is_some_and(|s| s.registry.is_alive(entity.key))
    }

    #[must_use]
    pub fn entity_id(&self, entity: Entity) -> Option<EntityId> {
        self.try_get_component::<IdComponent>(entity).map(|c| c.id)
    }

    /// # Panics
    ///
    /// Panics if no live entity has this id.
    #[must_use]
    pub fn get_entity_by_id(&self, id: EntityId) -> Entity {
        self.try_get_entity_by_id(id)
            .unwrap_or_else(|| panic!("No entity with id {id}"))
    }

    #[must_use]
    pub fn try_get_entity_by_id(&self, id: EntityId) -> Option<Entity> {
        self.entity_index.get(&id).copied()
    }

    /// Like [`try_get_entity_by_id`](Self::try_get_entity_by_id), as a `Result`.
    pub fn resolve(&self, id: EntityId) -> Result<Entity> {
        self.try_get_entity_by_id(id)
            .ok_or(VanimError::EntityNotFound(id))
    }

    /// Live entities of `scene` carrying a `T`.
    #[must_use]
    pub fn find_by_component<T: Component>(&self, scene: SceneHandle) -> Vec<Entity> {
        self.scenes.get(scene).map_or_else(Vec::new, |s| {
            s.find_by_component::<T>()
                .into_iter()
                .map(|key| Entity::new(scene, key))
                .collect()
        })
    }

    // ========================================================================
    // Components
    // ========================================================================

    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.scenes
            .get(entity.scene)
            .is_some_and(|s| s.registry.has::<T>(entity.key))
    }

    /// # Panics
    ///
    /// Panics if the entity is dead or lacks a `T`. Check with
    /// [`has_component`](Self::has_component) first.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        self.try_get_component::<T>(entity)
            .unwrap_or_else(|| panic!("Entity {entity:?} has no {}", T::NAME))
    }

    /// # Panics
    ///
    /// Panics if the entity is dead or lacks a `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.try_get_component_mut::<T>(entity)
            .unwrap_or_else(|| panic!("Entity {entity:?} has no {}", T::NAME))
    }

    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.scenes.get(entity.scene)?.registry.get::<T>(entity.key)
    }

    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.scenes
            .get_mut(entity.scene)?
            .registry
            .get_mut::<T>(entity.key)
    }

    /// Attaches `component`, replacing an existing one.
    ///
    /// # Panics
    ///
    /// Panics if the entity is dead.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        self.scene_mut(entity.scene)
            .registry
            .insert(entity.key, component)
    }

    /// Attaches `component` unless one is already present. Returns `false` on refusal.
    pub fn try_add_component<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        self.scenes
            .get_mut(entity.scene)
            .is_some_and(|s| s.registry.try_insert(entity.key, component).is_some())
    }

    /// Detaches a `T`. Returns `false` if there was none.
    pub fn try_remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        self.scenes
            .get_mut(entity.scene)
            .is_some_and(|s| s.registry.remove::<T>(entity.key).is_some())
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Marks aspects of the entity as changed for the next update.
    pub fn set_dirty(&mut self, entity: Entity, flags: DirtyFlags) {
        if let Some(scene) = self.scenes.get_mut(entity.scene)
            && scene.registry.is_alive(entity.key)
        {
            scene.registry.mark_dirty(entity.key, flags);
            scene.dirty = true;
        }
    }

    /// Translates the entity's local position.
    pub fn move_by_delta(&mut self, entity: Entity, delta: Vec2) -> bool {
        let Some(transform) = self.try_get_component_mut::<TransformComponent>(entity) else {
            return false;
        };
        transform.position += delta;
        self.set_dirty(entity, DirtyFlags::TRANSFORM);
        true
    }

    /// Hides or shows the entity's shape. An entity without paths stays hidden.
    pub fn set_hidden(&mut self, entity: Entity, hidden: bool) -> bool {
        let Some(scene) = self.scenes.get_mut(entity.scene) else {
            return false;
        };
        let has_paths = scene
            .registry
            .get::<PathListComponent>(entity.key)
            .is_some_and(|p| !p.is_empty());
        let Some(shape) = scene.registry.get_mut::<ShapeComponent>(entity.key) else {
            return false;
        };
        shape.hidden = hidden;
        shape.shape.visible = !hidden && has_paths;
        true
    }

    /// Reparents `child` under `parent` (or makes it a root).
    ///
    /// Both must live in the same scene. Self-parenting and cycles are
    /// rejected. Draw order is unaffected.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> bool {
        if !self.is_alive(child) {
            log::warn!("Cannot reparent dead entity {child:?}");
            return false;
        }
        if let Some(parent) = parent {
            if parent == child {
                log::warn!("Cannot attach entity to itself!");
                return false;
            }
            if parent.scene != child.scene || !self.is_alive(parent) {
                log::warn!("Cannot attach {child:?} to {parent:?}: parent not in the same scene");
                return false;
            }
            if self.is_ancestor(child, parent) {
                log::warn!("Cannot attach {child:?} to its own descendant {parent:?}");
                return false;
            }
        }

        let Some(child_id) = self.entity_id(child) else {
            return false;
        };
        let parent_id = parent.and_then(|p| self.entity_id(p));
        let old_parent = self
            .try_get_component::<RelationshipComponent>(child)
            .and_then(|r| r.parent)
            .and_then(|id| self.try_get_entity_by_id(id));

        if let Some(old) = old_parent
            && let Some(r) = self.try_get_component_mut::<RelationshipComponent>(old)
        {
            r.children.retain(|c| *c != child_id);
        }
        if let Some(new) = parent
            && let Some(r) = self.try_get_component_mut::<RelationshipComponent>(new)
        {
            r.children.push(child_id);
        }
        if let Some(r) = self.try_get_component_mut::<RelationshipComponent>(child) {
            r.parent = parent_id;
        }
        if let Some(w) = self.try_get_component_mut::<WorldTransformComponent>(child) {
            w.parent = parent.map(|p| p.key);
        }

        let base = self.scene_base(child.scene);
        let scene = self.scene_mut(child.scene);
        transform_system::update_subtree(&mut scene.registry.storages, child.key, &base);
        self.set_dirty(child, DirtyFlags::TRANSFORM);
        true
    }

    /// World matrix the roots of `handle` hang from: the proxy's world matrix
    /// for a nested scene, identity for a top-level one.
    fn scene_base(&self, handle: SceneHandle) -> Mat3 {
        self.scenes
            .get(handle)
            .and_then(|s| s.proxy)
            .filter(|proxy| proxy.scene != handle)
            .and_then(|proxy| self.try_get_component::<WorldTransformComponent>(proxy))
            .map_or(Mat3::IDENTITY, |w| *w.world())
    }

    /// `true` if `ancestor` is `entity` or above it in the tree.
    fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let Some(scene) = self.scenes.get(entity.scene) else {
            return false;
        };
        let mut cursor = Some(entity.key);
        let mut steps = 0;
        while let Some(key) = cursor {
            if key == ancestor.key {
                return true;
            }
            steps += 1;
            if steps > scene.registry.len() {
                return true;
            }
            cursor = scene
                .registry
                .get::<WorldTransformComponent>(key)
                .and_then(|w| w.parent);
        }
        false
    }

    /// Reconciles one entity right away instead of waiting for the next update.
    pub fn update_entity(&mut self, entity: Entity) -> bool {
        let Some(scene) = self.scenes.get_mut(entity.scene) else {
            return false;
        };
        let mut scene_transforms = Vec::new();
        let reconciled = update_system::reconcile_entity(
            &mut scene.registry.storages,
            entity.key,
            &mut scene_transforms,
        );
        self.apply_scene_transforms(scene_transforms);
        reconciled
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// First path of variant `P` at or after `start`, with its index.
    #[must_use]
    pub fn find_path<P: PathVariant>(&self, entity: Entity, start: usize) -> Option<(usize, &P)> {
        self.try_get_component::<PathListComponent>(entity)?
            .find::<P>(start)
    }

    /// The path at `index`, checked against variant `P`.
    pub fn path<P: PathVariant>(&self, entity: Entity, index: usize) -> Result<&P> {
        self.try_get_component::<PathListComponent>(entity)
            .ok_or(VanimError::PathIndexOutOfRange { index, len: 0 })?
            .get::<P>(index)
    }

    pub fn path_mut<P: PathVariant>(&mut self, entity: Entity, index: usize) -> Result<&mut P> {
        self.try_get_component_mut::<PathListComponent>(entity)
            .ok_or(VanimError::PathIndexOutOfRange { index, len: 0 })?
            .get_mut::<P>(index)
    }

    /// Moves the path at `index` of `source` to the end of `target`'s path list.
    pub fn move_path(&mut self, source: Entity, index: usize, target: Entity) -> Result<()> {
        if !self.is_alive(source) || !self.is_alive(target) {
            return Err(VanimError::StaleEntity);
        }
        let path: Path = self
            .try_get_component_mut::<PathListComponent>(source)
            .ok_or(VanimError::PathIndexOutOfRange { index, len: 0 })?
            .take(index)?;

        match self.try_get_component_mut::<PathListComponent>(target) {
            Some(paths) => paths.paths.push(path),
            None => {
                self.add_component(target, PathListComponent { paths: vec![path] });
            }
        }

        self.set_dirty(source, DirtyFlags::PATH);
        self.set_dirty(target, DirtyFlags::PATH);
        Ok(())
    }

    // ========================================================================
    // Layer factories
    // ========================================================================

    /// Shared tail of the shape factories: paths, paint primitive and fill,
    /// positioned at `position`, reconciled immediately.
    fn create_shape_layer(
        &mut self,
        scene: SceneHandle,
        name: &str,
        position: Vec2,
        paths: PathListComponent,
        fill: bool,
    ) -> Entity {
        let entity = self.create_entity(scene, name);
        let fill = fill.then(|| SolidFillComponent::from_settings(&self.settings));

        let target = self.scene_mut(scene);
        let registry = &mut target.registry;
        if let Some(transform) = registry.get_mut::<TransformComponent>(entity.key) {
            transform.position = position;
        }
        registry.insert(entity.key, paths);
        registry.insert(entity.key, ShapeComponent::default());
        if let Some(fill) = fill {
            registry.insert(entity.key, fill);
        }
        target.paint_order.push(PaintNode::Shape(entity.key));

        self.update_entity(entity);
        entity
    }

    fn add_default_stroke(&mut self, entity: Entity) -> Entity {
        let stroke = StrokeComponent::from_settings(&self.settings);
        self.add_component(entity, stroke);
        self.set_dirty(entity, DirtyFlags::STROKE);
        self.update_entity(entity);
        entity
    }

    /// Rectangle layer covering `min .. min + size`, centred on its transform.
    pub fn create_rect_fill_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let rect = RectPath {
            radius: 0.0,
            position: Vec2::ZERO,
            scale: size,
            ..Default::default()
        };
        self.create_shape_layer(
            scene,
            "Rect Layer",
            min + size * 0.5,
            PathListComponent::with(rect),
            true,
        )
    }

    pub fn create_rect_fill_stroke_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let entity = self.create_rect_fill_layer(scene, min, size);
        self.add_default_stroke(entity)
    }

    /// Ellipse layer inscribed in `min .. min + size`.
    pub fn create_ellipse_fill_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let ellipse = EllipsePath {
            position: Vec2::ZERO,
            scale: size,
            ..Default::default()
        };
        self.create_shape_layer(
            scene,
            "Ellipse Layer",
            min + size * 0.5,
            PathListComponent::with(ellipse),
            true,
        )
    }

    pub fn create_ellipse_fill_stroke_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let entity = self.create_ellipse_fill_layer(scene, min, size);
        self.add_default_stroke(entity)
    }

    /// Regular polygon sized by the rect's height and stretched to its width
    /// through the transform's x scale.
    pub fn create_polygon_fill_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let size = sanitize_size(size);
        let radius = size.y * 0.5;
        let polygon = PolygonPath {
            points: self.settings.polygon_points,
            outer_radius: radius,
            ..Default::default()
        };
        let entity = self.create_shape_layer(
            scene,
            "Polygon Layer",
            min + size * 0.5,
            PathListComponent::with(polygon),
            true,
        );
        self.stretch_to_width(entity, size.x * 0.5 / radius);
        entity
    }

    pub fn create_polygon_fill_stroke_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let entity = self.create_polygon_fill_layer(scene, min, size);
        self.add_default_stroke(entity)
    }

    /// Star with inner radius half the outer one, sized like the polygon layer.
    pub fn create_star_fill_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let size = sanitize_size(size);
        let radius = size.y * 0.5;
        let star = StarPolygonPath {
            points: self.settings.star_points,
            outer_radius: radius,
            inner_radius: radius * 0.5,
            ..Default::default()
        };
        let entity = self.create_shape_layer(
            scene,
            "Star Layer",
            min + size * 0.5,
            PathListComponent::with(star),
            true,
        );
        self.stretch_to_width(entity, size.x * 0.5 / radius);
        entity
    }

    pub fn create_star_fill_stroke_layer(&mut self, scene: SceneHandle, min: Vec2, size: Vec2) -> Entity {
        let entity = self.create_star_fill_layer(scene, min, size);
        self.add_default_stroke(entity)
    }

    fn stretch_to_width(&mut self, entity: Entity, scale_x: f32) {
        self.get_component_mut::<TransformComponent>(entity).scale.x = scale_x;
        self.set_dirty(entity, DirtyFlags::TRANSFORM);
        self.update_entity(entity);
    }

    /// Freeform stroked path. Points are given in scene space; the layer is
    /// placed at the first point and the points are re-origined around it.
    pub fn create_path_layer(&mut self, scene: SceneHandle, points: Vec<PathPoint>) -> Result<Entity> {
        let Some(origin) = points.first().map(|p| p.position) else {
            return Err(VanimError::EmptyPath);
        };

        let mut raw = RawPath::new(points);
        for point in &mut raw.points {
            point.position -= origin;
        }
        raw.center = origin;

        let entity = self.create_shape_layer(
            scene,
            "Path Layer",
            origin,
            PathListComponent::with(raw),
            false,
        );
        let mut stroke = StrokeComponent::from_settings(&self.settings);
        stroke.width = self.settings.path_line_width;
        self.add_component(entity, stroke);
        self.set_dirty(entity, DirtyFlags::STROKE);
        self.update_entity(entity);
        Ok(entity)
    }

    /// Stroked quad through four scene-space corners, used for selection outlines.
    pub fn create_obb(&mut self, scene: SceneHandle, corners: [Vec2; 4]) -> Entity {
        let (min, max) = corners
            .iter()
            .fold((corners[0], corners[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let size = max - min;
        let center = min + size * 0.5;

        let mut points: Vec<PathPoint> = corners
            .iter()
            .enumerate()
            .map(|(i, &corner)| {
                let kind = if i == 0 {
                    PathPointType::MoveTo
                } else {
                    PathPointType::LineTo
                };
                PathPoint::new(corner - center, kind)
            })
            .collect();
        points.push(PathPoint::close());
        let mut raw = RawPath::new(points);
        raw.center = center;

        let entity = self.create_shape_layer(scene, "obb", center, PathListComponent::with(raw), false);
        let stroke = StrokeComponent::from_settings(&self.settings);
        self.add_component(entity, stroke);
        self.set_dirty(entity, DirtyFlags::STROKE);
        self.update_entity(entity);
        entity
    }

    // ========================================================================
    // Draw order
    // ========================================================================

    /// Moves the entity in its scene's draw order; any actual move rebuilds
    /// the paint order.
    pub fn change_draw_order(&mut self, entity: Entity, order: ChangeOrder) -> bool {
        let Some(scene) = self.scenes.get_mut(entity.scene) else {
            return false;
        };
        if !scene.registry.is_alive(entity.key) || !scene.change_draw_order(entity.key, order) {
            return false;
        }
        self.reorder(entity.scene);
        true
    }

    /// Rebuilds the paint order of `handle` (and of every nested scene) from
    /// the draw order.
    pub fn reorder(&mut self, handle: SceneHandle) {
        self.reorder_recursive(handle, 0);
    }

    fn reorder_recursive(&mut self, handle: SceneHandle, depth: usize) {
        if depth > MAX_SCENE_DEPTH {
            log::warn!("Scene nesting deeper than {MAX_SCENE_DEPTH}, reorder stopped");
            return;
        }
        let Some(scene) = self.scenes.get_mut(handle) else {
            return;
        };

        let mut paint_order = Vec::with_capacity(scene.draw_order.len());
        let mut nested = Vec::new();
        for &key in &scene.draw_order {
            if !scene.registry.is_alive(key) {
                continue;
            }
            if let Some(child) = scene.registry.get::<SceneComponent>(key)
                && child.scene != handle
            {
                paint_order.push(PaintNode::Scene(child.scene));
                nested.push(child.scene);
            } else if scene.registry.has::<ShapeComponent>(key) {
                paint_order.push(PaintNode::Shape(key));
            }
        }
        scene.paint_order = paint_order;
        scene.dirty = true;

        for child in nested {
            self.reorder_recursive(child, depth + 1);
        }
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Runs one frame of the update pipeline on `handle` and its nested scenes.
    ///
    /// Returns `true` if this scene or any descendant changed and needs a repaint.
    pub fn update(&mut self, handle: SceneHandle, frame: f32) -> bool {
        self.update_recursive(handle, frame, &Mat3::IDENTITY, 0)
    }

    fn update_recursive(&mut self, handle: SceneHandle, frame: f32, base: &Mat3, depth: usize) -> bool {
        if depth > MAX_SCENE_DEPTH {
            log::warn!("Scene nesting deeper than {MAX_SCENE_DEPTH}, update stopped");
            return false;
        }
        let Some(scene) = self.scenes.get_mut(handle) else {
            log::warn!("Attempted to update unknown scene {handle:?}");
            return false;
        };
        let registry = &mut scene.registry;

        // 1-3. Simulation
        update_system::sample_transform_keyframes(registry, frame);
        update_system::sample_paths(registry, frame);
        update_system::sample_paint(registry, frame);

        // 4. Reconciliation (empties the change set)
        let changed = !registry.change_set.is_empty() || scene.dirty;
        let scene_transforms = update_system::reconcile(registry);

        // 5. World transforms, parent before child
        transform_system::update_hierarchy_iterative(&mut registry.storages, base);

        let nested: Vec<(SceneHandle, Mat3)> = registry
            .storages
            .scenes
            .iter()
            .filter(|(key, c)| c.scene != handle && registry.is_alive(*key))
            .map(|(key, c)| {
                let world = registry
                    .storages
                    .world_transforms
                    .get(key)
                    .map_or(Mat3::IDENTITY, |w| w.world);
                (c.scene, world)
            })
            .collect();
        scene.dirty = false;

        self.apply_scene_transforms(scene_transforms);

        // 6. Nested scenes
        let mut nested_changed = false;
        for (child, world) in nested {
            nested_changed |= self.update_recursive(child, frame, &world, depth + 1);
        }

        // 7. Repaint decision
        changed || nested_changed
    }

    fn apply_scene_transforms(&mut self, scene_transforms: Vec<(SceneHandle, Mat3)>) {
        for (handle, matrix) in scene_transforms {
            if let Some(scene) = self.scenes.get_mut(handle) {
                scene.paint_transform = matrix;
            }
        }
    }
}

/// Live scenes nested directly in `scene`, excluding its own self-proxy.
fn nested_scenes(scene: &Scene) -> Vec<SceneHandle> {
    scene
        .registry
        .storages
        .scenes
        .iter()
        .filter(|(key, c)| c.scene != scene.handle() && scene.registry.is_alive(*key))
        .map(|(_, c)| c.scene)
        .collect()
}

/// Degenerate or non-finite sizes become 1×1 so radius-based shapes stay finite.
fn sanitize_size(size: Vec2) -> Vec2 {
    if !size.is_finite() || size.x * size.y < MIN_SHAPE_AREA {
        Vec2::ONE
    } else {
        size
    }
}
