use glam::Mat3;

use crate::scene::components::ShapeComponent;
use crate::scene::registry::{Component, Registry};
use crate::scene::shape::Shape;
use crate::scene::{ChangeOrder, Entity, EntityId, EntityKey, SceneHandle};

/// An entry of a scene's paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintNode {
    Shape(EntityKey),
    Scene(SceneHandle),
}

/// A registry plus the order its entities are painted in.
///
/// Draw order is independent of the parent/child tree: reordering never
/// changes transforms, and reparenting never changes paint order. A nested
/// scene appears in its parent's draw order through its proxy entity.
pub struct Scene {
    handle: SceneHandle,
    pub(crate) id: EntityId,
    pub(crate) registry: Registry,
    pub(crate) draw_order: Vec<EntityKey>,
    pub(crate) paint_order: Vec<PaintNode>,
    pub(crate) parent: Option<SceneHandle>,
    pub(crate) proxy: Option<Entity>,
    pub(crate) paint_transform: Mat3,
    pub(crate) dirty: bool,
}

impl Scene {
    pub(crate) fn new(handle: SceneHandle, parent: Option<SceneHandle>) -> Self {
        Self {
            handle,
            id: 0,
            registry: Registry::new(),
            draw_order: Vec::new(),
            paint_order: Vec::new(),
            parent,
            proxy: None,
            paint_transform: Mat3::IDENTITY,
            dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> SceneHandle {
        self.handle
    }

    /// Id of the proxy entity, used by external collaborators to name this scene.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn draw_order(&self) -> &[EntityKey] {
        &self.draw_order
    }

    /// Backing paint order as last rebuilt by [`SceneManager::reorder`](super::SceneManager::reorder).
    #[inline]
    #[must_use]
    pub fn paint_order(&self) -> &[PaintNode] {
        &self.paint_order
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<SceneHandle> {
        self.parent
    }

    /// The entity standing for this scene: in the parent scene when nested,
    /// otherwise in this scene itself.
    #[inline]
    #[must_use]
    pub fn proxy(&self) -> Option<Entity> {
        self.proxy
    }

    /// Transform applied to everything this scene paints.
    #[inline]
    #[must_use]
    pub fn paint_transform(&self) -> &Mat3 {
        &self.paint_transform
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn shape(&self, key: EntityKey) -> Option<&Shape> {
        self.registry.get::<ShapeComponent>(key).map(|c| &c.shape)
    }

    /// Live entities carrying a `T`.
    #[must_use]
    pub fn find_by_component<T: Component>(&self) -> Vec<EntityKey> {
        self.registry.keys_with::<T>()
    }

    /// Moves `key` inside the draw order. Returns `true` if the order changed.
    ///
    /// Moving the front element further forward, or the back element further
    /// back, is a no-op.
    pub fn change_draw_order(&mut self, key: EntityKey, order: ChangeOrder) -> bool {
        let len = self.draw_order.len();
        if len < 2 {
            return false;
        }
        let Some(idx) = self.draw_order.iter().position(|&k| k == key) else {
            return false;
        };
        let last = len - 1;

        match order {
            ChangeOrder::ToFront => {
                if idx == last {
                    return false;
                }
                let moved = self.draw_order.remove(idx);
                self.draw_order.push(moved);
            }
            ChangeOrder::ToBack => {
                if idx == 0 {
                    return false;
                }
                let moved = self.draw_order.remove(idx);
                self.draw_order.insert(0, moved);
            }
            ChangeOrder::ToForward => {
                if idx == last {
                    return false;
                }
                self.draw_order.swap(idx, idx + 1);
            }
            ChangeOrder::ToBackward => {
                if idx == 0 {
                    return false;
                }
                self.draw_order.swap(idx, idx - 1);
            }
        }

        self.dirty = true;
        true
    }
}
