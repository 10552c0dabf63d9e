//! Scene graph
//!
//! Entities live in per-scene registries and carry their state as components:
//! - [`registry`]: arena of generation-checked entity slots plus typed component storages
//! - [`components`]: identity, hierarchy, paint and bookkeeping components
//! - [`transform`]: local and world transforms
//! - [`path`]: the closed set of path variants and their outlines
//! - [`shape`]: the retained paint primitive a renderer consumes
//! - [`scene`]: a registry plus its draw order
//! - [`manager`]: all scenes, the global id index and the layer factories
//! - [`transform_system`] / [`update_system`]: the per-frame pipeline

pub mod components;
pub mod manager;
pub mod path;
pub mod registry;
pub mod scene;
pub mod shape;
pub mod transform;
pub mod transform_system;
pub mod update_system;

pub use components::DirtyFlags;
pub use manager::SceneManager;
pub use path::{Path, PathKind, PathListComponent};
pub use registry::{Component, Registry};
pub use scene::{PaintNode, Scene};
pub use shape::Shape;
pub use transform::{TransformComponent, WorldTransformComponent};

use slotmap::new_key_type;

new_key_type! {
    pub struct EntityKey;
    pub struct SceneHandle;
}

/// Stable numeric id handed to external collaborators.
pub type EntityId = u32;

/// Id value that never names an entity.
pub const NULL_ENTITY_ID: EntityId = 0;

/// Handle to an entity: the scene whose registry owns it plus its slot key.
///
/// Handles are plain data. A handle held across [`SceneManager::destroy_entity`]
/// stays safe to use; lookups through it simply report the entity as gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub scene: SceneHandle,
    pub key: EntityKey,
}

impl Entity {
    #[must_use]
    pub fn new(scene: SceneHandle, key: EntityKey) -> Self {
        Self { scene, key }
    }
}

/// Draw-order moves for [`SceneManager::change_draw_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrder {
    /// Paint last (on top of everything).
    ToFront,
    /// Paint first (below everything).
    ToBack,
    /// Swap with the next element.
    ToForward,
    /// Swap with the previous element.
    ToBackward,
}
