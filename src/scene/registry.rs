//! Entity registry
//!
//! Entities are generation-checked slots in a [`SlotMap`]; each component
//! type has its own [`SecondaryMap`] keyed by the same [`EntityKey`], so a
//! stale key can never reach a component that belongs to a reused slot.
//!
//! Destruction is two-phase. [`Registry::tombstone`] hides an entity from
//! every lookup immediately; [`Registry::sweep`] reclaims its slot and
//! components after the frame. Keys collected mid-frame therefore stay valid
//! to pass around, they just report the entity as gone.

use slotmap::{SecondaryMap, SlotMap};

use crate::scene::EntityKey;
use crate::scene::components::{
    ControlOutlineComponent, DirtyFlags, IdComponent, NameComponent, RelationshipComponent,
    SceneComponent, ShapeComponent, SolidFillComponent, StrokeComponent, Tombstone,
    TransformKeyframeComponent,
};
use crate::scene::path::PathListComponent;
use crate::scene::transform::{TransformComponent, WorldTransformComponent};

/// A type that can be attached to an entity.
///
/// Implemented for every component by the storage table below.
pub trait Component: Sized + 'static {
    const NAME: &'static str;

    #[doc(hidden)]
    fn storage(storages: &Storages) -> &SecondaryMap<EntityKey, Self>;
    #[doc(hidden)]
    fn storage_mut(storages: &mut Storages) -> &mut SecondaryMap<EntityKey, Self>;
}

macro_rules! component_storages {
    ($($field:ident: $ty:ident),* $(,)?) => {
        /// One storage per component type.
        #[derive(Default)]
        pub struct Storages {
            $(pub(crate) $field: SecondaryMap<EntityKey, $ty>,)*
        }

        impl Storages {
            fn remove_all(&mut self, key: EntityKey) {
                $(self.$field.remove(key);)*
            }
        }

        $(
            impl Component for $ty {
                const NAME: &'static str = stringify!($ty);

                #[inline]
                fn storage(storages: &Storages) -> &SecondaryMap<EntityKey, Self> {
                    &storages.$field
                }

                #[inline]
                fn storage_mut(storages: &mut Storages) -> &mut SecondaryMap<EntityKey, Self> {
                    &mut storages.$field
                }
            }
        )*
    };
}

component_storages! {
    ids: IdComponent,
    names: NameComponent,
    relationships: RelationshipComponent,
    transforms: TransformComponent,
    world_transforms: WorldTransformComponent,
    transform_keyframes: TransformKeyframeComponent,
    path_lists: PathListComponent,
    fills: SolidFillComponent,
    strokes: StrokeComponent,
    scenes: SceneComponent,
    shapes: ShapeComponent,
    control_outlines: ControlOutlineComponent,
    dirty: DirtyFlags,
    tombstones: Tombstone,
}

#[derive(Default)]
pub struct Registry {
    entities: SlotMap<EntityKey, ()>,
    pub(crate) storages: Storages,
    /// Entities marked dirty since the last update, in marking order.
    pub(crate) change_set: Vec<EntityKey>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an empty entity slot.
    pub fn create(&mut self) -> EntityKey {
        self.entities.insert(())
    }

    /// `true` if `key` names a slot that is allocated and not tombstoned.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key) && !self.storages.tombstones.contains_key(key)
    }

    /// `true` if the slot still exists, tombstoned or not.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Number of allocated slots, tombstones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entity keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entities
            .keys()
            .filter(|&key| !self.storages.tombstones.contains_key(key))
    }

    /// Attaches `component`, replacing any previous one of the same type.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: Component>(&mut self, key: EntityKey, component: T) -> &mut T {
        assert!(
            self.is_alive(key),
            "Cannot attach {} to a dead entity",
            T::NAME
        );
        let storage = T::storage_mut(&mut self.storages);
        storage.insert(key, component);
        &mut storage[key]
    }

    /// Attaches `component` unless the entity is dead or already has one.
    pub fn try_insert<T: Component>(&mut self, key: EntityKey, component: T) -> Option<&mut T> {
        if !self.is_alive(key) || self.has::<T>(key) {
            return None;
        }
        let storage = T::storage_mut(&mut self.storages);
        storage.insert(key, component);
        storage.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn has<T: Component>(&self, key: EntityKey) -> bool {
        self.is_alive(key) && T::storage(&self.storages).contains_key(key)
    }

    #[inline]
    #[must_use]
    pub fn get<T: Component>(&self, key: EntityKey) -> Option<&T> {
        if self.is_alive(key) {
            T::storage(&self.storages).get(key)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut<T: Component>(&mut self, key: EntityKey) -> Option<&mut T> {
        if self.is_alive(key) {
            T::storage_mut(&mut self.storages).get_mut(key)
        } else {
            None
        }
    }

    pub fn remove<T: Component>(&mut self, key: EntityKey) -> Option<T> {
        if self.is_alive(key) {
            T::storage_mut(&mut self.storages).remove(key)
        } else {
            None
        }
    }

    /// Live entities carrying a `T`, in storage order.
    #[must_use]
    pub fn keys_with<T: Component>(&self) -> Vec<EntityKey> {
        T::storage(&self.storages)
            .keys()
            .filter(|&key| self.is_alive(key))
            .collect()
    }

    /// ORs `flags` into the entity's dirty mask, enrolling it in the change set
    /// on its first flag since the last update.
    pub fn mark_dirty(&mut self, key: EntityKey, flags: DirtyFlags) {
        if flags.is_empty() || !self.is_alive(key) {
            return;
        }
        let dirty = self.storages.dirty.entry(key).map(|e| e.or_default());
        if let Some(dirty) = dirty {
            if dirty.is_empty() {
                self.change_set.push(key);
            }
            dirty.insert(flags);
        }
    }

    #[inline]
    #[must_use]
    pub fn dirty_flags(&self, key: EntityKey) -> DirtyFlags {
        self.get::<DirtyFlags>(key).copied().unwrap_or_default()
    }

    /// Hides the entity from every lookup. Its slot survives until [`sweep`](Self::sweep).
    pub fn tombstone(&mut self, key: EntityKey) -> bool {
        if !self.is_alive(key) {
            return false;
        }
        self.storages.tombstones.insert(key, Tombstone);
        true
    }

    /// Reclaims the slots of every tombstoned entity. Returns how many were freed.
    pub fn sweep(&mut self) -> usize {
        let dead: Vec<EntityKey> = self.storages.tombstones.keys().collect();
        for &key in &dead {
            self.storages.remove_all(key);
            self.entities.remove(key);
        }
        self.change_set.retain(|key| !dead.contains(key));
        dead.len()
    }
}
