//! Components
//!
//! Plain data records attached to entities. Each type lives in its own
//! storage inside the owning scene's [`Registry`](super::Registry).

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::animation::{Color, ColorTrack, FloatTrack, VectorTrack};
use crate::scene::shape::{FillRule, Shape};
use crate::scene::transform::TransformComponent;
use crate::scene::{EntityId, SceneHandle};
use crate::settings::EditorSettings;

bitflags! {
    /// Aspects of an entity changed since its last reconciliation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u32 {
        const PATH      = 1 << 0;
        const TRANSFORM = 1 << 1;
        const FILL      = 1 << 2;
        const STROKE    = 1 << 3;
    }
}

impl DirtyFlags {
    /// Any change that requires the outline or its paint to be rebuilt.
    pub const GEOMETRY: Self = Self::PATH.union(Self::FILL).union(Self::STROKE);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdComponent {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameComponent {
    pub name: String,
}

/// Tree topology, independent of draw order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipComponent {
    pub parent: Option<EntityId>,
    pub children: SmallVec<[EntityId; 4]>,
}

/// Keyframed overrides for the entity's [`TransformComponent`].
#[derive(Debug, Clone, Default)]
pub struct TransformKeyframeComponent {
    pub position: VectorTrack,
    pub scale: VectorTrack,
    pub rotation: FloatTrack,
}

impl TransformKeyframeComponent {
    /// Samples every track into `transform`. Returns `true` if anything changed.
    pub fn apply(&self, frame: f32, transform: &mut TransformComponent) -> bool {
        let mut changed = self.position.sample_into(frame, &mut transform.position);
        changed |= self.scale.sample_into(frame, &mut transform.scale);
        changed |= self.rotation.sample_into(frame, &mut transform.rotation);
        changed
    }
}

#[derive(Debug, Clone)]
pub struct SolidFillComponent {
    pub color: Color,
    pub alpha: f32,
    pub rule: FillRule,
    pub color_track: ColorTrack,
    pub alpha_track: FloatTrack,
}

impl Default for SolidFillComponent {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl SolidFillComponent {
    #[must_use]
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            color: settings.fill_color,
            alpha: settings.fill_alpha,
            rule: FillRule::NonZero,
            color_track: ColorTrack::default(),
            alpha_track: FloatTrack::default(),
        }
    }

    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.color_track.sample_into(frame, &mut self.color);
        changed |= self.alpha_track.sample_into(frame, &mut self.alpha);
        changed
    }
}

#[derive(Debug, Clone)]
pub struct StrokeComponent {
    pub color: Color,
    pub alpha: f32,
    pub width: f32,
    pub color_track: ColorTrack,
    pub width_track: FloatTrack,
    pub alpha_track: FloatTrack,
}

impl Default for StrokeComponent {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl StrokeComponent {
    #[must_use]
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            color: settings.stroke_color,
            alpha: 255.0,
            width: settings.stroke_width,
            color_track: ColorTrack::default(),
            width_track: FloatTrack::default(),
            alpha_track: FloatTrack::default(),
        }
    }

    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.color_track.sample_into(frame, &mut self.color);
        changed |= self.width_track.sample_into(frame, &mut self.width);
        changed |= self.alpha_track.sample_into(frame, &mut self.alpha);
        changed
    }
}

/// Marks an entity as the proxy of a nested scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneComponent {
    pub scene: SceneHandle,
}

/// The entity's paint primitive.
#[derive(Debug, Clone, Default)]
pub struct ShapeComponent {
    pub shape: Shape,
    /// User-requested hide, kept across outline rebuilds.
    pub hidden: bool,
}

/// Selection quad drawn in a canvas control scene around `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOutlineComponent {
    pub target: EntityId,
}

/// Destroyed; the slot is reclaimed by the next sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tombstone;
