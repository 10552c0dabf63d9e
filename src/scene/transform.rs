use glam::{Mat3, Vec2, Vec3};

use crate::scene::EntityKey;

/// Local 2-D transform of an entity.
///
/// The matrix is composed as `T(position) · R(rotation) · S(scale) · T(-anchor)`:
/// rotation and scale act around `anchor`, which lands on `position` in the
/// parent's space.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    pub anchor: Vec2,
    pub position: Vec2,
    pub scale: Vec2,
    /// Degrees.
    pub rotation: f32,

    matrix: Mat3,
}

impl TransformComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor: Vec2::ZERO,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            matrix: Mat3::IDENTITY,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        let mut transform = Self::new();
        transform.position = position;
        transform.update();
        transform
    }

    /// The matrix the current fields describe, ignoring the cache.
    #[must_use]
    pub fn compose(&self) -> Mat3 {
        Mat3::from_translation(self.position)
            * Mat3::from_angle(self.rotation.to_radians())
            * Mat3::from_scale(self.scale)
            * Mat3::from_translation(-self.anchor)
    }

    /// Recomputes the cached local matrix.
    ///
    /// Returns `true` if the matrix changed.
    pub fn update(&mut self) -> bool {
        let matrix = self.compose();
        let changed = matrix != self.matrix;
        self.matrix = matrix;
        changed
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    #[inline]
    #[must_use]
    pub fn inverse(&self) -> Mat3 {
        inverse_or_identity(&self.matrix)
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform of an entity composed with all its ancestors.
///
/// `parent` is a generation-checked key into the same scene; a stale or
/// missing parent makes the entity a root.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldTransformComponent {
    pub parent: Option<EntityKey>,
    pub(crate) world: Mat3,
    pub(crate) inverse: Mat3,
    pub(crate) position: Vec2,
}

impl WorldTransformComponent {
    #[must_use]
    pub fn new(parent: Option<EntityKey>) -> Self {
        Self {
            parent,
            world: Mat3::IDENTITY,
            inverse: Mat3::IDENTITY,
            position: Vec2::ZERO,
        }
    }

    /// Sets `world = parent_world · local` and refreshes the cached inverse and position.
    pub fn update(&mut self, parent_world: &Mat3, local: &TransformComponent) {
        self.world = *parent_world * *local.matrix();
        self.inverse = inverse_or_identity(&self.world);
        self.position = self.world.transform_point2(local.anchor);
    }

    #[inline]
    #[must_use]
    pub fn world(&self) -> &Mat3 {
        &self.world
    }

    #[inline]
    #[must_use]
    pub fn inverse(&self) -> &Mat3 {
        &self.inverse
    }

    /// World-space position of the entity's pivot.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Maps a world-space point into the entity's local space.
    #[inline]
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        self.inverse.transform_point2(point)
    }
}

impl Default for WorldTransformComponent {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Closed-form 3×3 inverse (adjugate over determinant).
///
/// A singular or non-finite matrix yields identity instead of NaNs.
#[must_use]
pub fn inverse_or_identity(m: &Mat3) -> Mat3 {
    let cross0: Vec3 = m.y_axis.cross(m.z_axis);
    let cross1: Vec3 = m.z_axis.cross(m.x_axis);
    let cross2: Vec3 = m.x_axis.cross(m.y_axis);

    let det = m.z_axis.dot(cross2);
    let inv_det = det.recip();
    if det == 0.0 || !inv_det.is_finite() {
        return Mat3::IDENTITY;
    }

    let inverse = Mat3::from_cols(cross0, cross1, cross2).transpose() * inv_det;
    if inverse.is_finite() {
        inverse
    } else {
        Mat3::IDENTITY
    }
}
