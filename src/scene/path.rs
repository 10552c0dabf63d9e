//! Path variants
//!
//! An entity's outline is the concatenation of the paths in its
//! [`PathListComponent`]. [`Path`] is a closed sum over the supported
//! generators; every variant owns its own keyframe tracks, samples them in
//! [`Path::update`] and emits its outline in [`Path::append_to`].
//!
//! Parametric variants (polygon and star) generate an equivalent
//! [`RawPath`] from their fields each time their outline is emitted.

use glam::Vec2;

use crate::animation::{FloatTrack, IntegerTrack, VectorTrack};
use crate::errors::{Result, VanimError};
use crate::scene::shape::Shape;

/// Polygons and stars start with a vertex pointing straight up.
const START_ANGLE_DEG: f32 = -90.0;
const MIN_POLYGON_POINTS: i32 = 3;
const MIN_STAR_POINTS: i32 = 2;

// ============================================================================
// Raw point paths
// ============================================================================

/// Drawing command of a [`PathPoint`]. Discriminants are shared with front ends.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathPointType {
    #[default]
    LineTo = 0,
    MoveTo = 1,
    CubicTo = 2,
    Close = 3,
}

/// A vertex of a [`RawPath`].
///
/// Control points are stored relative to `position`. A `CubicTo` point draws
/// a curve from the previous point using the previous point's right control
/// and this point's left control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathPoint {
    pub position: Vec2,
    pub left_control: Vec2,
    pub right_control: Vec2,
    pub point_type: PathPointType,

    pub position_track: VectorTrack,
    pub left_control_track: VectorTrack,
    pub right_control_track: VectorTrack,
}

impl PathPoint {
    #[must_use]
    pub fn new(position: Vec2, point_type: PathPointType) -> Self {
        Self {
            position,
            point_type,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn cubic(position: Vec2, left_control: Vec2, right_control: Vec2) -> Self {
        Self {
            position,
            left_control,
            right_control,
            point_type: PathPointType::CubicTo,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn close() -> Self {
        Self::new(Vec2::ZERO, PathPointType::Close)
    }

    /// Samples the point's tracks. Control tracks only matter for curved points.
    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.position_track.sample_into(frame, &mut self.position);
        if self.point_type != PathPointType::LineTo {
            changed |= self.left_control_track.sample_into(frame, &mut self.left_control);
            changed |= self.right_control_track.sample_into(frame, &mut self.right_control);
        }
        changed
    }
}

/// Explicit point list. `center` is the layer's origin in its parent's space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPath {
    pub points: Vec<PathPoint>,
    pub center: Vec2,
}

impl RawPath {
    #[must_use]
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self {
            points,
            center: Vec2::ZERO,
        }
    }

    pub fn update(&mut self, frame: f32) -> bool {
        // Every point must be sampled; no short-circuit.
        self.points
            .iter_mut()
            .fold(false, |changed, point| point.update(frame) | changed)
    }

    pub fn append_to(&self, shape: &mut Shape) {
        for (i, point) in self.points.iter().enumerate() {
            match point.point_type {
                PathPointType::MoveTo => shape.move_to(point.position),
                PathPointType::LineTo => shape.line_to(point.position),
                PathPointType::CubicTo => {
                    let prev = if i > 0 { &self.points[i - 1] } else { point };
                    shape.cubic_to(
                        prev.position + prev.right_control,
                        point.position + point.left_control,
                        point.position,
                    );
                }
                PathPointType::Close => shape.close(),
            }
        }
    }

    pub fn point_mut(&mut self, index: usize) -> Result<&mut PathPoint> {
        let len = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(VanimError::PointIndexOutOfRange { index, len })
    }

    /// Inserts `point` before `index`, or appends it when `index` is `None`.
    pub fn insert_point(&mut self, index: Option<usize>, point: PathPoint) -> Result<()> {
        let len = self.points.len();
        match index {
            None => self.points.push(point),
            Some(index) if index <= len => self.points.insert(index, point),
            Some(index) => return Err(VanimError::PointIndexOutOfRange { index, len }),
        }
        Ok(())
    }
}

// ============================================================================
// Parametric paths
// ============================================================================

/// Rectangle centred on `position` with size `scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct RectPath {
    pub radius: f32,
    pub position: Vec2,
    pub scale: Vec2,

    pub radius_track: FloatTrack,
    pub position_track: VectorTrack,
    pub scale_track: VectorTrack,
}

impl Default for RectPath {
    fn default() -> Self {
        Self {
            radius: 0.0,
            position: Vec2::ZERO,
            scale: Vec2::splat(100.0),
            radius_track: FloatTrack::default(),
            position_track: VectorTrack::default(),
            scale_track: VectorTrack::default(),
        }
    }
}

impl RectPath {
    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.radius_track.sample_into(frame, &mut self.radius);
        changed |= self.position_track.sample_into(frame, &mut self.position);
        changed |= self.scale_track.sample_into(frame, &mut self.scale);
        changed
    }

    pub fn append_to(&self, shape: &mut Shape) {
        shape.append_rect(
            self.position - self.scale * 0.5,
            self.scale,
            self.radius,
            self.radius,
        );
    }
}

/// Ellipse centred on `position`; `scale` is the full width and height.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsePath {
    pub position: Vec2,
    pub scale: Vec2,

    pub position_track: VectorTrack,
    pub scale_track: VectorTrack,
}

impl Default for EllipsePath {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::splat(100.0),
            position_track: VectorTrack::default(),
            scale_track: VectorTrack::default(),
        }
    }
}

impl EllipsePath {
    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.position_track.sample_into(frame, &mut self.position);
        changed |= self.scale_track.sample_into(frame, &mut self.scale);
        changed
    }

    pub fn append_to(&self, shape: &mut Shape) {
        shape.append_circle(self.position, self.scale * 0.5);
    }
}

/// Regular polygon. Fewer than three corners are drawn as a triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonPath {
    pub points: i32,
    /// Degrees.
    pub rotation: f32,
    pub outer_radius: f32,
    pub position: Vec2,

    pub points_track: IntegerTrack,
    pub rotation_track: FloatTrack,
    pub outer_radius_track: FloatTrack,
    pub position_track: VectorTrack,
}

impl Default for PolygonPath {
    fn default() -> Self {
        Self {
            points: 3,
            rotation: 0.0,
            outer_radius: 100.0,
            position: Vec2::ZERO,
            points_track: IntegerTrack::default(),
            rotation_track: FloatTrack::default(),
            outer_radius_track: FloatTrack::default(),
            position_track: VectorTrack::default(),
        }
    }
}

impl PolygonPath {
    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.points_track.sample_into(frame, &mut self.points);
        changed |= self.rotation_track.sample_into(frame, &mut self.rotation);
        changed |= self.outer_radius_track.sample_into(frame, &mut self.outer_radius);
        changed |= self.position_track.sample_into(frame, &mut self.position);
        changed
    }

    #[must_use]
    pub fn to_raw_path(&self) -> RawPath {
        let n = self.points.max(MIN_POLYGON_POINTS);
        let step = 360.0 / n as f32;
        let vertices = (0..n).map(|i| {
            let degrees = START_ANGLE_DEG + self.rotation + i as f32 * step;
            (degrees, self.outer_radius)
        });
        closed_ring(self.position, vertices)
    }

    pub fn append_to(&self, shape: &mut Shape) {
        self.to_raw_path().append_to(shape);
    }
}

/// Star alternating between `outer_radius` and `inner_radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarPolygonPath {
    pub points: i32,
    /// Degrees.
    pub rotation: f32,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub position: Vec2,

    pub points_track: IntegerTrack,
    pub rotation_track: FloatTrack,
    pub outer_radius_track: FloatTrack,
    pub inner_radius_track: FloatTrack,
    pub position_track: VectorTrack,
}

impl Default for StarPolygonPath {
    fn default() -> Self {
        Self {
            points: 5,
            rotation: 0.0,
            outer_radius: 100.0,
            inner_radius: 100.0,
            position: Vec2::ZERO,
            points_track: IntegerTrack::default(),
            rotation_track: FloatTrack::default(),
            outer_radius_track: FloatTrack::default(),
            inner_radius_track: FloatTrack::default(),
            position_track: VectorTrack::default(),
        }
    }
}

impl StarPolygonPath {
    pub fn update(&mut self, frame: f32) -> bool {
        let mut changed = self.points_track.sample_into(frame, &mut self.points);
        changed |= self.rotation_track.sample_into(frame, &mut self.rotation);
        changed |= self.outer_radius_track.sample_into(frame, &mut self.outer_radius);
        changed |= self.inner_radius_track.sample_into(frame, &mut self.inner_radius);
        changed |= self.position_track.sample_into(frame, &mut self.position);
        changed
    }

    #[must_use]
    pub fn to_raw_path(&self) -> RawPath {
        let n = self.points.max(MIN_STAR_POINTS) * 2;
        let step = 360.0 / n as f32;
        let vertices = (0..n).map(|i| {
            let degrees = START_ANGLE_DEG + self.rotation + i as f32 * step;
            let radius = if i % 2 == 0 {
                self.outer_radius
            } else {
                self.inner_radius
            };
            (degrees, radius)
        });
        closed_ring(self.position, vertices)
    }

    pub fn append_to(&self, shape: &mut Shape) {
        self.to_raw_path().append_to(shape);
    }
}

fn closed_ring(center: Vec2, vertices: impl Iterator<Item = (f32, f32)>) -> RawPath {
    let mut points: Vec<PathPoint> = vertices
        .enumerate()
        .map(|(i, (degrees, radius))| {
            let kind = if i == 0 {
                PathPointType::MoveTo
            } else {
                PathPointType::LineTo
            };
            PathPoint::new(center + Vec2::from_angle(degrees.to_radians()) * radius, kind)
        })
        .collect();
    points.push(PathPoint::close());

    RawPath { points, center }
}

// ============================================================================
// Path sum type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Rect,
    Ellipse,
    Polygon,
    Star,
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    Rect(RectPath),
    Ellipse(EllipsePath),
    Polygon(PolygonPath),
    Star(StarPolygonPath),
    Raw(RawPath),
}

impl Path {
    #[must_use]
    pub fn kind(&self) -> PathKind {
        match self {
            Self::Rect(_) => PathKind::Rect,
            Self::Ellipse(_) => PathKind::Ellipse,
            Self::Polygon(_) => PathKind::Polygon,
            Self::Star(_) => PathKind::Star,
            Self::Raw(_) => PathKind::Raw,
        }
    }

    /// Samples the variant's tracks at `frame`. Returns `true` if any field changed.
    pub fn update(&mut self, frame: f32) -> bool {
        match self {
            Self::Rect(p) => p.update(frame),
            Self::Ellipse(p) => p.update(frame),
            Self::Polygon(p) => p.update(frame),
            Self::Star(p) => p.update(frame),
            Self::Raw(p) => p.update(frame),
        }
    }

    pub fn append_to(&self, shape: &mut Shape) {
        match self {
            Self::Rect(p) => p.append_to(shape),
            Self::Ellipse(p) => p.append_to(shape),
            Self::Polygon(p) => p.append_to(shape),
            Self::Star(p) => p.append_to(shape),
            Self::Raw(p) => p.append_to(shape),
        }
    }
}

/// Typed access to one [`Path`] variant.
pub trait PathVariant: Sized {
    const KIND: PathKind;

    fn from_path(path: &Path) -> Option<&Self>;
    fn from_path_mut(path: &mut Path) -> Option<&mut Self>;
    fn into_path(self) -> Path;
}

macro_rules! impl_path_variant {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PathVariant for $ty {
                const KIND: PathKind = PathKind::$variant;

                #[inline]
                fn from_path(path: &Path) -> Option<&Self> {
                    match path {
                        Path::$variant(p) => Some(p),
                        _ => None,
                    }
                }

                #[inline]
                fn from_path_mut(path: &mut Path) -> Option<&mut Self> {
                    match path {
                        Path::$variant(p) => Some(p),
                        _ => None,
                    }
                }

                #[inline]
                fn into_path(self) -> Path {
                    Path::$variant(self)
                }
            }

            impl From<$ty> for Path {
                fn from(value: $ty) -> Self {
                    value.into_path()
                }
            }
        )*
    };
}

impl_path_variant! {
    RectPath => Rect,
    EllipsePath => Ellipse,
    PolygonPath => Polygon,
    StarPolygonPath => Star,
    RawPath => Raw,
}

// ============================================================================
// Component
// ============================================================================

/// Ordered paths making up an entity's outline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathListComponent {
    pub paths: Vec<Path>,
}

impl PathListComponent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(path: impl Into<Path>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn push(&mut self, path: impl Into<Path>) {
        self.paths.push(path.into());
    }

    /// The path at `index`, checked against the requested variant.
    pub fn get<P: PathVariant>(&self, index: usize) -> Result<&P> {
        let path = self.paths.get(index).ok_or(VanimError::PathIndexOutOfRange {
            index,
            len: self.paths.len(),
        })?;
        P::from_path(path).ok_or(VanimError::PathTypeMismatch {
            expected: P::KIND,
            found: path.kind(),
        })
    }

    pub fn get_mut<P: PathVariant>(&mut self, index: usize) -> Result<&mut P> {
        let len = self.paths.len();
        let path = self
            .paths
            .get_mut(index)
            .ok_or(VanimError::PathIndexOutOfRange { index, len })?;
        let found = path.kind();
        P::from_path_mut(path).ok_or(VanimError::PathTypeMismatch {
            expected: P::KIND,
            found,
        })
    }

    /// First path of variant `P` at or after `start`, with its index.
    #[must_use]
    pub fn find<P: PathVariant>(&self, start: usize) -> Option<(usize, &P)> {
        self.paths
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(i, path)| P::from_path(path).map(|p| (i, p)))
    }

    /// Removes and returns the path at `index`.
    pub fn take(&mut self, index: usize) -> Result<Path> {
        if index < self.paths.len() {
            Ok(self.paths.remove(index))
        } else {
            Err(VanimError::PathIndexOutOfRange {
                index,
                len: self.paths.len(),
            })
        }
    }

    pub fn update(&mut self, frame: f32) -> bool {
        self.paths
            .iter_mut()
            .fold(false, |changed, path| path.update(frame) | changed)
    }

    pub fn append_to(&self, shape: &mut Shape) {
        for path in &self.paths {
            path.append_to(shape);
        }
    }
}
