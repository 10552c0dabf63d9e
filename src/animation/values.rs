use glam::{Vec2, Vec3};

/// RGB color with channels in `0..=255`.
pub type Color = Vec3;

/// Values a [`KeyframeTrack`](super::KeyframeTrack) can interpolate.
pub trait Interpolatable: Copy + PartialEq + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

// Integer properties (corner counts) truncate toward zero.
impl Interpolatable for i32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        (start as f32 + (end - start) as f32 * t) as i32
    }
}

impl Interpolatable for Vec2 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}
