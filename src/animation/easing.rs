//! Cubic-Bezier easing
//!
//! Eased segments are described like CSS `cubic-bezier()`: the curve runs
//! from `(0, 0)` to `(1, 1)` with two inner control points. The x axis is the
//! linear progress through the segment, the y axis the eased progress.

use glam::Vec2;

const MAX_ITERATIONS: usize = 256;
const EPSILON: f32 = 1e-4;

/// Tangents below this magnitude are treated as "no easing".
pub const TANGENT_EPSILON: f32 = 1e-6;

#[inline]
fn bezier_component(p1: f32, p2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

/// Returns `true` if the tangent pair describes a straight (linear) segment.
#[inline]
#[must_use]
pub fn is_linear(out_tangent: Vec2, in_tangent: Vec2) -> bool {
    out_tangent.abs().max_element() < TANGENT_EPSILON
        && in_tangent.abs().max_element() < TANGENT_EPSILON
}

/// Maps linear progress `t` to eased progress.
///
/// Bisects on the curve's x to find the parameter `s` with `x(s) = t`, then
/// returns `y(s)`. `t` is clamped to `[0, 1]`.
#[must_use]
pub fn cubic_bezier_progress(p1: Vec2, p2: Vec2, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);

    let mut lo = 0.0_f32;
    let mut hi = 1.0_f32;
    let mut s = 0.5_f32;

    for _ in 0..MAX_ITERATIONS {
        s = 0.5 * (lo + hi);
        let x = bezier_component(p1.x, p2.x, s);
        if (x - t).abs() < EPSILON {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
    }

    bezier_component(p1.y, p2.y, s)
}
