use glam::Vec2;

use crate::animation::easing::{cubic_bezier_progress, is_linear};
use crate::animation::values::{Color, Interpolatable};

/// A single sample of a [`KeyframeTrack`].
///
/// Tangents are Bezier control points in normalized segment space: the
/// `out_tangent` of a sample and the `in_tangent` of the next one form the
/// two inner control points of that segment's easing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub frame: u32,
    pub value: T,
    pub in_tangent: Vec2,
    pub out_tangent: Vec2,
}

impl<T> Keyframe<T> {
    #[must_use]
    pub fn new(frame: u32, value: T) -> Self {
        Self {
            frame,
            value,
            in_tangent: Vec2::ZERO,
            out_tangent: Vec2::ZERO,
        }
    }
}

/// Sparse, frame-sorted samples of one animated property.
///
/// A disabled track is ignored by the update pipeline; adding the first
/// sample enables it.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub enabled: bool,
    keyframes: Vec<Keyframe<T>>,
}

pub type FloatTrack = KeyframeTrack<f32>;
pub type IntegerTrack = KeyframeTrack<i32>;
pub type VectorTrack = KeyframeTrack<Vec2>;
pub type ColorTrack = KeyframeTrack<Color>;

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self {
            enabled: false,
            keyframes: Vec::new(),
        }
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Inserts a sample, or overwrites the value of the sample already at `frame`.
    ///
    /// The first sample added away from frame 0 also creates an implicit
    /// sample at frame 0 holding the same value, so the property keeps its
    /// value before the user's first key.
    pub fn add(&mut self, frame: u32, value: T) {
        match self.keyframes.binary_search_by_key(&frame, |k| k.frame) {
            Ok(idx) => self.keyframes[idx].value = value,
            Err(idx) => {
                self.enabled = true;
                if self.keyframes.is_empty() && frame != 0 {
                    self.keyframes.push(Keyframe::new(0, value));
                    self.keyframes.push(Keyframe::new(frame, value));
                } else {
                    self.keyframes.insert(idx, Keyframe::new(frame, value));
                }
            }
        }
    }

    /// Attaches easing tangents to the sample at `frame`.
    ///
    /// Returns `false` if no sample sits at `frame`.
    pub fn set_tangents(&mut self, frame: u32, in_tangent: Vec2, out_tangent: Vec2) -> bool {
        match self.keyframes.binary_search_by_key(&frame, |k| k.frame) {
            Ok(idx) => {
                let key = &mut self.keyframes[idx];
                key.in_tangent = in_tangent;
                key.out_tangent = out_tangent;
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the sample at `frame`. A track left empty is disabled.
    pub fn remove(&mut self, frame: u32) -> Option<T> {
        let idx = self.keyframes.binary_search_by_key(&frame, |k| k.frame).ok()?;
        let removed = self.keyframes.remove(idx);
        if self.keyframes.is_empty() {
            self.enabled = false;
        }
        Some(removed.value)
    }

    /// Drops every sample and disables the track.
    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.enabled = false;
    }

    /// Samples the track at `frame`.
    ///
    /// # Panics
    ///
    /// Panics if the track is disabled or empty. Callers check
    /// [`enabled`](Self::enabled) first, or use [`try_frame`](Self::try_frame).
    #[must_use]
    pub fn frame(&self, frame: f32) -> T {
        assert!(self.enabled, "Sampled a disabled keyframe track");
        assert!(!self.keyframes.is_empty(), "Sampled an empty keyframe track");

        if self.keyframes.len() == 1 {
            return self.keyframes[0].value;
        }

        // First sample whose frame is not before `frame`
        let hi_idx = self.keyframes.partition_point(|k| (k.frame as f32) < frame);

        if hi_idx == self.keyframes.len() {
            return self.keyframes[hi_idx - 1].value;
        }
        if hi_idx == 0 {
            return self.keyframes[0].value;
        }

        let lo = &self.keyframes[hi_idx - 1];
        let hi = &self.keyframes[hi_idx];

        if hi.frame as f32 == frame {
            return hi.value;
        }

        let span = (hi.frame - lo.frame) as f32;
        let t = if span > 0.0 {
            (frame - lo.frame as f32) / span
        } else {
            0.0
        };

        let progress = if is_linear(lo.out_tangent, hi.in_tangent) {
            t
        } else {
            cubic_bezier_progress(lo.out_tangent, hi.in_tangent, t)
        };

        T::interpolate_linear(lo.value, hi.value, progress)
    }

    /// Non-panicking [`frame`](Self::frame).
    #[must_use]
    pub fn try_frame(&self, frame: f32) -> Option<T> {
        if self.enabled && !self.keyframes.is_empty() {
            Some(self.frame(frame))
        } else {
            None
        }
    }

    /// Samples into `dst` if the track is enabled.
    ///
    /// Returns `true` only when `dst` actually changed.
    pub fn sample_into(&self, frame: f32, dst: &mut T) -> bool {
        match self.try_frame(frame) {
            Some(value) if value != *dst => {
                *dst = value;
                true
            }
            _ => false,
        }
    }

    /// The last sample strictly before `frame`.
    #[must_use]
    pub fn keyframe_before(&self, frame: u32) -> Option<&Keyframe<T>> {
        let idx = self.keyframes.partition_point(|k| k.frame < frame);
        idx.checked_sub(1).map(|i| &self.keyframes[i])
    }

    /// The first sample strictly after `frame`.
    #[must_use]
    pub fn keyframe_after(&self, frame: u32) -> Option<&Keyframe<T>> {
        let idx = self.keyframes.partition_point(|k| k.frame <= frame);
        self.keyframes.get(idx)
    }
}
