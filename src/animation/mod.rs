//! Keyframe animation
//!
//! - [`KeyframeTrack`]: sparse samples with linear or cubic-Bezier easing
//! - [`easing`]: the Bezier progress inversion used between samples
//! - [`Timeline`]: the playback clock behind [`AnimationClock`]

pub mod easing;
pub mod timeline;
pub mod tracks;
pub mod values;

pub use timeline::{AnimationClock, LoopMode, Timeline};
pub use tracks::{ColorTrack, FloatTrack, IntegerTrack, Keyframe, KeyframeTrack, VectorTrack};
pub use values::{Color, Interpolatable};
