//! Editor Settings
//!
//! Defaults consumed by the layer factories and the canvas setup.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vanim::settings::EditorSettings;
//!
//! // Built-in defaults
//! let settings = EditorSettings::default();
//!
//! // Override a subset from JSON; missing fields keep their defaults
//! let settings = EditorSettings::from_json_str(r#"{ "star_points": 6 }"#)?;
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

// ---------------------------------------------------------------------------
// EditorSettings
// ---------------------------------------------------------------------------

/// Factory and canvas defaults.
///
/// Colors are RGB triples in `0..=255`; alphas are in `0..=255`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Corner count of a freshly created polygon layer.
    pub polygon_points: i32,

    /// Point count of a freshly created star layer.
    pub star_points: i32,

    /// Fill color of new shape layers.
    pub fill_color: Vec3,

    /// Fill alpha of new shape layers.
    pub fill_alpha: f32,

    /// Stroke color of new strokes.
    pub stroke_color: Vec3,

    /// Stroke width attached by the fill+stroke factories.
    pub stroke_width: f32,

    /// Stroke width of freeform path layers.
    pub path_line_width: f32,

    /// Stroke color of selection quads in the control scene.
    pub outline_color: Vec3,

    /// Stroke width of selection quads.
    pub outline_width: f32,

    /// Top-left corner of the canvas board.
    pub board_origin: Vec2,

    /// Size of the canvas board.
    pub board_size: Vec2,

    /// Fill color of the canvas board.
    pub board_color: Vec3,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            polygon_points: 5,
            star_points: 5,
            fill_color: Vec3::new(128.0, 128.0, 128.0),
            fill_alpha: 255.0,
            stroke_color: Vec3::ZERO,
            stroke_width: 1.5,
            path_line_width: 2.0,
            outline_color: Vec3::new(28.0, 155.0, 255.0),
            outline_width: 1.0,
            board_origin: Vec2::splat(-256.0),
            board_size: Vec2::splat(512.0),
            board_color: Vec3::new(255.0, 255.0, 255.0),
        }
    }
}

impl EditorSettings {
    /// Parses settings from JSON. Fields absent from the document keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        log::debug!("Loaded editor settings: {settings:?}");
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
