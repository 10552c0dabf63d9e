//! # Vanim
//!
//! Core of a 2-D vector animation editor: a retained-mode scene graph of
//! entities and components, keyframe tracks with cubic-Bezier easing, and an
//! incremental update pipeline that only reconciles what changed each frame.
//!
//! - [`animation`]: keyframe tracks, easing and the playback timeline
//! - [`scene`]: entities, components, scenes and the per-frame pipeline
//! - [`edit`]: the boundary consumed by editing tools and GUI panels
//!
//! ```rust,ignore
//! use glam::Vec2;
//! use vanim::edit::{api, Editor};
//!
//! let mut editor = Editor::default();
//! let canvas = editor.create_canvas();
//! editor.focus(canvas);
//!
//! let scene_id = editor.main_scene_id().unwrap();
//! let rect = api::create_rect_path_entity(&mut editor, scene_id, Vec2::ZERO, Vec2::splat(100.0));
//! editor.tick(1.0 / 30.0);
//! ```

pub mod animation;
pub mod edit;
pub mod errors;
pub mod scene;
pub mod settings;

pub use animation::{AnimationClock, KeyframeTrack, Timeline};
pub use edit::{Canvas, CanvasHandle, Editor};
pub use errors::{EditStatus, Result, VanimError};
pub use scene::{ChangeOrder, Entity, EntityId, Scene, SceneHandle, SceneManager};
pub use settings::EditorSettings;
