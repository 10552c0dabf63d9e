//! Editing boundary
//!
//! What editing tools and GUI panels talk to:
//! - [`Canvas`]: a board scene with the user's main scene nested inside, a
//!   control scene for selection quads, and a [`Timeline`](crate::Timeline)
//! - [`Editor`]: the explicit context owning the [`SceneManager`](crate::SceneManager),
//!   every canvas and the focused one
//! - [`api`]: id-based operations that never panic and report an
//!   [`EditStatus`](crate::EditStatus)

pub mod api;
mod canvas;
mod editor;

pub use canvas::Canvas;
pub use editor::{CanvasHandle, Editor};
