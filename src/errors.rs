//! Error Types
//!
//! This module defines the error type used throughout the crate and the
//! status codes reported at the editor boundary.
//!
//! # Overview
//!
//! [`VanimError`] covers the failure modes that can reach a caller:
//! - Unknown ids and stale entity handles
//! - Path list lookups with a bad index or the wrong variant
//! - Malformed input such as an empty freeform point list or a NaN edit value
//! - Settings that fail to parse
//!
//! Internal accessors that document a precondition (for example
//! [`SceneManager::get_component`](crate::scene::SceneManager::get_component))
//! panic instead; everything in [`crate::edit`] converts errors into an
//! [`EditStatus`] so that external collaborators never observe a crash.
//!
//! ```rust,ignore
//! use vanim::errors::{EditStatus, Result};
//!
//! fn edit() -> Result<()> {
//!     Ok(())
//! }
//!
//! assert_eq!(EditStatus::from_result(&edit()), EditStatus::Success);
//! ```

use thiserror::Error;

use crate::scene::EntityId;
use crate::scene::path::PathKind;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum VanimError {
    // ========================================================================
    // Handle Errors
    // ========================================================================
    /// No live entity is registered under this id.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The handle points at a destroyed (or swept) entity.
    #[error("Entity handle is stale")]
    StaleEntity,

    /// No scene is registered under this id.
    #[error("Scene not found: {0}")]
    SceneNotFound(EntityId),

    /// The canvas handle is unknown, or no canvas has focus.
    #[error("Canvas not found")]
    CanvasNotFound,

    /// The entity is the proxy of a top-level scene, which only
    /// scene removal may destroy.
    #[error("Entity {0} is the proxy of a top-level scene")]
    ProtectedEntity(EntityId),

    /// The entity lacks a component the operation requires.
    #[error("Entity is missing component `{0}`")]
    MissingComponent(&'static str),

    // ========================================================================
    // Path Errors
    // ========================================================================
    /// An edit carried a NaN or infinite value.
    #[error("Edit value is not finite")]
    NonFiniteValue,

    /// A freeform path was requested with no points.
    #[error("Path point list is empty")]
    EmptyPath,

    /// Path index outside the entity's path list.
    #[error("Path index out of range: {index} (len: {len})")]
    PathIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of paths in the list
        len: usize,
    },

    /// The path at the index is a different variant.
    #[error("Path type mismatch: expected {expected:?}, found {found:?}")]
    PathTypeMismatch {
        /// Variant the caller asked for
        expected: PathKind,
        /// Variant actually stored
        found: PathKind,
    },

    /// Point index outside a raw path's point list.
    #[error("Path point index out of range: {index} (len: {len})")]
    PointIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of points in the path
        len: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings JSON could not be parsed.
    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Alias for `Result<T, VanimError>`.
pub type Result<T> = std::result::Result<T, VanimError>;

/// Result codes reported across the editor boundary.
///
/// The numeric values are stable and shared with non-Rust front ends.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditStatus {
    Success = 0,
    InvalidEntity = 1,
    Fail = 2,
    InvalidIndex = 3,
    TypeMismatch = 4,
    Unknown = 255,
}

impl EditStatus {
    #[must_use]
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.status(),
        }
    }

    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl VanimError {
    /// Boundary status code for this error.
    #[must_use]
    pub fn status(&self) -> EditStatus {
        match self {
            Self::EntityNotFound(_) | Self::StaleEntity | Self::MissingComponent(_) => {
                EditStatus::InvalidEntity
            }
            Self::PathIndexOutOfRange { .. } | Self::PointIndexOutOfRange { .. } => {
                EditStatus::InvalidIndex
            }
            Self::PathTypeMismatch { .. } => EditStatus::TypeMismatch,
            Self::SceneNotFound(_)
            | Self::CanvasNotFound
            | Self::ProtectedEntity(_)
            | Self::EmptyPath
            | Self::NonFiniteValue => EditStatus::Fail,
            Self::Settings(_) => EditStatus::Unknown,
        }
    }
}

impl<T> From<Result<T>> for EditStatus {
    fn from(result: Result<T>) -> Self {
        Self::from_result(&result)
    }
}
