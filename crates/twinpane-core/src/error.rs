//! Error types for the state core.

use std::path::PathBuf;

use thiserror::Error;

use crate::overlay::OverlayKind;

/// Errors from the persistent preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Reading or writing the backing file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but could not be parsed.
    #[error("Failed to parse preferences at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The preference table could not be serialized.
    #[error("Failed to serialize preferences: {message}")]
    Serialize { message: String },
}

impl PrefsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A user action that cannot proceed with the current pane state.
///
/// These are raised before any request is made and are never sent to a
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// The parent marker was used as an operand.
    #[error("Cannot {operation} the parent directory (..)")]
    ParentMarker { operation: &'static str },

    /// The action needs at least one selected or focused item.
    #[error("No items selected.")]
    NothingSelected,

    /// The action needs a focused item.
    #[error("Please focus an item first.")]
    NoFocusedItem,

    /// The action needs a focused regular file.
    #[error("No file is focused.")]
    NoFocusedFile,

    /// The pane has no loaded directory to act in.
    #[error("Pane is not showing a directory.")]
    NoDirectory,

    /// A name typed into a prompt is not usable.
    #[error("{0}")]
    InvalidName(String),
}

/// Errors from the overlay modality stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Another overlay is already open; callers must close it first.
    #[error("Overlay already open: {active}")]
    Busy { active: OverlayKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        let err = PreconditionError::ParentMarker { operation: "copy" };
        assert_eq!(err.to_string(), "Cannot copy the parent directory (..)");
        assert_eq!(PreconditionError::NoFocusedFile.to_string(), "No file is focused.");
    }

    #[test]
    fn test_overlay_busy_message() {
        let err = OverlayError::Busy {
            active: OverlayKind::Message,
        };
        assert_eq!(err.to_string(), "Overlay already open: message");
    }
}
