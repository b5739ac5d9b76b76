//! Error types for collaborator calls.

use std::path::PathBuf;

use thiserror::Error;

/// Transport-level or shape failures of a directory listing request.
///
/// Server-reported failures with a message are not errors at this level;
/// they arrive as [`crate::ListResponse::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// The request never completed.
    #[error("Network Error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status.
    #[error("Server Error: {status}")]
    Status { status: u16 },

    /// The payload had neither an error, a file marker, nor an item list.
    #[error("Internal Error: Invalid data structure received.")]
    Malformed,
}

/// Failures of rename/duplicate/create requests.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The source does not exist.
    #[error("Source path does not exist: {path}")]
    SourceMissing { path: String },

    /// The destination already exists.
    #[error("Already exists: {path}")]
    AlreadyExists { path: String },

    /// The logical path escapes the served root.
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// Filesystem error.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking worker died.
    #[error("Task failed: {message}")]
    Task { message: String },
}

impl MutationError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the terminal transport.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The shell could not be started.
    #[error("Failed to start shell: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// The session is gone.
    #[error("Terminal session closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_messages() {
        assert_eq!(
            ListingError::Status { status: 500 }.to_string(),
            "Server Error: 500"
        );
        assert_eq!(
            ListingError::Network {
                message: "connection refused".into()
            }
            .to_string(),
            "Network Error: connection refused"
        );
        assert_eq!(
            ListingError::Malformed.to_string(),
            "Internal Error: Invalid data structure received."
        );
    }
}
