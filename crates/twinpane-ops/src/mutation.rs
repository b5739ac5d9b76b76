//! Rename, duplicate and create requests.

use std::fs;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use twinpane_core::path;

use crate::error::MutationError;
use crate::root::HostRoot;

/// A single-item mutation, addressed by logical paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    Rename { source: String, destination: String },
    Duplicate { source: String, destination: String },
    CreateDirectory { path: String },
    CreateFile { path: String },
}

impl MutationRequest {
    /// Verb used in failure messages (`"Rename failed: ..."`).
    pub fn verb(&self) -> &'static str {
        match self {
            MutationRequest::Rename { .. } => "Rename",
            MutationRequest::Duplicate { .. } => "Duplicate",
            MutationRequest::CreateDirectory { .. } => "Create directory",
            MutationRequest::CreateFile { .. } => "Create file",
        }
    }

    /// Logical path that exists after a successful request.
    pub fn result_path(&self) -> &str {
        match self {
            MutationRequest::Rename { destination, .. }
            | MutationRequest::Duplicate { destination, .. } => destination,
            MutationRequest::CreateDirectory { path } | MutationRequest::CreateFile { path } => path,
        }
    }
}

/// Performs [`MutationRequest`]s.
pub trait FileMutationService: Send + Sync {
    fn apply(&self, request: MutationRequest) -> BoxFuture<'static, Result<String, MutationError>>;
}

/// Mutates files below a [`HostRoot`].
#[derive(Debug, Clone)]
pub struct LocalMutationService {
    root: HostRoot,
}

impl LocalMutationService {
    pub fn new(root: HostRoot) -> Self {
        Self { root }
    }

    fn host(&self, logical: &str) -> Result<PathBuf, MutationError> {
        self.root
            .resolve(logical)
            .ok_or_else(|| MutationError::InvalidPath {
                path: logical.to_string(),
            })
    }

    fn apply_blocking(&self, request: &MutationRequest) -> Result<String, MutationError> {
        match request {
            MutationRequest::Rename { source, destination } => {
                let from = self.existing(source)?;
                let to = self.vacant(destination)?;
                fs::rename(&from, &to).map_err(|e| MutationError::io(&from, e))?;
            }
            MutationRequest::Duplicate { source, destination } => {
                let from = self.existing(source)?;
                let to = self.vacant(destination)?;
                if from.is_dir() {
                    copy_dir_recursive(&from, &to)?;
                } else {
                    fs::copy(&from, &to).map_err(|e| MutationError::io(&from, e))?;
                }
            }
            MutationRequest::CreateDirectory { path } => {
                let dir = self.vacant(path)?;
                fs::create_dir_all(&dir).map_err(|e| MutationError::io(&dir, e))?;
            }
            MutationRequest::CreateFile { path } => {
                let file = self.vacant(path)?;
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent).map_err(|e| MutationError::io(parent, e))?;
                }
                fs::File::create(&file).map_err(|e| MutationError::io(&file, e))?;
            }
        }
        tracing::info!(target: "mutation", verb = request.verb(), path = request.result_path(), "applied");
        Ok(path::normalize(request.result_path()))
    }

    fn existing(&self, logical: &str) -> Result<PathBuf, MutationError> {
        let host = self.host(logical)?;
        if fs::symlink_metadata(&host).is_err() {
            return Err(MutationError::SourceMissing {
                path: logical.to_string(),
            });
        }
        Ok(host)
    }

    fn vacant(&self, logical: &str) -> Result<PathBuf, MutationError> {
        let host = self.host(logical)?;
        if fs::symlink_metadata(&host).is_ok() {
            return Err(MutationError::AlreadyExists {
                path: logical.to_string(),
            });
        }
        Ok(host)
    }
}

impl FileMutationService for LocalMutationService {
    fn apply(&self, request: MutationRequest) -> BoxFuture<'static, Result<String, MutationError>> {
        let service = self.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || service.apply_blocking(&request))
                .await
                .map_err(|e| MutationError::Task {
                    message: e.to_string(),
                })?
        })
    }
}

/// Recursively copy a directory tree, returning the bytes copied.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<u64, MutationError> {
    fs::create_dir_all(dest).map_err(|e| MutationError::io(dest, e))?;

    let mut total_bytes = 0u64;
    let entries = fs::read_dir(source).map_err(|e| MutationError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| MutationError::io(source, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if from.is_dir() {
            total_bytes += copy_dir_recursive(&from, &to)?;
        } else {
            total_bytes += fs::copy(&from, &to).map_err(|e| MutationError::io(&from, e))?;
        }
    }
    Ok(total_bytes)
}

/// Default name offered when duplicating `name`: `report.txt` becomes
/// `report_copy.txt`, `notes` becomes `notes_copy`.
pub fn duplicate_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => format!("{}_copy{}", &name[..idx], &name[idx..]),
        _ => format!("{name}_copy"),
    }
}

/// Check that a name typed into a prompt can be used as a file name.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }
    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".into());
    }
    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain '{}'", c));
        }
    }
    if name == "." || name == ".." {
        return Err("Invalid name".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name() {
        assert_eq!(duplicate_name("report.txt"), "report_copy.txt");
        assert_eq!(duplicate_name("archive.tar.gz"), "archive.tar_copy.gz");
        assert_eq!(duplicate_name("notes"), "notes_copy");
        assert_eq!(duplicate_name(".bashrc"), "_copy.bashrc");
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("ok.txt").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("a/b").is_err());
        assert!(validate_filename("..").is_err());
        assert!(validate_filename(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_request_paths() {
        let rename = MutationRequest::Rename {
            source: "/a/old".into(),
            destination: "/a/new".into(),
        };
        assert_eq!(rename.result_path(), "/a/new");
        assert_eq!(rename.verb(), "Rename");
    }
}
