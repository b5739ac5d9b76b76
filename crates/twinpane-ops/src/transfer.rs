//! Upload and download collaborators.

use std::fs;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use twinpane_core::path;

use crate::error::MutationError;
use crate::root::HostRoot;

/// Result of one upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Logical paths that were written.
    pub saved: Vec<String>,
    /// `(file name, reason)` for every source that was refused.
    pub failed: Vec<(String, String)>,
}

/// Moves files between the user's machine and the served tree.
pub trait TransferService: Send + Sync {
    /// Store `sources` in logical directory `target`.
    fn upload(&self, target: String, sources: Vec<PathBuf>) -> BoxFuture<'static, UploadOutcome>;

    /// Fetch the logical file `file`; returns where it was stored.
    fn download(&self, file: String) -> BoxFuture<'static, Result<PathBuf, MutationError>>;
}

/// Copies uploads into a [`HostRoot`] and downloads into a local directory.
#[derive(Debug, Clone)]
pub struct LocalTransfers {
    root: HostRoot,
    download_dir: PathBuf,
}

impl LocalTransfers {
    pub fn new(root: HostRoot, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            root,
            download_dir: download_dir.into(),
        }
    }

    fn upload_blocking(&self, target: &str, sources: &[PathBuf]) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();
        let Some(dir) = self.root.resolve(target) else {
            outcome.failed = sources
                .iter()
                .map(|s| (file_name(s), format!("Invalid path: {target}")))
                .collect();
            return outcome;
        };

        for source in sources {
            let name = file_name(source);
            let dest = dir.join(&name);
            if dest.exists() {
                outcome.failed.push((name, "File already exists".to_string()));
                continue;
            }
            match fs::copy(source, &dest) {
                Ok(_) => outcome.saved.push(path::join(target, &name)),
                Err(e) => outcome.failed.push((name, e.to_string())),
            }
        }
        tracing::info!(
            target: "transfer",
            %target,
            saved = outcome.saved.len(),
            failed = outcome.failed.len(),
            "upload finished"
        );
        outcome
    }

    fn download_blocking(&self, file: &str) -> Result<PathBuf, MutationError> {
        let source = self.root.resolve(file).ok_or_else(|| MutationError::InvalidPath {
            path: file.to_string(),
        })?;
        if !source.is_file() {
            return Err(MutationError::SourceMissing {
                path: file.to_string(),
            });
        }
        fs::create_dir_all(&self.download_dir)
            .map_err(|e| MutationError::io(&self.download_dir, e))?;
        let dest = unique_destination(&self.download_dir, &path::display_name(file));
        fs::copy(&source, &dest).map_err(|e| MutationError::io(&source, e))?;
        Ok(dest)
    }
}

impl TransferService for LocalTransfers {
    fn upload(&self, target: String, sources: Vec<PathBuf>) -> BoxFuture<'static, UploadOutcome> {
        let service = self.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || service.upload_blocking(&target, &sources))
                .await
                .unwrap_or_default()
        })
    }

    fn download(&self, file: String) -> BoxFuture<'static, Result<PathBuf, MutationError>> {
        let service = self.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || service.download_blocking(&file))
                .await
                .map_err(|e| MutationError::Task {
                    message: e.to_string(),
                })?
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `dir/name`, or `dir/name (n)` style variants if that is taken.
fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let ext = twinpane_core::extension_of(name);
    let stem = if ext.is_empty() {
        name
    } else {
        &name[..name.len() - ext.len() - 1]
    };
    (1..)
        .map(|n| {
            if ext.is_empty() {
                dir.join(format!("{stem} ({n})"))
            } else {
                dir.join(format!("{stem} ({n}).{ext}"))
            }
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_destination() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.txt"), dir.path().join("a.txt"));
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.txt"), dir.path().join("a (1).txt"));
        fs::write(dir.path().join("b"), "x").unwrap();
        assert_eq!(unique_destination(dir.path(), "b"), dir.path().join("b (1)"));
    }
}
