//! Serial folder-size computation.

use std::fs;
use std::path::Path;

use jwalk::WalkDir;
use tokio::sync::mpsc;

use crate::root::HostRoot;
use crate::OPERATION_CHANNEL_SIZE;

/// Computed size of one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSize {
    /// Logical path of the directory.
    pub path: String,
    pub bytes: Result<u64, String>,
}

impl FolderSize {
    /// Size cell text, `ERR` on failure.
    pub fn display(&self) -> String {
        match &self.bytes {
            Ok(bytes) => humansize::format_size(*bytes, humansize::BINARY),
            Err(_) => "ERR".to_string(),
        }
    }
}

/// Handle to the folder-size worker.
///
/// Requests are processed one at a time in arrival order; results arrive on
/// the receiver returned by [`start_folder_size_queue`].
#[derive(Debug, Clone)]
pub struct FolderSizeQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl FolderSizeQueue {
    /// Queue a logical directory path. Returns `false` if the worker is gone.
    pub fn enqueue(&self, path: impl Into<String>) -> bool {
        self.tx.send(path.into()).is_ok()
    }
}

/// Start the worker. Must be called from within a tokio runtime.
pub fn start_folder_size_queue(root: HostRoot) -> (FolderSizeQueue, mpsc::Receiver<FolderSize>) {
    let (tx, mut requests) = mpsc::unbounded_channel::<String>();
    let (result_tx, results) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::spawn(async move {
        while let Some(path) = requests.recv().await {
            let host = root.resolve(&path);
            let bytes = match host {
                Some(host) => tokio::task::spawn_blocking(move || directory_size(&host))
                    .await
                    .unwrap_or_else(|e| Err(e.to_string())),
                None => Err(format!("Invalid path: {path}")),
            };
            if let Err(e) = &bytes {
                tracing::debug!(target: "folder_size", %path, error = %e, "size failed");
            }
            if result_tx.send(FolderSize { path, bytes }).await.is_err() {
                break;
            }
        }
    });

    (FolderSizeQueue { tx }, results)
}

/// Total size of regular files below `path`. Unreadable entries are skipped.
pub fn directory_size(path: &Path) -> Result<u64, String> {
    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if !metadata.is_dir() {
        return Err(format!("Path is not a directory: {}", path.display()));
    }

    let total = WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|m| m.len())
        .sum();
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ok = FolderSize {
            path: "/a".into(),
            bytes: Ok(2048),
        };
        assert!(ok.display().ends_with("KiB"));
        let err = FolderSize {
            path: "/a".into(),
            bytes: Err("boom".into()),
        };
        assert_eq!(err.display(), "ERR");
    }

    #[test]
    fn test_directory_size_counts_nested_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), [0u8; 100]).unwrap();
        fs::write(dir.path().join(".hidden"), [0u8; 20]).unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/deeper/b.bin"), [0u8; 7]).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        assert_eq!(directory_size(dir.path()), Ok(127));
        assert_eq!(directory_size(&dir.path().join("empty")), Ok(0));
    }

    #[test]
    fn test_directory_size_of_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(directory_size(file.path()).is_err());
    }
}
