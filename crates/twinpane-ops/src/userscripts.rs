//! Userscript discovery.

use std::fs;
use std::path::{Path, PathBuf};

/// An executable script offered in the userscripts menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Userscript {
    /// Stable id: the file name.
    pub id: String,
    pub path: PathBuf,
}

/// List executable regular files in `dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn discover_userscripts(dir: &Path) -> Vec<Userscript> {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::debug!(target: "userscripts", dir = %dir.display(), "no userscript directory");
        return Vec::new();
    };

    let mut scripts: Vec<Userscript> = entries
        .flatten()
        .filter(|entry| entry.metadata().is_ok_and(|m| m.is_file() && is_executable(&m)))
        .map(|entry| Userscript {
            id: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        })
        .collect();
    scripts.sort_by(|a, b| a.id.cmp(&b.id));
    scripts
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_discover_only_executables() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("tidy.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let scripts = discover_userscripts(dir.path());
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].id, "tidy.sh");
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(discover_userscripts(Path::new("/definitely/not/here")).is_empty());
    }
}
