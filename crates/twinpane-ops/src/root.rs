//! Mapping between logical paths and the host filesystem.

use std::path::{Path, PathBuf};

use twinpane_core::path;

/// The directory served as logical `/`.
#[derive(Debug, Clone)]
pub struct HostRoot {
    root: PathBuf,
}

impl HostRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host directory backing `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a logical path.
    ///
    /// The logical path is normalized first, so `..` can never climb above
    /// the root. Returns `None` if the joined path still escapes.
    pub fn resolve(&self, logical: &str) -> Option<PathBuf> {
        let normalized = path::normalize(logical);
        let relative = normalized.trim_start_matches('/');
        let host = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };
        host.starts_with(&self.root).then_some(host)
    }

    /// Logical path for a host path under the root.
    pub fn logical(&self, host: &Path) -> Option<String> {
        let relative = host.strip_prefix(&self.root).ok()?;
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Some(path::normalize(&format!("/{joined}")))
    }
}

/// Prefix prepended to logical paths in shell commands.
///
/// Commands run on the host, where the served tree may be mounted below
/// some prefix (for example `/hostroot`). An empty prefix maps 1:1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPrefix(String);

impl HostPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self(prefix.trim_end_matches('/').to_string())
    }

    /// Host form of a logical path.
    pub fn apply(&self, logical: &str) -> String {
        format!("{}{}", self.0, logical)
    }

    /// Logical form of a host path, if it carries the prefix.
    pub fn strip<'a>(&self, host: &'a str) -> &'a str {
        if self.0.is_empty() {
            return host;
        }
        match host.strip_prefix(self.0.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => host,
        }
    }
}
