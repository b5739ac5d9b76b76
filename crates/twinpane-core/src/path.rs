//! Helpers for slash-separated logical paths.
//!
//! Logical paths are always absolute and rooted at `/`. They never carry the
//! host prefix the backend adds when it touches the real filesystem.

/// Normalize a logical path: collapse `//`, resolve `.` and `..`, and root it.
///
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent of a logical path. The parent of `/` is `/`.
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => normalized[..idx].to_string(),
    }
}

/// Last segment of a path, or `None` for the root.
pub fn last_segment(path: &str) -> Option<&str> {
    path.split('/').rev().find(|s| !s.is_empty())
}

/// Tab/label name for a path: its last segment, or `/` for the root.
pub fn display_name(path: &str) -> String {
    last_segment(path).unwrap_or("/").to_string()
}

/// First segment after the root (`/A/x` gives `A`, `/` gives an empty string).
///
/// Two paths sharing a top segment are treated as living on the same volume.
pub fn top_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or("")
}

/// Join a name onto a directory path.
pub fn join(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Rewrite `path` if it equals `old` or lives under it.
pub fn rebase(path: &str, old: &str, new: &str) -> Option<String> {
    if path == old {
        return Some(new.to_string());
    }
    let rest = path.strip_prefix(old)?;
    rest.starts_with('/').then(|| format!("{new}{rest}"))
}
