//! Directory listing collaborator.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use twinpane_core::{path, Item, ItemKind, SortKey, SortOrder};

use crate::error::ListingError;
use crate::root::HostRoot;

/// Parameters of one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Logical directory path.
    pub path: String,
    /// Include entries whose name starts with a dot.
    pub show_dotfiles: bool,
    /// Sort column.
    pub sort_by: SortKey,
    /// Sort direction.
    pub order: SortOrder,
}

impl ListRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            show_dotfiles: false,
            sort_by: SortKey::Name,
            order: SortOrder::Asc,
        }
    }
}

/// A completed listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListResponse {
    /// The path is a directory.
    Directory { current_path: String, items: Vec<Item> },
    /// The path names a file.
    IsFile { current_path: String },
    /// The service reported a failure.
    Error(String),
}

/// Wire shape shared by every listing backend.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WireListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    is_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<Item>>,
}

impl ListResponse {
    /// Interpret a JSON listing payload.
    ///
    /// `{error}` wins, then `{is_file, current_path}`, then `{items}`; any
    /// other shape is [`ListingError::Malformed`].
    pub fn from_json(raw: &str) -> Result<Self, ListingError> {
        let wire: WireListing = serde_json::from_str(raw).map_err(|_| ListingError::Malformed)?;
        if let Some(error) = wire.error {
            return Ok(ListResponse::Error(error));
        }
        if wire.is_file {
            return Ok(ListResponse::IsFile {
                current_path: wire.current_path.unwrap_or_else(|| "/".to_string()),
            });
        }
        match (wire.items, wire.current_path) {
            (Some(items), Some(current_path)) => Ok(ListResponse::Directory { current_path, items }),
            _ => Err(ListingError::Malformed),
        }
    }

    /// Serialize to the wire shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let wire = match self {
            ListResponse::Directory { current_path, items } => WireListing {
                current_path: Some(current_path.clone()),
                items: Some(items.clone()),
                ..Default::default()
            },
            ListResponse::IsFile { current_path } => WireListing {
                is_file: true,
                current_path: Some(current_path.clone()),
                ..Default::default()
            },
            ListResponse::Error(error) => WireListing {
                error: Some(error.clone()),
                ..Default::default()
            },
        };
        serde_json::to_string_pretty(&wire)
    }
}

/// Produces directory listings.
pub trait DirectoryService: Send + Sync {
    fn list(&self, request: ListRequest) -> BoxFuture<'static, Result<ListResponse, ListingError>>;
}

/// Lists directories below a [`HostRoot`] on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDirectoryService {
    root: HostRoot,
}

impl LocalDirectoryService {
    pub fn new(root: HostRoot) -> Self {
        Self { root }
    }

    /// List synchronously. Used by the async wrapper and the CLI.
    pub fn list_blocking(&self, request: &ListRequest) -> ListResponse {
        list_directory(&self.root, request)
    }
}

impl DirectoryService for LocalDirectoryService {
    fn list(&self, request: ListRequest) -> BoxFuture<'static, Result<ListResponse, ListingError>> {
        let root = self.root.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || list_directory(&root, &request))
                .await
                .map_err(|e| ListingError::Network {
                    message: e.to_string(),
                })
        })
    }
}

/// Entry with raw metadata, kept until sorting is done.
struct RawEntry {
    item: Item,
    size: u64,
    modified: Option<SystemTime>,
    created: Option<SystemTime>,
}

fn list_directory(root: &HostRoot, request: &ListRequest) -> ListResponse {
    let logical = path::normalize(&request.path);
    let Some(host) = root.resolve(&logical) else {
        return ListResponse::Error(format!("Invalid path: {logical}"));
    };

    let metadata = match fs::metadata(&host) {
        Ok(m) => m,
        Err(e) => return ListResponse::Error(describe_io(&logical, &e)),
    };
    if !metadata.is_dir() {
        return ListResponse::IsFile {
            current_path: logical,
        };
    }

    let entries = match fs::read_dir(&host) {
        Ok(entries) => entries,
        Err(e) => return ListResponse::Error(describe_io(&logical, &e)),
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !request.show_dotfiles && name.starts_with('.') {
            continue;
        }
        let Some(raw) = raw_entry(&entry.path(), &name, &logical) else {
            continue;
        };
        if raw.item.kind == ItemKind::Directory {
            dirs.push(raw);
        } else {
            files.push(raw);
        }
    }

    sort_entries(&mut dirs, request.sort_by, request.order);
    sort_entries(&mut files, request.sort_by, request.order);

    let mut items = Vec::with_capacity(dirs.len() + files.len() + 1);
    if logical != "/" {
        items.push(Item::parent_marker(path::parent(&logical)));
    }
    items.extend(dirs.into_iter().map(|e| e.item));
    items.extend(files.into_iter().map(|e| e.item));

    tracing::debug!(target: "listing", path = %logical, count = items.len(), "listed directory");
    ListResponse::Directory {
        current_path: logical,
        items,
    }
}

fn raw_entry(host: &Path, name: &str, parent: &str) -> Option<RawEntry> {
    // Follow symlinks like a shell listing would; broken links still show.
    let metadata = fs::metadata(host).or_else(|_| fs::symlink_metadata(host)).ok()?;
    let is_dir = metadata.is_dir();
    let logical = path::join(parent, name);

    let mut item = if is_dir {
        Item::directory(name, logical)
    } else {
        let mut item = Item::file(name, logical);
        item.extension = item.extension.to_lowercase();
        item
    };
    let modified = metadata.modified().ok();
    let created = metadata.created().ok();
    item.size = humansize::format_size(metadata.len(), humansize::BINARY);
    item.modified = format_time(modified);
    item.created = format_time(created);

    Some(RawEntry {
        item,
        size: metadata.len(),
        modified,
        created,
    })
}

fn sort_entries(entries: &mut [RawEntry], key: SortKey, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => compare_lowercase(&a.item.name, &b.item.name),
            SortKey::Extension => compare_lowercase(&a.item.extension, &b.item.extension)
                .then_with(|| compare_lowercase(&a.item.name, &b.item.name)),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::Modified => a.modified.cmp(&b.modified),
            SortKey::Created => a.created.cmp(&b.created),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_lowercase(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Format a timestamp for display, `-` when unavailable.
pub fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => chrono::DateTime::<chrono::Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

fn describe_io(logical: &str, error: &std::io::Error) -> String {
    match error.kind() {
        std::io::ErrorKind::NotFound => format!("Path not found: {logical}"),
        std::io::ErrorKind::PermissionDenied => format!("Permission denied to access: {logical}"),
        _ => format!("Error listing directory: {error}"),
    }
}
