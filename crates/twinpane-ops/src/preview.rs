//! Preview classification and the local preview provider.

use std::fs;
use std::io::Read;

use futures::future::BoxFuture;
use strum::Display;
use twinpane_core::{path, Item, ItemKind};

use crate::root::HostRoot;

/// Bytes of a text file shown in a preview.
pub const TEXT_PREVIEW_LIMIT: usize = 64 * 1024;

const OFFICE: &[&str] = &[
    "doc", "docx", "odt", "rtf", "sxw", "xls", "xlsx", "ods", "csv", "tsv", "dbf", "ppt", "pptx",
    "odp", "sxi", "fodt", "fods", "fodp",
];

const IMAGE: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif", "ico", "pbm", "pgm",
    "ppm", "pnm", "svg", "eps", "raw", "psd",
];

const MEDIA: &[&str] = &[
    "3g2", "3gp", "amv", "asf", "avi", "avm2", "avs", "avs2", "avs3", "bik", "dirac", "divx", "drc",
    "dv", "f4v", "flv", "gxf", "ismv", "m1v", "m2p", "m2ts", "m4v", "mkv", "mov", "mp2", "mp4",
    "mpg", "mpeg", "mpe", "mpv", "mxf", "nut", "ogg", "ogv", "ps", "rm", "rmvb", "roq", "ts", "vob",
    "webm", "wm", "wmv", "yuv", "y4m", "aac", "ac3", "adts", "alac", "amr", "ape", "dts", "eac3",
    "f32", "f64", "flac", "g722", "g723", "g726", "gsm", "m4a", "mka", "mlp", "mp3", "mpa", "mpc",
    "oga", "opus", "ra", "ram", "sbc", "spx", "tta", "voc", "wav", "w64", "wma", "wv",
];

/// Renderer family for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PreviewKind {
    Directory,
    Office,
    Image,
    Pdf,
    Media,
    Text,
}

impl PreviewKind {
    /// Classify an item by kind and lowercase extension.
    pub fn classify(item: &Item) -> Self {
        if item.kind != ItemKind::File {
            return PreviewKind::Directory;
        }
        let ext = item.extension.to_lowercase();
        let ext = ext.as_str();
        if OFFICE.contains(&ext) {
            PreviewKind::Office
        } else if IMAGE.contains(&ext) {
            PreviewKind::Image
        } else if ext == "pdf" {
            PreviewKind::Pdf
        } else if MEDIA.contains(&ext) {
            PreviewKind::Media
        } else {
            PreviewKind::Text
        }
    }

    /// Media previews hold a player that must be disposed on close.
    pub fn has_player(self) -> bool {
        self == PreviewKind::Media
    }
}

/// One row of a directory preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Rendered preview body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    Text { text: String, truncated: bool },
    Directory { entries: Vec<PreviewEntry> },
    /// Kinds rendered elsewhere; only a description is shown.
    Summary(String),
    Unavailable(String),
}

/// A preview ready for the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    /// Logical path of the previewed item.
    pub path: String,
    pub title: String,
    pub kind: PreviewKind,
    pub body: PreviewBody,
}

impl PreviewContent {
    /// Plain text of the body, as copied by "select all".
    pub fn text(&self) -> String {
        match &self.body {
            PreviewBody::Text { text, .. } => text.clone(),
            PreviewBody::Directory { entries } => entries
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            PreviewBody::Summary(s) | PreviewBody::Unavailable(s) => s.clone(),
        }
    }
}

/// Produces previews.
pub trait PreviewProvider: Send + Sync {
    fn preview(&self, item: Item) -> BoxFuture<'static, PreviewContent>;
}

/// Reads previews from the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalPreviewProvider {
    root: HostRoot,
}

impl LocalPreviewProvider {
    pub fn new(root: HostRoot) -> Self {
        Self { root }
    }

    fn render(&self, item: &Item) -> PreviewContent {
        let kind = PreviewKind::classify(item);
        let title = match kind {
            PreviewKind::Directory => format!("Directory: {}", path::display_name(&item.path)),
            _ => item.name.to_string(),
        };
        let body = match self.root.resolve(&item.path) {
            None => PreviewBody::Unavailable(format!("Invalid path: {}", item.path)),
            Some(host) => match kind {
                PreviewKind::Directory => match fs::read_dir(&host) {
                    Ok(entries) => {
                        let mut entries: Vec<PreviewEntry> = entries
                            .flatten()
                            .map(|entry| {
                                let metadata = entry.metadata().ok();
                                PreviewEntry {
                                    name: entry.file_name().to_string_lossy().into_owned(),
                                    is_dir: metadata.as_ref().is_some_and(|m| m.is_dir()),
                                    size: metadata.map(|m| m.len()).unwrap_or(0),
                                }
                            })
                            .collect();
                        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));
                        PreviewBody::Directory { entries }
                    }
                    Err(e) => PreviewBody::Unavailable(format!("Error: {e}")),
                },
                PreviewKind::Text => match read_text(&host) {
                    Some((text, truncated)) => PreviewBody::Text { text, truncated },
                    None => PreviewBody::Unavailable("Cannot preview this file type.".to_string()),
                },
                other => {
                    let size = fs::metadata(&host)
                        .map(|m| humansize::format_size(m.len(), humansize::BINARY))
                        .unwrap_or_else(|_| "?".to_string());
                    PreviewBody::Summary(format!("{other} file, {size}"))
                }
            },
        };
        PreviewContent {
            path: item.path.clone(),
            title,
            kind,
            body,
        }
    }
}

impl PreviewProvider for LocalPreviewProvider {
    fn preview(&self, item: Item) -> BoxFuture<'static, PreviewContent> {
        let provider = self.clone();
        Box::pin(async move {
            let fallback = item.path.clone();
            match tokio::task::spawn_blocking(move || provider.render(&item)).await {
                Ok(content) => content,
                Err(e) => PreviewContent {
                    title: path::display_name(&fallback),
                    path: fallback,
                    kind: PreviewKind::Text,
                    body: PreviewBody::Unavailable(e.to_string()),
                },
            }
        })
    }
}

/// Read the head of a file as lossy UTF-8. Binary files (a NUL in the
/// head) are refused.
fn read_text(host: &std::path::Path) -> Option<(String, bool)> {
    let file = fs::File::open(host).ok()?;
    let mut buf = Vec::with_capacity(TEXT_PREVIEW_LIMIT);
    file.take(TEXT_PREVIEW_LIMIT as u64 + 1).read_to_end(&mut buf).ok()?;
    let truncated = buf.len() > TEXT_PREVIEW_LIMIT;
    buf.truncate(TEXT_PREVIEW_LIMIT);
    if buf.contains(&0) {
        return None;
    }
    Some((String::from_utf8_lossy(&buf).into_owned(), truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let kind = |name: &str| PreviewKind::classify(&Item::file(name, format!("/{name}")));
        assert_eq!(kind("report.DOCX"), PreviewKind::Office);
        assert_eq!(kind("photo.jpeg"), PreviewKind::Image);
        assert_eq!(kind("paper.pdf"), PreviewKind::Pdf);
        assert_eq!(kind("clip.mkv"), PreviewKind::Media);
        assert_eq!(kind("song.flac"), PreviewKind::Media);
        assert_eq!(kind("main.rs"), PreviewKind::Text);
        assert_eq!(kind("Makefile"), PreviewKind::Text);
        assert_eq!(
            PreviewKind::classify(&Item::directory("d", "/d")),
            PreviewKind::Directory
        );
    }

    #[test]
    fn test_only_media_has_player() {
        assert!(PreviewKind::Media.has_player());
        assert!(!PreviewKind::Image.has_player());
    }

    #[test]
    fn test_read_text_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "a".repeat(TEXT_PREVIEW_LIMIT + 10)).unwrap();
        let (text, truncated) = read_text(&path).unwrap();
        assert!(truncated);
        assert_eq!(text.len(), TEXT_PREVIEW_LIMIT);
    }

    #[test]
    fn test_read_text_refuses_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin");
        fs::write(&path, [0u8, 1, 2]).unwrap();
        assert!(read_text(&path).is_none());
    }
}
