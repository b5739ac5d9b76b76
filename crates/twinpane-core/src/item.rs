//! Pane identity and directory entry types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Name of the synthetic "go up" entry.
pub const PARENT_MARKER_NAME: &str = "..";

/// One of the two directory panes.
///
/// The workbench always has exactly two panes; every lookup of "the other
/// pane" goes through [`PaneId::other`] instead of scanning a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaneId {
    Left,
    Right,
}

impl PaneId {
    /// Both panes, in display order.
    pub const ALL: [PaneId; 2] = [PaneId::Left, PaneId::Right];

    /// The pane that is not `self`.
    pub fn other(self) -> Self {
        match self {
            PaneId::Left => PaneId::Right,
            PaneId::Right => PaneId::Left,
        }
    }

    /// Position of this pane in [`PaneId::ALL`].
    pub fn index(self) -> usize {
        match self {
            PaneId::Left => 0,
            PaneId::Right => 1,
        }
    }

    /// Stable key used for persisted preferences.
    pub fn key(self) -> &'static str {
        match self {
            PaneId::Left => "pane1",
            PaneId::Right => "pane2",
        }
    }

    /// Parse a persisted pane key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pane1" => Some(PaneId::Left),
            "pane2" => Some(PaneId::Right),
            _ => None,
        }
    }
}

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Regular file (or anything that is not a directory).
    File,
    /// Directory.
    Directory,
    /// The `..` entry pointing at the parent directory.
    ParentMarker,
}

/// A single row in a pane listing.
///
/// Display fields are formatted by the listing service; the core never
/// interprets them beyond sorting and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Entry name.
    pub name: CompactString,
    /// Absolute logical path (no host prefix).
    pub path: String,
    /// Entry kind.
    pub kind: ItemKind,
    /// Human-readable size.
    #[serde(default)]
    pub size: String,
    /// Formatted modification time.
    #[serde(default)]
    pub modified: String,
    /// Formatted creation time.
    #[serde(default)]
    pub created: String,
    /// Extension without the leading dot.
    #[serde(default)]
    pub extension: String,
}

impl Item {
    /// Create an item with empty display fields.
    pub fn new(name: impl Into<CompactString>, path: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            size: String::new(),
            modified: String::new(),
            created: String::new(),
            extension: String::new(),
        }
    }

    /// Create a file item.
    pub fn file(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        let mut item = Self::new(name, path, ItemKind::File);
        item.extension = extension_of(&item.name).to_string();
        item
    }

    /// Create a directory item.
    pub fn directory(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self::new(name, path, ItemKind::Directory)
    }

    /// Create the parent marker pointing at `parent_path`.
    pub fn parent_marker(parent_path: impl Into<String>) -> Self {
        Self::new(PARENT_MARKER_NAME, parent_path, ItemKind::ParentMarker)
    }

    /// Check if this is the parent marker.
    pub fn is_parent_marker(&self) -> bool {
        self.kind == ItemKind::ParentMarker
    }

    /// Check if navigating into this item changes directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, ItemKind::Directory | ItemKind::ParentMarker)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }
}

/// Extension of a file name, case preserved.
///
/// Dotfiles without a further dot have no extension.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx + 1..],
    }
}

/// Column a pane listing is sorted by.
///
/// Declaration order matches the column order of the listing header.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Extension,
    Size,
    Modified,
    Created,
}

impl SortKey {
    /// Number of sortable columns.
    pub const COUNT: usize = 5;

    /// Header label for the column.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Extension => "Ext",
            SortKey::Size => "Size",
            SortKey::Modified => "Modified",
            SortKey::Created => "Created",
        }
    }

    /// Column position in the header.
    pub fn column(self) -> usize {
        self as usize
    }
}

/// Direction of a sort.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Snapshot of modifier keys held during a gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    /// Only shift held.
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        meta: false,
        alt: false,
    };

    /// Only ctrl held.
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        meta: false,
        alt: false,
    };

    /// Check if no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Ctrl or Meta, the "toggle" modifiers for pointer gestures.
    pub fn ctrl_or_meta(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_id_other() {
        assert_eq!(PaneId::Left.other(), PaneId::Right);
        assert_eq!(PaneId::Right.other(), PaneId::Left);
        for pane in PaneId::ALL {
            assert_eq!(PaneId::from_key(pane.key()), Some(pane));
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("notes.md"), "md");
    }

    #[test]
    fn test_sort_key_round_trip() {
        use std::str::FromStr;

        assert_eq!(SortKey::from_str("modified").ok(), Some(SortKey::Modified));
        assert_eq!(SortKey::Extension.to_string(), "extension");
        assert_eq!(SortKey::from_repr(2), Some(SortKey::Size));
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
    }

    #[test]
    fn test_item_kinds() {
        let parent = Item::parent_marker("/");
        assert!(parent.is_parent_marker());
        assert!(parent.is_dir());
        assert!(!parent.is_file());

        let file = Item::file("a.txt", "/a.txt");
        assert_eq!(file.extension, "txt");
        assert!(file.is_file());
    }
}
