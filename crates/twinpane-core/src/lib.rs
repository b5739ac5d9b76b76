//! Interaction state core for twinpane.
//!
//! This crate holds the presentation-independent state of the dual-pane
//! file manager: pane listings with focus and selection, the gesture
//! controllers that mutate them, per-pane tabs, the overlay modality slot,
//! drag recognition, type-ahead, column widths, and persisted preferences.
//!
//! Nothing here performs network or filesystem work except the file-backed
//! preference store; collaborators live in `twinpane-ops`.

mod columns;
mod config;
mod drag;
mod error;
mod item;
mod overlay;
mod pane;
pub mod path;
mod prefs;
mod selection;
mod tabs;
mod typeahead;

pub use columns::{ColumnResize, ColumnWidths, DEFAULT_COLUMN_WIDTHS};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use drag::{
    summary as drag_summary, resolve_drop_action, DragEngine, DragLabel, DragOutcome, DragSession,
    DropAction, DropRequest, DropTarget, HitTest, Point, PointerButton,
};
pub use error::{OverlayError, PreconditionError, PrefsError};
pub use item::{
    extension_of, Item, ItemKind, Modifiers, PaneId, SortKey, SortOrder, PARENT_MARKER_NAME,
};
pub use overlay::{ClosedOverlay, OverlayKind, OverlayStack};
pub use pane::{LoadTicket, Pane, PaneStatus, RetainedSelection};
pub use prefs::{FileStore, MemoryStore, PreferenceStore, Preferences, SpaceMode};
pub use selection::{move_focus, ClickKind, Direction, RangeMode, SelectionController};
pub use tabs::{PaneTabs, Tab, TabRegistry};
pub use typeahead::TypeAhead;
