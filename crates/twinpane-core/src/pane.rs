//! Per-pane listing, focus and selection state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::item::{Item, PaneId, SortKey, SortOrder};
use crate::path;

/// Identifies one reload of one pane.
///
/// Tickets increase monotonically per pane; only the latest ticket's
/// response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    pub pane: PaneId,
    pub seq: u64,
}

/// What the pane is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A reload is in flight.
    Loading,
    /// A directory listing is shown.
    Ready,
    /// The last reload failed; the message replaces the listing.
    Error(String),
    /// The path points at a file, not a directory.
    IsFile,
}

/// Focus and selection captured by path, for re-application after a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedSelection {
    /// Paths of selected rows.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Path of the focused row.
    #[serde(default)]
    pub focused: Option<String>,
    /// Index of the focused row, the fallback when its path is gone.
    #[serde(default)]
    pub focused_index: Option<usize>,
}

impl RetainedSelection {
    /// Retain only a focus path.
    pub fn focus(path: impl Into<String>) -> Self {
        Self {
            focused: Some(path.into()),
            ..Default::default()
        }
    }

    /// Rewrite every retained path at or below `old` to live under `new`.
    pub fn rebase(&mut self, old: &str, new: &str) {
        for selected in &mut self.selected {
            if let Some(rebased) = path::rebase(selected, old, new) {
                *selected = rebased;
            }
        }
        if let Some(focused) = &mut self.focused {
            if let Some(rebased) = path::rebase(focused, old, new) {
                *focused = rebased;
            }
        }
    }
}

/// One directory pane.
#[derive(Debug, Clone)]
pub struct Pane {
    /// Which pane this is.
    id: PaneId,
    /// Directory currently shown (or being loaded).
    current_path: String,
    /// Rows in display order.
    items: Vec<Item>,
    /// Focused row index.
    focused: Option<usize>,
    /// Selected row indices.
    selected: BTreeSet<usize>,
    /// Sort column.
    sort_by: SortKey,
    /// Sort direction.
    sort_order: SortOrder,
    /// Listing status.
    status: PaneStatus,
    /// Sequence number of the most recently issued reload.
    latest_seq: u64,
}

impl Pane {
    /// Create an empty pane pointed at `current_path`.
    pub fn new(id: PaneId, current_path: impl Into<String>) -> Self {
        Self {
            id,
            current_path: path::normalize(&current_path.into()),
            items: Vec::new(),
            focused: None,
            selected: BTreeSet::new(),
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            status: PaneStatus::Idle,
            latest_seq: 0,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> &PaneStatus {
        &self.status
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Set the sort used by the next reload.
    pub fn set_sort(&mut self, sort_by: SortKey, sort_order: SortOrder) {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
    }

    /// Point the pane at a new directory. Call [`Pane::begin_load`] next.
    pub fn set_path(&mut self, path: &str) {
        self.current_path = path::normalize(path);
    }

    /// Focused row index.
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focused row.
    pub fn focused_item(&self) -> Option<&Item> {
        self.focused.and_then(|i| self.items.get(i))
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected row indices in display order.
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Selected rows in display order.
    pub fn selected_items(&self) -> Vec<&Item> {
        self.selected
            .iter()
            .filter_map(|&i| self.items.get(i))
            .collect()
    }

    /// The selection, or the focused row alone when nothing is selected.
    pub fn selection_or_focused(&self) -> Vec<&Item> {
        let selected = self.selected_items();
        if !selected.is_empty() {
            return selected;
        }
        self.focused_item().into_iter().collect()
    }

    /// Index of the row with `path`.
    pub fn index_of_path(&self, path: &str) -> Option<usize> {
        self.items.iter().position(|item| item.path == path)
    }

    /// Index of the first directory row named `name`.
    pub fn index_of_dir(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.kind == crate::item::ItemKind::Directory && item.name == name)
    }

    /// Index of the parent marker, if listed.
    pub fn parent_marker_index(&self) -> Option<usize> {
        self.items.iter().position(Item::is_parent_marker)
    }

    /// Focus a row. Out-of-range indices are ignored.
    pub fn set_focus(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    /// Drop focus.
    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Set a row's selection state. Out-of-range indices are ignored.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if index >= self.items.len() {
            return;
        }
        if selected {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
    }

    /// Flip a row's selection state.
    pub fn toggle_selected(&mut self, index: usize) {
        let selected = self.is_selected(index);
        self.set_selected(index, !selected);
    }

    /// Select every row except the parent marker.
    pub fn select_all(&mut self) {
        self.selected = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_parent_marker())
            .map(|(i, _)| i)
            .collect();
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Issue a ticket for a new reload of the current path.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_seq += 1;
        self.status = PaneStatus::Loading;
        LoadTicket {
            pane: self.id,
            seq: self.latest_seq,
        }
    }

    /// Check if `ticket` belongs to the most recent reload of this pane.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.pane == self.id && ticket.seq == self.latest_seq
    }

    /// Replace the listing with a successful response.
    ///
    /// Items swap wholesale, focus and selection are cleared, and the
    /// first row is focused. Stale tickets are rejected.
    pub fn apply_listing(&mut self, ticket: LoadTicket, current_path: &str, items: Vec<Item>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current_path = path::normalize(current_path);
        self.items = items;
        self.selected.clear();
        self.focused = if self.items.is_empty() { None } else { Some(0) };
        self.status = PaneStatus::Ready;
        true
    }

    /// Record a failed reload. The path is kept so the user can retry.
    pub fn apply_error(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.clear_listing();
        self.status = PaneStatus::Error(message.into());
        true
    }

    /// Record that the path names a file.
    pub fn apply_is_file(&mut self, ticket: LoadTicket, current_path: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current_path = path::normalize(current_path);
        self.clear_listing();
        self.status = PaneStatus::IsFile;
        true
    }

    fn clear_listing(&mut self) {
        self.items.clear();
        self.selected.clear();
        self.focused = None;
    }

    /// Capture selection and focus by path.
    pub fn retain(&self) -> RetainedSelection {
        RetainedSelection {
            selected: self.selected_items().iter().map(|i| i.path.clone()).collect(),
            focused: self.focused_item().map(|i| i.path.clone()),
            focused_index: self.focused,
        }
    }

    /// Re-apply a retained selection to the current rows.
    ///
    /// Selection is matched by path. Focus goes to the row with the retained
    /// path, else the same index, else the last row.
    pub fn restore(&mut self, retained: &RetainedSelection) {
        self.selected = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| retained.selected.contains(&item.path))
            .map(|(i, _)| i)
            .collect();

        let by_path = retained
            .focused
            .as_deref()
            .and_then(|p| self.index_of_path(p));
        let by_index = retained.focused_index.filter(|&i| i < self.items.len());
        let last = self.items.len().checked_sub(1);

        self.focused = by_path.or(by_index).or(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<Item> {
        vec![
            Item::parent_marker("/"),
            Item::directory("docs", "/home/docs"),
            Item::file("a.txt", "/home/a.txt"),
            Item::file("b.txt", "/home/b.txt"),
        ]
    }

    fn loaded_pane() -> Pane {
        let mut pane = Pane::new(PaneId::Left, "/home");
        let ticket = pane.begin_load();
        assert!(pane.apply_listing(ticket, "/home", listing()));
        pane
    }

    #[test]
    fn test_listing_focuses_first_row() {
        let pane = loaded_pane();
        assert_eq!(pane.focused(), Some(0));
        assert_eq!(pane.selected_indices().count(), 0);
        assert_eq!(pane.status(), &PaneStatus::Ready);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut pane = Pane::new(PaneId::Left, "/");
        let stale = pane.begin_load();
        let fresh = pane.begin_load();

        assert!(pane.apply_listing(fresh, "/new", listing()));
        assert!(!pane.apply_listing(stale, "/old", Vec::new()));
        assert_eq!(pane.current_path(), "/new");
        assert_eq!(pane.len(), 4);
    }

    #[test]
    fn test_error_keeps_path() {
        let mut pane = loaded_pane();
        pane.set_path("/missing");
        let ticket = pane.begin_load();
        pane.apply_error(ticket, "Path not found: /missing");

        assert_eq!(pane.current_path(), "/missing");
        assert!(pane.is_empty());
        assert_eq!(pane.focused(), None);
        assert!(matches!(pane.status(), PaneStatus::Error(_)));
    }

    #[test]
    fn test_select_all_skips_parent_marker() {
        let mut pane = loaded_pane();
        pane.select_all();
        assert!(!pane.is_selected(0));
        assert_eq!(pane.selected_indices().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_restore_by_path() {
        let mut pane = loaded_pane();
        pane.set_selected(2, true);
        pane.set_focus(3);
        let retained = pane.retain();

        let ticket = pane.begin_load();
        let mut reordered = listing();
        reordered.swap(2, 3);
        pane.apply_listing(ticket, "/home", reordered);
        pane.restore(&retained);

        assert_eq!(pane.focused_item().map(|i| i.name.as_str()), Some("b.txt"));
        assert_eq!(pane.selected_items()[0].name, "a.txt");
    }

    #[test]
    fn test_restore_falls_back_to_index_then_last() {
        let mut pane = loaded_pane();
        let retained = RetainedSelection {
            selected: vec![],
            focused: Some("/home/gone.txt".into()),
            focused_index: Some(2),
        };
        pane.restore(&retained);
        assert_eq!(pane.focused(), Some(2));

        let retained = RetainedSelection {
            focused_index: Some(99),
            ..retained
        };
        pane.restore(&retained);
        assert_eq!(pane.focused(), Some(3));
    }

    #[test]
    fn test_retained_rebase() {
        let mut retained = RetainedSelection {
            selected: vec!["/a/old".into(), "/a/old/x".into(), "/a/other".into()],
            focused: Some("/a/old".into()),
            focused_index: Some(1),
        };
        retained.rebase("/a/old", "/a/new");
        assert_eq!(retained.selected, vec!["/a/new", "/a/new/x", "/a/other"]);
        assert_eq!(retained.focused.as_deref(), Some("/a/new"));
    }
}
