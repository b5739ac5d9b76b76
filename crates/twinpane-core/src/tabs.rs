//! Per-pane tab lists.
//!
//! Tabs are live bookmarks: the active tab is overwritten with the pane's
//! path and selection every time the pane finishes loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::PaneId;
use crate::pane::RetainedSelection;
use crate::path;

/// A saved pane location with its selection snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Directory path.
    pub path: String,
    /// Label shown in the tab bar.
    pub name: String,
    /// Selection and focus at the time of the last update.
    #[serde(flatten)]
    pub snapshot: RetainedSelection,
}

impl Tab {
    /// Create a tab at `path` with an empty snapshot.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_snapshot(path, RetainedSelection::default())
    }

    /// Create a tab at `path` with a snapshot.
    pub fn with_snapshot(path: impl Into<String>, snapshot: RetainedSelection) -> Self {
        let path = path.into();
        Self {
            name: path::display_name(&path),
            path,
            snapshot,
        }
    }
}

/// Tabs of one pane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneTabs {
    /// Index of the active tab.
    #[serde(default)]
    pub active: usize,
    /// Tabs in display order.
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

impl PaneTabs {
    /// Make sure at least one tab exists, creating one at `last_path`.
    pub fn ensure_initialized(&mut self, last_path: &str) {
        if self.tabs.is_empty() {
            self.tabs.push(Tab::new(last_path));
            self.active = 0;
        }
        self.clamp_active();
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// The active tab.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    /// Make tab `index` active and return it.
    pub fn activate(&mut self, index: usize) -> Option<&Tab> {
        if index >= self.tabs.len() {
            return None;
        }
        self.active = index;
        self.tabs.get(index)
    }

    /// Remove tab `index` and return the tab that is active afterwards.
    ///
    /// Closing a tab at or before the active one moves the active index
    /// back by one, floored at zero. Closing the only tab recreates a tab
    /// at `fallback_path`, so the list is never empty.
    pub fn close(&mut self, index: usize, fallback_path: &str) -> Option<&Tab> {
        if index >= self.tabs.len() {
            return None;
        }
        self.tabs.remove(index);
        if self.active >= index {
            self.active = self.active.saturating_sub(1);
        }
        if self.tabs.is_empty() {
            self.tabs.push(Tab::new(fallback_path));
            self.active = 0;
        }
        self.clamp_active();
        self.tabs.get(self.active)
    }

    /// Overwrite the active tab with the pane's latest state.
    pub fn update_active(&mut self, path: &str, snapshot: RetainedSelection) {
        if self.tabs.is_empty() {
            self.tabs.push(Tab::with_snapshot(path, snapshot));
            self.active = 0;
            return;
        }
        self.clamp_active();
        self.tabs[self.active] = Tab::with_snapshot(path, snapshot);
    }

    /// Append a tab and activate it. Returns false at `max_tabs`.
    pub fn push(&mut self, path: &str, snapshot: RetainedSelection, max_tabs: usize) -> bool {
        if self.tabs.len() >= max_tabs {
            return false;
        }
        self.tabs.push(Tab::with_snapshot(path, snapshot));
        self.active = self.tabs.len() - 1;
        true
    }

    fn clamp_active(&mut self) {
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len().saturating_sub(1);
        }
    }
}

/// Tab lists of both panes, persisted as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabRegistry {
    panes: BTreeMap<String, PaneTabs>,
}

impl TabRegistry {
    /// Tabs of a pane, if any were stored.
    pub fn pane(&self, pane: PaneId) -> Option<&PaneTabs> {
        self.panes.get(pane.key())
    }

    /// Tabs of a pane, created empty on first access.
    pub fn pane_mut(&mut self, pane: PaneId) -> &mut PaneTabs {
        self.panes.entry(pane.key().to_string()).or_default()
    }

    /// Parse the persisted form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize to the persisted form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
