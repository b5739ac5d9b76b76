//! Pane loading, focus movement, type-ahead and tabs.

use std::time::Instant;

use twinpane_core::{
    move_focus, path, Direction, LoadTicket, PaneId, PaneStatus, RetainedSelection, SortKey,
    SortOrder,
};
use twinpane_ops::{ListRequest, ListResponse};

use super::effects::{AfterLoad, Effect};
use super::Workbench;

impl Workbench {
    /// Point a pane at `path` and reload it.
    pub fn navigate(&mut self, pane: PaneId, path: &str) {
        self.navigate_with(pane, path, Vec::new());
    }

    pub(crate) fn navigate_with(&mut self, pane: PaneId, path: &str, follow_ups: Vec<AfterLoad>) {
        self.panes[pane.index()].set_path(path);
        self.reload_with(pane, follow_ups);
    }

    /// Reload a pane at its current path.
    pub fn reload(&mut self, pane: PaneId) -> LoadTicket {
        self.reload_with(pane, Vec::new())
    }

    /// Reload and restore the pane's current selection afterwards.
    pub(crate) fn reload_retaining(&mut self, pane: PaneId) -> LoadTicket {
        let retained = self.panes[pane.index()].retain();
        self.reload_with(pane, vec![AfterLoad::Restore(retained)])
    }

    /// Issue a fresh load. Follow-ups registered for older loads of this
    /// pane are dropped.
    pub(crate) fn reload_with(&mut self, pane: PaneId, follow_ups: Vec<AfterLoad>) -> LoadTicket {
        let idx = pane.index();
        self.selection[idx].reset();

        let p = &mut self.panes[idx];
        let ticket = p.begin_load();
        let request = ListRequest {
            path: p.current_path().to_string(),
            show_dotfiles: self.show_dotfiles,
            sort_by: p.sort_by(),
            order: p.sort_order(),
        };

        self.follow_ups.retain(|t, _| t.pane != pane);
        if !follow_ups.is_empty() {
            self.follow_ups.insert(ticket, follow_ups);
        }

        tracing::debug!(target: "pane", pane = pane.key(), seq = ticket.seq, path = %request.path, "reload");
        self.effects.push(Effect::Fetch { ticket, request });
        ticket
    }

    /// Reload one pane or both, restoring the retained selection if asked.
    pub(crate) fn refresh(&mut self, pane: Option<PaneId>, retain: bool) {
        let targets = match pane {
            Some(pane) => vec![pane],
            None => PaneId::ALL.to_vec(),
        };
        for id in targets {
            let idx = id.index();
            if retain {
                let retained = self.retained[idx]
                    .take()
                    .unwrap_or_else(|| self.panes[idx].retain());
                self.reload_with(id, vec![AfterLoad::Restore(retained)]);
            } else {
                self.retained[idx] = None;
                self.reload_with(id, Vec::new());
            }
        }
    }

    /// Capture selection and focus of both panes for a later refresh.
    pub(crate) fn retain_current(&mut self) {
        for id in PaneId::ALL {
            self.retained[id.index()] = Some(self.panes[id.index()].retain());
        }
    }

    pub(crate) fn handle_listing(&mut self, ticket: LoadTicket, result: Result<ListResponse, String>) {
        let pane = ticket.pane;
        let idx = pane.index();
        if !self.panes[idx].is_current(ticket) {
            tracing::debug!(target: "pane", pane = pane.key(), seq = ticket.seq, "discarding stale listing");
            return;
        }
        let follow_ups = self.follow_ups.remove(&ticket).unwrap_or_default();

        match result {
            Ok(ListResponse::Directory {
                current_path,
                items,
            }) => {
                self.panes[idx].apply_listing(ticket, &current_path, items);
                let loaded = self.panes[idx].current_path().to_string();
                self.prefs.set_last_path(pane, &loaded);
                self.prune_folder_sizes();
                for follow_up in follow_ups {
                    self.run_follow_up(pane, follow_up);
                }
                tracing::debug!(target: "pane", pane = pane.key(), path = %loaded, rows = self.panes[idx].len(), "loaded");
            }
            Ok(ListResponse::IsFile { current_path }) => {
                self.panes[idx].apply_is_file(ticket, &current_path);
            }
            Ok(ListResponse::Error(message)) | Err(message) => {
                tracing::warn!(target: "pane", pane = pane.key(), error = %message, "listing failed");
                self.panes[idx].apply_error(ticket, message);
            }
        }
        self.update_active_tab(pane);
    }

    fn run_follow_up(&mut self, pane: PaneId, follow_up: AfterLoad) {
        let p = &mut self.panes[pane.index()];
        match follow_up {
            AfterLoad::Restore(retained) => {
                // An empty snapshot would move focus to the last row.
                if retained != RetainedSelection::default() {
                    p.restore(&retained);
                }
            }
            AfterLoad::FocusName(name) => {
                if let Some(index) = p.index_of_dir(&name) {
                    p.set_focus(index);
                }
            }
            AfterLoad::FocusPath(target) => {
                if let Some(index) = p.index_of_path(&target) {
                    p.set_focus(index);
                }
            }
            AfterLoad::SelectPaths(paths) => {
                let indices: Vec<usize> = paths.iter().filter_map(|t| p.index_of_path(t)).collect();
                for &index in &indices {
                    p.set_selected(index, true);
                }
                if let Some(&first) = indices.first() {
                    p.set_focus(first);
                }
            }
        }
    }

    fn prune_folder_sizes(&mut self) {
        let panes = &self.panes;
        self.folder_sizes
            .retain(|path, _| panes.iter().any(|p| p.index_of_path(path).is_some()));
    }

    fn update_active_tab(&mut self, pane: PaneId) {
        let p = &self.panes[pane.index()];
        let snapshot = p.retain();
        let path = p.current_path().to_string();
        self.tabs.pane_mut(pane).update_active(&path, snapshot);
        self.prefs.set_tab_registry(&self.tabs);
    }

    /// Make the other pane active.
    pub fn switch_pane(&mut self) {
        self.active = self.active.other();
        for controller in &mut self.selection {
            controller.reset();
        }
        self.typeahead.reset();
        tracing::trace!(target: "pane", active = self.active.key(), "pane switched");
    }

    /// Activate a pane without touching its gesture state.
    pub(crate) fn activate_pane(&mut self, pane: PaneId) {
        if self.active != pane {
            self.active = pane;
            self.typeahead.reset();
        }
    }

    pub(crate) fn move_focus(&mut self, direction: Direction) {
        move_focus(&mut self.panes[self.active.index()], direction);
    }

    pub(crate) fn extend_selection(&mut self, direction: Direction) {
        let idx = self.active.index();
        self.selection[idx].shift_arrow(&mut self.panes[idx], direction);
    }

    /// Right arrow: enter the focused directory.
    pub(crate) fn enter_focused_directory(&mut self) {
        let pane = self.active;
        let Some(item) = self.panes[pane.index()].focused_item() else {
            return;
        };
        if item.is_parent_marker() {
            self.go_to_parent(pane);
        } else if item.is_dir() {
            let target = item.path.clone();
            self.navigate(pane, &target);
        }
    }

    /// Left arrow: go to the parent and focus the directory we came from.
    pub(crate) fn go_to_parent(&mut self, pane: PaneId) {
        let p = &self.panes[pane.index()];
        let Some(parent) = p.parent_marker_index().and_then(|i| p.item(i)) else {
            return;
        };
        let target = parent.path.clone();
        let follow_ups = path::last_segment(p.current_path())
            .map(|name| vec![AfterLoad::FocusName(name.to_string())])
            .unwrap_or_default();
        self.navigate_with(pane, &target, follow_ups);
    }

    /// Feed a character to type-ahead and focus the first match.
    pub(crate) fn type_ahead(&mut self, c: char, now: Instant) {
        self.typeahead.push(c, now);
        let p = &mut self.panes[self.active.index()];
        let found = self
            .typeahead
            .find(p.items().iter().map(|item| item.name.as_str()));
        if let Some(index) = found {
            p.set_focus(index);
        }
    }

    /// Header click: same column flips the order, another column starts ascending.
    pub fn sort_by_column(&mut self, pane: PaneId, key: SortKey) {
        let p = &mut self.panes[pane.index()];
        let order = if p.sort_by() == key {
            p.sort_order().toggled()
        } else {
            SortOrder::Asc
        };
        p.set_sort(key, order);
        self.prefs.set_sort(pane, key, order);
        self.reload_retaining(pane);
    }

    pub(crate) fn toggle_dotfiles(&mut self) {
        self.show_dotfiles = !self.show_dotfiles;
        self.prefs.set_show_dotfiles(self.show_dotfiles);
        for pane in PaneId::ALL {
            self.reload_retaining(pane);
        }
    }

    /// Open a new tab on the active pane with its current path and selection.
    pub(crate) fn new_tab(&mut self) {
        let pane = self.active;
        let p = &self.panes[pane.index()];
        if !matches!(p.status(), PaneStatus::Ready) {
            return;
        }
        let path = p.current_path().to_string();
        let snapshot = p.retain();
        let tabs = self.tabs.pane_mut(pane);
        if !tabs.push(&path, snapshot, self.config.max_tabs) {
            self.status = Some(format!("At most {} tabs per pane.", self.config.max_tabs));
            return;
        }
        let index = tabs.active;
        self.activate_tab(pane, index);
    }

    /// Switch to a tab: load its path and restore its snapshot.
    pub fn activate_tab(&mut self, pane: PaneId, index: usize) {
        let Some(tab) = self.tabs.pane_mut(pane).activate(index).cloned() else {
            return;
        };
        self.prefs.set_tab_registry(&self.tabs);
        self.activate_pane(pane);
        self.navigate_with(pane, &tab.path, vec![AfterLoad::Restore(tab.snapshot)]);
    }

    /// Close a tab and load whichever tab becomes active.
    pub fn close_tab(&mut self, pane: PaneId, index: usize) {
        let fallback = self
            .prefs
            .last_path(pane)
            .unwrap_or_else(|| self.panes[pane.index()].current_path().to_string());
        let Some(tab) = self.tabs.pane_mut(pane).close(index, &fallback).cloned() else {
            return;
        };
        self.prefs.set_tab_registry(&self.tabs);
        self.navigate_with(pane, &tab.path, vec![AfterLoad::Restore(tab.snapshot)]);
    }

    pub(crate) fn close_active_tab(&mut self) {
        let pane = self.active;
        let index = self.tabs.pane(pane).map(|t| t.active).unwrap_or(0);
        self.close_tab(pane, index);
    }
}
