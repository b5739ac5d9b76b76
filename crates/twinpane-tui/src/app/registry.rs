//! Named actions reachable from menus.
//!
//! Menu entries and userscripts resolve through one registry keyed by a
//! stable id, in registration order.

use indexmap::IndexMap;
use twinpane_ops::Userscript;

use crate::event::KeyAction;

/// What a registered entry does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Same as pressing the key bound to this action.
    Key(KeyAction),
    /// Run a userscript in the terminal overlay.
    Userscript(Userscript),
}

/// A registered action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAction {
    pub label: String,
    pub action: MenuAction,
}

/// One row of the menu overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub menu: String,
    pub id: String,
    pub label: String,
}

/// Action registry with menus.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: IndexMap<String, RegisteredAction>,
    menus: IndexMap<String, Vec<String>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `edit` and `view` menus.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let builtins = [
            ("edit", "duplicate", "Duplicate", KeyAction::Duplicate),
            ("edit", "rename", "Rename", KeyAction::Rename),
            ("edit", "new", "New folder or file", KeyAction::NewItem),
            ("edit", "archive", "Zip selection", KeyAction::Archive),
            ("edit", "delete", "Delete", KeyAction::Delete),
            ("view", "shell", "Open shell here", KeyAction::OpenShell),
            ("view", "dotfiles", "Toggle dotfiles", KeyAction::ToggleDotfiles),
            ("view", "upload", "Upload files", KeyAction::Upload),
            ("view", "download", "Download file", KeyAction::Download),
        ];
        for (menu, id, label, action) in builtins {
            registry.register(id, label, MenuAction::Key(action));
            registry.add_to_menu(menu, id);
        }
        registry
    }

    /// Register or replace an action.
    pub fn register(&mut self, id: &str, label: &str, action: MenuAction) {
        self.actions.insert(
            id.to_string(),
            RegisteredAction {
                label: label.to_string(),
                action,
            },
        );
    }

    /// Append a registered action to a menu. Unknown ids are ignored.
    pub fn add_to_menu(&mut self, menu: &str, id: &str) -> bool {
        if !self.actions.contains_key(id) {
            tracing::warn!(menu, id, "menu entry for unknown action");
            return false;
        }
        let entries = self.menus.entry(menu.to_string()).or_default();
        if !entries.iter().any(|e| e == id) {
            entries.push(id.to_string());
        }
        true
    }

    /// Register discovered userscripts under the `scripts` menu.
    pub fn register_userscripts(&mut self, scripts: Vec<Userscript>) {
        for script in scripts {
            let id = format!("userscript:{}", script.id);
            let label = script.id.clone();
            self.register(&id, &label, MenuAction::Userscript(script));
            self.add_to_menu("scripts", &id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredAction> {
        self.actions.get(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// All menu rows, menus in registration order.
    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.menus
            .iter()
            .flat_map(|(menu, ids)| {
                ids.iter().filter_map(move |id| {
                    self.actions.get(id).map(|registered| MenuEntry {
                        menu: menu.clone(),
                        id: id.clone(),
                        label: registered.label.clone(),
                    })
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_edit_menu_has_duplicate_first() {
        let registry = ActionRegistry::with_defaults();
        let entries = registry.menu_entries();
        assert_eq!(entries[0].menu, "edit");
        assert_eq!(entries[0].id, "duplicate");
        assert_eq!(
            registry.get("duplicate").map(|a| &a.action),
            Some(&MenuAction::Key(KeyAction::Duplicate))
        );
    }

    #[test]
    fn test_userscripts_registered_in_order() {
        let mut registry = ActionRegistry::new();
        registry.register_userscripts(vec![
            Userscript {
                id: "backup".into(),
                path: PathBuf::from("/scripts/backup"),
            },
            Userscript {
                id: "sync".into(),
                path: PathBuf::from("/scripts/sync"),
            },
        ]);

        let ids: Vec<_> = registry.menu_entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["userscript:backup", "userscript:sync"]);
    }

    #[test]
    fn test_unknown_menu_entry_ignored() {
        let mut registry = ActionRegistry::new();
        assert!(!registry.add_to_menu("edit", "missing"));
        assert!(registry.menu_entries().is_empty());
    }
}
