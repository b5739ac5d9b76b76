//! Persistent key/value preferences.
//!
//! Everything that must survive a restart (last paths, sort order, column
//! widths, dotfile visibility, tabs, space mode) goes through a
//! [`PreferenceStore`]. [`Preferences`] layers typed accessors on top and
//! owns the key naming.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::columns::ColumnWidths;
use crate::error::PrefsError;
use crate::item::{PaneId, SortKey, SortOrder};
use crate::tabs::TabRegistry;

const SHOW_DOTFILES_KEY: &str = "show_dotfiles";
const PANE_TABS_KEY: &str = "pane_tabs";
const SPACE_MODE_KEY: &str = "space_mode";

/// Raw string key/value storage.
pub trait PreferenceStore: Send {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError>;

    /// Delete a value. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), PrefsError>;
}

/// Volatile store, used by tests and when the preference file is unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with values.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PrefsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a TOML table on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Default location: `<config dir>/twinpane/prefs.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("twinpane").join("prefs.toml"))
    }

    /// Open a store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| PrefsError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(PrefsError::io(&path, e)),
        };
        Ok(Self { path, values })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(&self.values).map_err(|e| PrefsError::Serialize {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| PrefsError::io(&self.path, e))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError> {
        if self.values.get(key) == Some(&value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PrefsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// What the space bar does on the file list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpaceMode {
    /// Toggle selection of the focused row.
    #[default]
    Select,
    /// Toggle the preview overlay.
    Preview,
}

impl SpaceMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            SpaceMode::Select => SpaceMode::Preview,
            SpaceMode::Preview => SpaceMode::Select,
        }
    }
}

/// Typed view over a [`PreferenceStore`].
///
/// Write failures are logged and swallowed: losing a preference is never
/// worth interrupting the user.
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    /// Wrap a store.
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Preferences that vanish with the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Raw access, mainly for tests and diagnostics.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    fn write(&mut self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(target: "prefs", key, error = %e, "failed to save preference");
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(target: "prefs", key, error = %e, "failed to remove preference");
        }
    }

    /// Last directory a pane successfully loaded.
    pub fn last_path(&self, pane: PaneId) -> Option<String> {
        self.store.get(&last_path_key(pane))
    }

    /// Record the last directory a pane loaded.
    pub fn set_last_path(&mut self, pane: PaneId, path: &str) {
        self.write(&last_path_key(pane), path.to_string());
    }

    /// Sort column and order for a pane, defaulting to name ascending.
    ///
    /// Unparseable stored values fall back to the defaults.
    pub fn sort(&self, pane: PaneId) -> (SortKey, SortOrder) {
        let key = self
            .store
            .get(&sort_by_key(pane))
            .and_then(|v| SortKey::from_str(&v).ok())
            .unwrap_or_default();
        let order = self
            .store
            .get(&sort_order_key(pane))
            .and_then(|v| SortOrder::from_str(&v).ok())
            .unwrap_or_default();
        (key, order)
    }

    /// Persist a pane's sort column and order.
    pub fn set_sort(&mut self, pane: PaneId, key: SortKey, order: SortOrder) {
        self.write(&sort_by_key(pane), key.to_string());
        self.write(&sort_order_key(pane), order.to_string());
    }

    /// Global dotfile visibility.
    pub fn show_dotfiles(&self) -> bool {
        self.store.get(SHOW_DOTFILES_KEY).as_deref() == Some("true")
    }

    /// Persist dotfile visibility.
    pub fn set_show_dotfiles(&mut self, show: bool) {
        self.write(SHOW_DOTFILES_KEY, show.to_string());
    }

    /// Space bar behaviour.
    pub fn space_mode(&self) -> SpaceMode {
        self.store
            .get(SPACE_MODE_KEY)
            .and_then(|v| SpaceMode::from_str(&v).ok())
            .unwrap_or_default()
    }

    /// Persist space bar behaviour.
    pub fn set_space_mode(&mut self, mode: SpaceMode) {
        self.write(SPACE_MODE_KEY, mode.to_string());
    }

    /// Column widths for a pane.
    ///
    /// An invalid stored value is removed and the defaults are returned.
    pub fn column_widths(&mut self, pane: PaneId) -> ColumnWidths {
        let key = column_widths_key(pane);
        let Some(raw) = self.store.get(&key) else {
            return ColumnWidths::default();
        };
        match ColumnWidths::parse(&raw) {
            Some(widths) => widths,
            None => {
                tracing::warn!(target: "prefs", pane = pane.key(), "invalid saved column widths, using defaults");
                self.delete(&key);
                ColumnWidths::default()
            }
        }
    }

    /// Persist column widths for a pane, sanitized and normalized to 100%.
    pub fn set_column_widths(&mut self, pane: PaneId, widths: &[f64]) -> ColumnWidths {
        let widths = ColumnWidths::sanitized(widths);
        self.write(&column_widths_key(pane), widths.to_json());
        widths
    }

    /// Tab lists of both panes.
    pub fn tab_registry(&self) -> TabRegistry {
        self.store
            .get(PANE_TABS_KEY)
            .and_then(|raw| match TabRegistry::from_json(&raw) {
                Ok(registry) => Some(registry),
                Err(e) => {
                    tracing::warn!(target: "prefs", error = %e, "discarding unreadable tab registry");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Persist the tab lists of both panes.
    pub fn set_tab_registry(&mut self, registry: &TabRegistry) {
        match registry.to_json() {
            Ok(json) => self.write(PANE_TABS_KEY, json),
            Err(e) => tracing::warn!(target: "prefs", error = %e, "failed to serialize tabs"),
        }
    }
}

fn last_path_key(pane: PaneId) -> String {
    format!("{}_last_path", pane.key())
}

fn sort_by_key(pane: PaneId) -> String {
    format!("{}_sort_by", pane.key())
}

fn sort_order_key(pane: PaneId) -> String {
    format!("{}_sort_order", pane.key())
}

fn column_widths_key(pane: PaneId) -> String {
    format!("column_widths_{}", pane.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_defaults_and_round_trip() {
        let mut prefs = Preferences::in_memory();
        assert_eq!(prefs.sort(PaneId::Left), (SortKey::Name, SortOrder::Asc));

        prefs.set_sort(PaneId::Left, SortKey::Size, SortOrder::Desc);
        assert_eq!(prefs.sort(PaneId::Left), (SortKey::Size, SortOrder::Desc));
        assert_eq!(prefs.sort(PaneId::Right), (SortKey::Name, SortOrder::Asc));
    }

    #[test]
    fn test_invalid_column_widths_are_removed() {
        let store = MemoryStore::with_values([("column_widths_pane1", "[1, 2]")]);
        let mut prefs = Preferences::new(store);

        assert_eq!(prefs.column_widths(PaneId::Left), ColumnWidths::default());
        assert!(prefs.get_raw("column_widths_pane1").is_none());
    }

    #[test]
    fn test_column_widths_round_trip_sums_to_hundred() {
        let mut prefs = Preferences::in_memory();
        prefs.set_column_widths(PaneId::Right, &[30.0, 15.0, 12.3, 20.0, 20.0]);

        let loaded = prefs.column_widths(PaneId::Right);
        assert!((loaded.sum() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_dotfiles_and_space_mode() {
        let mut prefs = Preferences::in_memory();
        assert!(!prefs.show_dotfiles());
        prefs.set_show_dotfiles(true);
        assert!(prefs.show_dotfiles());

        assert_eq!(prefs.space_mode(), SpaceMode::Select);
        prefs.set_space_mode(SpaceMode::Preview);
        assert_eq!(prefs.space_mode(), SpaceMode::Preview);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");

        let mut store = FileStore::open(&path).unwrap();
        store.set("pane1_last_path", "/tmp".to_string()).unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("pane1_last_path").as_deref(), Some("/tmp"));
    }

    #[test]
    fn test_file_store_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert!(matches!(FileStore::open(&path), Err(PrefsError::Parse { .. })));
    }
}
