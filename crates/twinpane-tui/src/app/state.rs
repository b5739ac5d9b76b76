//! Persistent user settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use twinpane_core::SessionConfig;

use crate::theme::ThemeVariant;

/// Settings stored in `settings.toml` under the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host directory served as `/`.
    pub root: PathBuf,
    /// Prefix prepended to logical paths in shell commands.
    pub host_prefix: String,
    /// Directory scanned for userscripts.
    pub userscripts_dir: Option<PathBuf>,
    /// Where downloads are saved.
    pub download_dir: Option<PathBuf>,
    /// Overlay content grace period in milliseconds.
    pub overlay_grace_ms: u64,
    /// Type-ahead idle reset in milliseconds.
    pub typeahead_timeout_ms: u64,
    /// Drag threshold in pixels.
    pub drag_threshold_px: f64,
    /// Maximum tabs per pane.
    pub max_tabs: usize,
    pub theme: ThemeVariant,
}

impl Default for Settings {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            root: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
            host_prefix: String::new(),
            userscripts_dir: dirs::config_dir().map(|d| d.join("twinpane").join("userscripts")),
            download_dir: dirs::download_dir(),
            overlay_grace_ms: session.overlay_grace_ms,
            typeahead_timeout_ms: session.typeahead_timeout_ms,
            drag_threshold_px: session.drag_threshold_px,
            max_tabs: session.max_tabs,
            theme: ThemeVariant::default(),
        }
    }
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("twinpane").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&path, content)
    }

    /// Where downloads land when no directory is configured.
    pub fn download_dir_or_default(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("twinpane-downloads"))
    }

    /// Core session tunables. Invalid values fall back to the defaults.
    pub fn to_session_config(&self) -> SessionConfig {
        let built = SessionConfig::builder()
            .overlay_grace_ms(self.overlay_grace_ms)
            .typeahead_timeout_ms(self.typeahead_timeout_ms)
            .drag_threshold_px(self.drag_threshold_px)
            .max_tabs(self.max_tabs)
            .build();
        match built {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid session settings, using defaults");
                SessionConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str("root = \"/srv/files\"\nmax_tabs = 4\n").unwrap();
        assert_eq!(settings.root, PathBuf::from("/srv/files"));
        assert_eq!(settings.max_tabs, 4);
        assert_eq!(settings.overlay_grace_ms, 300);
        assert_eq!(settings.host_prefix, "");
    }

    #[test]
    fn test_invalid_session_values_fall_back() {
        let settings = Settings {
            max_tabs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.to_session_config().max_tabs, SessionConfig::default().max_tabs);
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings {
            host_prefix: "/hostroot".into(),
            theme: ThemeVariant::Light,
            ..Settings::default()
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
