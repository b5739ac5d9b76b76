//! Session configuration for the interaction core.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Idle time after which the type-ahead buffer resets.
pub const DEFAULT_TYPEAHEAD_TIMEOUT_MS: u64 = 800;

/// Time between hiding an overlay and dropping its content.
pub const DEFAULT_OVERLAY_GRACE_MS: u64 = 300;

/// Pointer travel on either axis before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 4.0;

/// Smallest width a column may be resized to.
pub const DEFAULT_MIN_COLUMN_PX: f64 = 20.0;

/// Maximum tabs per pane.
pub const DEFAULT_MAX_TABS: usize = 32;

/// Tunables shared by the controllers of one workbench session.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SessionConfig {
    /// Type-ahead idle reset, in milliseconds.
    #[builder(default = "DEFAULT_TYPEAHEAD_TIMEOUT_MS")]
    #[serde(default = "default_typeahead_timeout_ms")]
    pub typeahead_timeout_ms: u64,

    /// Overlay content grace period, in milliseconds.
    #[builder(default = "DEFAULT_OVERLAY_GRACE_MS")]
    #[serde(default = "default_overlay_grace_ms")]
    pub overlay_grace_ms: u64,

    /// Drag threshold in pixels.
    #[builder(default = "DEFAULT_DRAG_THRESHOLD_PX")]
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,

    /// Minimum column width in pixels during a resize.
    #[builder(default = "DEFAULT_MIN_COLUMN_PX")]
    #[serde(default = "default_min_column_px")]
    pub min_column_px: f64,

    /// Maximum number of tabs per pane.
    #[builder(default = "DEFAULT_MAX_TABS")]
    #[serde(default = "default_max_tabs")]
    pub max_tabs: usize,
}

fn default_typeahead_timeout_ms() -> u64 {
    DEFAULT_TYPEAHEAD_TIMEOUT_MS
}

fn default_overlay_grace_ms() -> u64 {
    DEFAULT_OVERLAY_GRACE_MS
}

fn default_drag_threshold_px() -> f64 {
    DEFAULT_DRAG_THRESHOLD_PX
}

fn default_min_column_px() -> f64 {
    DEFAULT_MIN_COLUMN_PX
}

fn default_max_tabs() -> usize {
    DEFAULT_MAX_TABS
}

impl SessionConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(threshold) = self.drag_threshold_px {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err("Drag threshold must be a non-negative number".to_string());
            }
        }
        if let Some(min) = self.min_column_px {
            if !min.is_finite() || min < 0.0 {
                return Err("Minimum column width must be a non-negative number".to_string());
            }
        }
        if self.max_tabs == Some(0) {
            return Err("At least one tab per pane is required".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typeahead_timeout_ms: DEFAULT_TYPEAHEAD_TIMEOUT_MS,
            overlay_grace_ms: DEFAULT_OVERLAY_GRACE_MS,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            min_column_px: DEFAULT_MIN_COLUMN_PX,
            max_tabs: DEFAULT_MAX_TABS,
        }
    }
}

impl SessionConfig {
    /// Create a builder for session configuration.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Type-ahead idle reset as a duration.
    pub fn typeahead_timeout(&self) -> Duration {
        Duration::from_millis(self.typeahead_timeout_ms)
    }

    /// Overlay grace period as a duration.
    pub fn overlay_grace(&self) -> Duration {
        Duration::from_millis(self.overlay_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SessionConfig::builder().build().unwrap();
        assert_eq!(config.typeahead_timeout(), Duration::from_millis(800));
        assert_eq!(config.overlay_grace(), Duration::from_millis(300));
        assert_eq!(config.drag_threshold_px, 4.0);
    }

    #[test]
    fn test_builder_validation() {
        assert!(SessionConfig::builder().max_tabs(0usize).build().is_err());
        assert!(SessionConfig::builder().drag_threshold_px(-1.0).build().is_err());
        assert!(SessionConfig::builder().max_tabs(3usize).build().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SessionConfig = serde_json::from_str(r#"{"max_tabs": 4}"#).unwrap();
        assert_eq!(config.max_tabs, 4);
        assert_eq!(config.typeahead_timeout_ms, DEFAULT_TYPEAHEAD_TIMEOUT_MS);
    }
}
