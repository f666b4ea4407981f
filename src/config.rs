//! Configuration file support for pointmark.
//!
//! Settings live in a JSON file in the platform config directory. The
//! command line stays minimal, so zoom steps, debounce windows and marker
//! style are tuned here instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Filter string understood by `env_logger`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Where the zoomed pixel ends up after a zoom event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAnchor {
    /// The pixel stays under the cursor
    #[default]
    Cursor,
    /// The pixel is moved to the middle of the window
    ScreenCenter,
}

/// Pan/zoom behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Zoom added or removed per wheel notch
    pub zoom_step: f64,
    /// Lowest allowed zoom level
    pub min_zoom: f64,
    /// Highest allowed zoom level
    pub max_zoom: f64,
    /// Zoom events closer than this to the previous processed one are ignored
    pub zoom_debounce_ms: u64,
    #[serde(default)]
    pub zoom_anchor: ZoomAnchor,
}

impl NavigatorConfig {
    /// Small steps with a long cooldown.
    pub fn fine() -> Self {
        Self {
            zoom_step: 0.3,
            min_zoom: 0.2,
            max_zoom: 3.0,
            zoom_debounce_ms: 400,
            zoom_anchor: ZoomAnchor::Cursor,
        }
    }

    /// Large steps with a short cooldown.
    pub fn coarse() -> Self {
        Self {
            zoom_step: 0.5,
            min_zoom: 0.5,
            max_zoom: 5.0,
            zoom_debounce_ms: 100,
            zoom_anchor: ZoomAnchor::Cursor,
        }
    }

    pub fn with_anchor(mut self, anchor: ZoomAnchor) -> Self {
        self.zoom_anchor = anchor;
        self
    }

    pub fn zoom_debounce(&self) -> Duration {
        Duration::from_millis(self.zoom_debounce_ms)
    }

    /// Reject settings that would break the zoom invariants.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(Error::configuration(format!(
                "zoom_step must be positive, got {}",
                self.zoom_step
            )));
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(Error::configuration(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom) {
            return Err(Error::configuration(format!(
                "max_zoom ({}) must not be below min_zoom ({})",
                self.max_zoom, self.min_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&1.0) {
            return Err(Error::configuration(format!(
                "zoom bounds [{}, {}] must include 1.0",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::coarse()
    }
}

/// Appearance of the cross and label drawn on annotated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Arm length of the cross in image pixels
    pub half_size: u32,
    /// RGB color of cross and label
    pub color: [u8; 3],
    /// Integer scale of the 8x8 bitmap font
    pub label_scale: u32,
    /// Offset of the label's top-left corner from the point
    pub label_offset: (i32, i32),
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            half_size: 5,
            color: [255, 0, 0],
            label_scale: 2,
            label_offset: (7, -20),
        }
    }
}

/// Point-label entry behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Replace a numeric label with its successor after each mark
    pub auto_increment: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            auto_increment: true,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub navigator: NavigatorConfig,

    #[serde(default)]
    pub marker: MarkerConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl AnnotatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            navigator: NavigatorConfig::default(),
            marker: MarkerConfig::default(),
            labels: LabelConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(Error::configuration(format!(
                "configuration file version {} is newer than supported version {}",
                config.version, CONFIG_VERSION
            )));
        }
        config.navigator.validate()?;

        Ok(config)
    }

    /// Get the default config file name.
    pub fn default_filename() -> &'static str {
        "pointmark-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("pointmark").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("pointmark")
                    .join(Self::default_filename())
            })
        }
    }

    /// Read and validate a config file. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map(Some)
    }

    /// Load configuration from the default path, falling back to defaults.
    ///
    /// A missing file is normal; an unreadable or invalid one is reported
    /// and ignored.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(Some(config)) => {
                log::info!("Loaded configuration from {:?}", path);
                config
            }
            Ok(None) => {
                log::debug!("No config file found at {:?}", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_coarse_with_cursor_anchor() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.navigator, NavigatorConfig::coarse());
        assert_eq!(config.navigator.zoom_anchor, ZoomAnchor::Cursor);
        assert_eq!(config.navigator.zoom_debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(NavigatorConfig::fine().validate().is_ok());
        assert!(NavigatorConfig::coarse().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = NavigatorConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            ..NavigatorConfig::coarse()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = NavigatorConfig {
            zoom_step: 0.0,
            ..NavigatorConfig::fine()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_json_round_trip_keeps_settings() {
        let mut config = AnnotatorConfig::new();
        config.navigator = NavigatorConfig::fine().with_anchor(ZoomAnchor::ScreenCenter);
        config.log_level = LogLevel::Debug;

        let json = config.to_json().unwrap();
        assert!(json.contains("\"screen_center\""));
        let parsed = AnnotatorConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed = AnnotatorConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(parsed, AnnotatorConfig::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            AnnotatorConfig::from_json(&json),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AnnotatorConfig::load(&dir.path().join("pointmark-config.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_reports_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pointmark-config.json");
        std::fs::write(&path, r#"{ "version": 1, "navigator": { "zoom_step": -3.0, "min_zoom": 0.5, "max_zoom": 5.0, "zoom_debounce_ms": 100 } }"#)
            .unwrap();

        let err = AnnotatorConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("zoom_step"));
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pointmark-config.json");
        let mut config = AnnotatorConfig::new();
        config.log_level = LogLevel::Warn;
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        assert_eq!(AnnotatorConfig::load(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().as_filter_str(), "info");
    }
}
