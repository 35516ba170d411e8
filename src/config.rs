//! Editor tunables.
//!
//! Read from the platform-appropriate config directory when present:
//!   macOS:   ~/Library/Application Support/snapcrop/config.json
//!   Linux:   ~/.config/snapcrop/config.json
//!   Windows: %APPDATA%/snapcrop/config.json
//!
//! Every field is optional; missing fields take their defaults.

use crate::editor::{MIN_SCALE, NUDGE_STEP, WHEEL_DIVISOR};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name every export is delivered under. Not configurable.
pub const EXPORT_FILE_NAME: &str = "download.png";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Wheel delta that moves the zoom by one percentage point.
    pub wheel_divisor: f32,
    /// Pan distance of one directional button press, in layout pixels.
    pub nudge_step: f32,
    /// Zoom floor, in percent. Keeps the drawn frame from collapsing or
    /// mirroring.
    pub min_scale: f32,
    /// Upper end of the scale slider, in percent. Wheel zoom may exceed it.
    pub max_slider_scale: f32,
    /// Multiply the pan offset by the layout-to-natural factors at export.
    pub rescale_pan_offset: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            wheel_divisor: WHEEL_DIVISOR,
            nudge_step: NUDGE_STEP,
            min_scale: MIN_SCALE,
            max_slider_scale: 200.0,
            rescale_pan_offset: false,
        }
    }
}

impl EditorConfig {
    /// Loads the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    /// Loads the user's config file, or the defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load_from(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.wheel_divisor.is_finite() && self.wheel_divisor > 0.0) {
            return Err(ConfigError::Invalid("wheelDivisor must be positive"));
        }
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return Err(ConfigError::Invalid("minScale must be positive"));
        }
        if self.max_slider_scale.is_nan() || self.max_slider_scale < self.min_scale {
            return Err(ConfigError::Invalid("maxSliderScale must not be below minScale"));
        }
        Ok(self)
    }
}

/// Location of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapcrop")
        .join("config.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "rescalePanOffset": true }"#).unwrap();
        assert!(config.rescale_pan_offset);
        assert_eq!(config.wheel_divisor, 25.0);
        assert_eq!(config.nudge_step, 10.0);
        assert_eq!(config.min_scale, MIN_SCALE);
    }

    #[test]
    fn defaults_match_transform_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.wheel_divisor, WHEEL_DIVISOR);
        assert_eq!(config.nudge_step, NUDGE_STEP);
        assert_eq!(config.min_scale, MIN_SCALE);
    }

    #[test]
    fn export_file_name_key_is_ignored() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "exportFileName": "shot.png", "nudgeStep": 5 }"#).unwrap();
        assert_eq!(config.nudge_step, 5.0);
        assert_eq!(config, EditorConfig { nudge_step: 5.0, ..EditorConfig::default() });
    }

    #[test]
    fn non_positive_min_scale_rejected() {
        let config = EditorConfig {
            min_scale: 0.0,
            ..EditorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("snapcrop-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = EditorConfig::load_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn config_path_is_under_snapcrop() {
        let path = config_path();
        let s = path.to_string_lossy();
        assert!(s.contains("snapcrop"), "Path should contain 'snapcrop': {}", s);
        assert!(s.ends_with("config.json"));
    }
}
