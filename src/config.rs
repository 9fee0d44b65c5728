//! Configuration persistence for watchqc settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{HexColor, MAX_GUIDE_SIDE, OverlayConfig, OverlayKind, Size};
use crate::export::{
    DEFAULT_BACKGROUND, DEFAULT_QUALITY_SCALE, DEFAULT_WATERMARK, ExportFormat, ExportOptions,
};
use crate::gesture::{GestureConfig, PINCH_SENSITIVITY, WHEEL_STEP};
use crate::session::SessionSettings;

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reference guide drawn over the photo
    pub overlay_kind: OverlayKind,
    /// Stroke color of the guide
    pub overlay_color: HexColor,
    /// Scale change per wheel tick or zoom button press
    pub wheel_step: f32,
    /// Scale change per pixel of pinch distance change
    pub pinch_sensitivity: f32,
    /// Output pixels per logical pixel on export
    pub export_quality: f32,
    pub export_background: HexColor,
    pub watermark: String,
    pub export_format: ExportFormat,
    /// Size of the interaction surface
    pub viewport: Size,
    /// Fixed guide side (None = derived from the viewport)
    pub guide_size: Option<f32>,
    /// Where exports are written (None = the system download folder)
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            overlay_kind: OverlayKind::Indices,
            overlay_color: HexColor::default(),
            wheel_step: WHEEL_STEP,
            pinch_sensitivity: PINCH_SENSITIVITY,
            export_quality: DEFAULT_QUALITY_SCALE,
            export_background: DEFAULT_BACKGROUND,
            watermark: DEFAULT_WATERMARK.to_string(),
            export_format: ExportFormat::Png,
            viewport: Size::default(),
            guide_size: None,
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Directory name under the user's config dir
    pub const ID: &'static str = "watchqc";

    /// `<config_dir>/watchqc/config.json`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not locate config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&text) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => log::error!("Could not locate config directory for saving"),
        }
    }

    pub fn save_to(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize config: {}", err);
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                log::error!("Could not create config directory {}: {}", parent.display(), err);
                return;
            }
        }
        if let Err(err) = std::fs::write(path, json) {
            log::error!("Failed to save config: {}", err);
        }
    }

    /// Replace values that would break the canvas with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.wheel_step.is_finite() && self.wheel_step > 0.0) {
            log::warn!("Invalid wheel_step {}, using default", self.wheel_step);
            self.wheel_step = defaults.wheel_step;
        }
        if !(self.pinch_sensitivity.is_finite() && self.pinch_sensitivity > 0.0) {
            log::warn!("Invalid pinch_sensitivity {}, using default", self.pinch_sensitivity);
            self.pinch_sensitivity = defaults.pinch_sensitivity;
        }
        if !(self.export_quality.is_finite() && self.export_quality > 0.0) {
            log::warn!("Invalid export_quality {}, using default", self.export_quality);
            self.export_quality = defaults.export_quality;
        }
        if !self.viewport.is_drawable() {
            log::warn!("Invalid viewport {:?}, using default", self.viewport);
            self.viewport = defaults.viewport;
        }
        if self.guide_size.is_some_and(|side| !(side.is_finite() && side > 0.0)) {
            self.guide_size = None;
        }
        self.guide_size = self.guide_size.map(|side| side.min(MAX_GUIDE_SIDE));
        self
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            wheel_step: self.wheel_step,
            pinch_sensitivity: self.pinch_sensitivity,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            background: self.export_background,
            quality_scale: self.export_quality,
            watermark: self.watermark.clone(),
            format: self.export_format,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            gesture: self.gesture_config(),
            overlay: OverlayConfig::new(self.overlay_kind, self.overlay_color),
            viewport: self.viewport,
            guide_side: self.guide_size,
            export: self.export_options(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            overlay_kind: OverlayKind::Grid,
            overlay_color: HexColor::rgb(0, 200, 0),
            export_format: ExportFormat::Jpeg,
            guide_size: Some(320.0),
            ..AppConfig::default()
        };
        config.save_to(&path);
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"overlay_kind": "grid", "wheel_step": 0.25}"#).unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.overlay_kind, OverlayKind::Grid);
        assert_eq!(config.wheel_step, 0.25);
        assert_eq!(config.watermark, DEFAULT_WATERMARK);
        assert_eq!(config.gesture_config().pinch_sensitivity, PINCH_SENSITIVITY);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"overlay_kind": "spiral"}"#).unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::write(&path, r#"{"wheel_step": -1.0, "guide_size": 0.0}"#).unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.wheel_step, WHEEL_STEP);
        assert_eq!(config.guide_size, None);

        std::fs::write(&path, r#"{"guide_size": 1e30}"#).unwrap();
        assert_eq!(AppConfig::load_from(&path).guide_size, Some(MAX_GUIDE_SIDE));
    }

    #[test]
    fn test_session_settings() {
        let config = AppConfig {
            overlay_color: HexColor::rgb(1, 2, 3),
            ..AppConfig::default()
        };
        let settings = config.session_settings();
        assert_eq!(settings.overlay.color, HexColor::rgb(1, 2, 3));
        assert!(settings.overlay.has_identity_geometry());
        assert_eq!(settings.export.quality_scale, DEFAULT_QUALITY_SCALE);
    }
}
