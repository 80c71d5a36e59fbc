//! Field configuration and on-disk settings.
//!
//! A [`FieldConfig`] is chosen from a coarse [`DeviceClass`] derived from the
//! viewport width. Narrow viewports get fewer, smaller particles and a
//! shorter connection radius.
//!
//! ```ignore
//! let config = driftnet::configure(1920.0, 1080.0);
//! assert_eq!(config.count, 60);
//! assert_eq!(config.connection_distance, 150.0);
//! ```
//!
//! [`Settings`] bundles every tunable into one serde struct that can be
//! loaded from JSON; missing sections fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cascade::CascadeConfig;
use crate::error::ConfigError;
use crate::style::NetworkStyle;

/// Viewport widths at or below this are [`DeviceClass::Compact`].
pub const COMPACT_BREAKPOINT: f32 = 768.0;

/// Coarse device categorization used to pick particle density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Phones and narrow windows.
    Compact,
    /// Everything wider than the breakpoint.
    Full,
}

impl DeviceClass {
    /// Classify a viewport width against [`COMPACT_BREAKPOINT`].
    pub fn from_width(width: f32) -> Self {
        Self::from_width_with_breakpoint(width, COMPACT_BREAKPOINT)
    }

    /// Classify a viewport width against a custom breakpoint (inclusive).
    pub fn from_width_with_breakpoint(width: f32, breakpoint: f32) -> Self {
        if width <= breakpoint {
            DeviceClass::Compact
        } else {
            DeviceClass::Full
        }
    }
}

/// Parameters for one particle set.
///
/// Treated as immutable for the lifetime of the particles seeded from it; a
/// new config only takes effect through a reseed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub class: DeviceClass,
    /// Number of particles to seed.
    pub count: usize,
    /// Pairs closer than this (in pixels) are joined by a connector line.
    pub connection_distance: f32,
    /// Drift speed in pixels per frame; velocity components lie in `[-speed/2, speed/2]`.
    pub speed: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl FieldConfig {
    /// Preset for [`DeviceClass::Compact`].
    pub const COMPACT: FieldConfig = FieldConfig {
        class: DeviceClass::Compact,
        count: 40,
        connection_distance: 120.0,
        speed: 0.5,
        min_size: 1.0,
        max_size: 2.0,
    };

    /// Preset for [`DeviceClass::Full`].
    pub const FULL: FieldConfig = FieldConfig {
        class: DeviceClass::Full,
        count: 60,
        connection_distance: 150.0,
        speed: 0.5,
        min_size: 1.0,
        max_size: 3.0,
    };

    /// Largest particle count accepted from settings.
    pub const MAX_COUNT: usize = 1000;

    /// Check that the values can seed and run a field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count > Self::MAX_COUNT {
            return Err(ConfigError::Invalid(format!(
                "count {} exceeds {}",
                self.count,
                Self::MAX_COUNT
            )));
        }
        check_non_negative("connection_distance", self.connection_distance)?;
        check_non_negative("speed", self.speed)?;
        check_non_negative("min_size", self.min_size)?;
        check_non_negative("max_size", self.max_size)?;
        Ok(())
    }
}

/// Reject NaN, infinite and negative values.
pub(crate) fn check_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be a finite, non-negative number, got {}",
            name, value
        )))
    }
}

/// Select the default configuration for a viewport.
///
/// Only the width takes part in the classification; the height is accepted
/// so callers can pass the viewport as they receive it.
pub fn configure(viewport_width: f32, _viewport_height: f32) -> FieldConfig {
    FieldProfile::default().configure(viewport_width)
}

/// Breakpoint plus one preset per device class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldProfile {
    pub breakpoint: f32,
    pub compact: FieldConfig,
    pub full: FieldConfig,
}

impl Default for FieldProfile {
    fn default() -> Self {
        Self {
            breakpoint: COMPACT_BREAKPOINT,
            compact: FieldConfig::COMPACT,
            full: FieldConfig::FULL,
        }
    }
}

impl FieldProfile {
    /// Device class for `width` under this profile's breakpoint.
    pub fn classify(&self, width: f32) -> DeviceClass {
        DeviceClass::from_width_with_breakpoint(width, self.breakpoint)
    }

    /// Pick the preset for `width`. The returned config's `class` always
    /// matches the classification, even if a loaded preset said otherwise.
    pub fn configure(&self, width: f32) -> FieldConfig {
        let class = self.classify(width);
        let preset = match class {
            DeviceClass::Compact => self.compact,
            DeviceClass::Full => self.full,
        };
        FieldConfig { class, ..preset }
    }

    /// Validate the breakpoint and both presets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("breakpoint", self.breakpoint)?;
        self.compact.validate()?;
        self.full.validate()
    }
}

fn default_frame_log_interval() -> u64 {
    60
}

/// Local diagnostics for the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit a periodic frame heartbeat at debug level.
    #[serde(default)]
    pub debug: bool,
    /// Frames between heartbeats.
    #[serde(default = "default_frame_log_interval")]
    pub frame_log_interval: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            debug: false,
            frame_log_interval: default_frame_log_interval(),
        }
    }
}

/// Everything tunable, as loaded from a JSON settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: FieldProfile,
    pub network: NetworkStyle,
    pub cascade: CascadeConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl Settings {
    /// Parse and validate settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every section for values the simulation cannot use.
    ///
    /// JSON numbers beyond `f32` range parse as infinity, so a file can be
    /// well-formed and still unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile.validate()?;
        check_non_negative("network.line_width", self.network.line_width)?;
        self.cascade.validate()
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_is_inclusive() {
        assert_eq!(DeviceClass::from_width(768.0), DeviceClass::Compact);
        assert_eq!(DeviceClass::from_width(768.5), DeviceClass::Full);
        assert_eq!(DeviceClass::from_width(0.0), DeviceClass::Compact);
    }

    #[test]
    fn test_configure_ignores_height() {
        assert_eq!(configure(1024.0, 10.0), configure(1024.0, 4000.0));
        assert_eq!(configure(500.0, 10.0), configure(500.0, 4000.0));
    }

    #[test]
    fn test_presets_share_speed_and_min_size() {
        for config in [FieldConfig::COMPACT, FieldConfig::FULL] {
            assert_eq!(config.speed, 0.5);
            assert_eq!(config.min_size, 1.0);
        }
    }

    #[test]
    fn test_profile_corrects_mislabelled_preset() {
        let profile = FieldProfile {
            compact: FieldConfig {
                class: DeviceClass::Full,
                ..FieldConfig::COMPACT
            },
            ..FieldProfile::default()
        };
        assert_eq!(profile.configure(320.0).class, DeviceClass::Compact);
    }

    #[test]
    fn test_custom_breakpoint() {
        let profile = FieldProfile {
            breakpoint: 1024.0,
            ..FieldProfile::default()
        };
        assert_eq!(profile.configure(900.0).count, 40);
        assert_eq!(profile.configure(1025.0).count, 60);
    }

    #[test]
    fn test_empty_settings_are_default() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.diagnostics.frame_log_interval, 60);
    }

    #[test]
    fn test_partial_settings_override() {
        let json = r#"{
            "profile": { "breakpoint": 600.0 },
            "diagnostics": { "debug": true }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.profile.breakpoint, 600.0);
        assert_eq!(settings.profile.full, FieldConfig::FULL);
        assert!(settings.diagnostics.debug);
        assert_eq!(settings.diagnostics.frame_log_interval, 60);
    }

    #[test]
    fn test_infinite_speed_is_rejected() {
        let json = r#"{
            "profile": {
                "full": {
                    "class": "full",
                    "count": 60,
                    "connection_distance": 150.0,
                    "speed": 1e39,
                    "min_size": 1.0,
                    "max_size": 3.0
                }
            }
        }"#;
        let err = Settings::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn test_oversized_count_is_rejected() {
        let profile = FieldProfile {
            compact: FieldConfig {
                count: FieldConfig::MAX_COUNT + 1,
                ..FieldConfig::COMPACT
            },
            ..FieldProfile::default()
        };
        assert!(matches!(profile.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let config = FieldConfig {
            connection_distance: -1.0,
            ..FieldConfig::FULL
        };
        assert!(config.validate().is_err());
        assert!(FieldConfig::FULL.validate().is_ok());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_cascade_range_is_rejected() {
        let json = r#"{ "cascade": { "max_speed": 1e39 } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "profile": { "breakpoint": -5.0 } }"#).unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_settings() {
        let err = Settings::from_json(r#"{ "profile": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
