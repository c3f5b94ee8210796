//! User preferences stored as a flat key/value TOML file
//!
//! Settings are an explicit value: load them once at the boundary, pass
//! `&Settings` to whatever needs them, and save them back when changed.
//! Missing keys fall back to per-key defaults; there is no schema version.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// UI theme choices, persisted as an index into [`Theme::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    SystemDefault,
    Dark,
    Light,
    VisionPro,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::SystemDefault, Theme::Dark, Theme::Light, Theme::VisionPro];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(&self) -> i64 {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0) as i64
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::SystemDefault => "System Default",
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::VisionPro => "Vision Pro",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Key for the hosted image-analysis service
    #[serde(default)]
    pub vision_api_key: String,
    /// Periodically refresh ads while tracking
    #[serde(default = "default_true")]
    pub auto_refresh_enabled: bool,
    /// Seconds between ad refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f64,
    /// Maximum number of ads on screen
    #[serde(default = "default_max_ads")]
    pub max_ads_count: i64,
    #[serde(default)]
    pub show_debug_info: bool,
    /// Index into [`Theme::ALL`]
    #[serde(default)]
    pub preferred_theme: i64,
    /// Key for the hosted chat-completion service
    #[serde(default)]
    pub openai_api_key: String,
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval() -> f64 {
    4.0
}

fn default_max_ads() -> i64 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vision_api_key: String::new(),
            auto_refresh_enabled: true,
            refresh_interval_secs: default_refresh_interval(),
            max_ads_count: default_max_ads(),
            show_debug_info: false,
            preferred_theme: 0,
            openai_api_key: String::new(),
        }
    }
}

impl Settings {
    /// Range offered by the refresh interval slider
    pub const REFRESH_INTERVAL_RANGE: RangeInclusive<f64> = 2.0..=10.0;
    /// Range offered by the max ads stepper
    pub const MAX_ADS_RANGE: RangeInclusive<i64> = 1..=5;

    pub const KEYS: [&'static str; 7] = [
        "vision_api_key",
        "auto_refresh_enabled",
        "refresh_interval_secs",
        "max_ads_count",
        "show_debug_info",
        "preferred_theme",
        "openai_api_key",
    ];

    /// Refresh interval clamped to the UI range
    pub fn refresh_interval(&self) -> std::time::Duration {
        let (lo, hi) = (
            *Self::REFRESH_INTERVAL_RANGE.start(),
            *Self::REFRESH_INTERVAL_RANGE.end(),
        );
        let secs = if self.refresh_interval_secs.is_finite() {
            self.refresh_interval_secs.clamp(lo, hi)
        } else {
            default_refresh_interval()
        };
        std::time::Duration::from_secs_f64(secs)
    }

    /// Max ads clamped to the UI range
    pub fn max_ads(&self) -> usize {
        self.max_ads_count
            .clamp(*Self::MAX_ADS_RANGE.start(), *Self::MAX_ADS_RANGE.end()) as usize
    }

    /// Selected theme, falling back to the system default for unknown indices
    pub fn theme(&self) -> Theme {
        Theme::from_index(self.preferred_theme).unwrap_or_default()
    }

    /// Read one setting as text
    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        let value = match key {
            "vision_api_key" => self.vision_api_key.clone(),
            "auto_refresh_enabled" => self.auto_refresh_enabled.to_string(),
            "refresh_interval_secs" => self.refresh_interval_secs.to_string(),
            "max_ads_count" => self.max_ads_count.to_string(),
            "show_debug_info" => self.show_debug_info.to_string(),
            "preferred_theme" => self.preferred_theme.to_string(),
            "openai_api_key" => self.openai_api_key.clone(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Update one setting from text
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "vision_api_key" => self.vision_api_key = value.trim().to_string(),
            "auto_refresh_enabled" => self.auto_refresh_enabled = value.parse().map_err(|_| invalid())?,
            "refresh_interval_secs" => {
                let secs: f64 = value.parse().map_err(|_| invalid())?;
                if !secs.is_finite() {
                    return Err(invalid());
                }
                self.refresh_interval_secs = secs;
            }
            "max_ads_count" => self.max_ads_count = value.parse().map_err(|_| invalid())?,
            "show_debug_info" => self.show_debug_info = value.parse().map_err(|_| invalid())?,
            "preferred_theme" => {
                let index: i64 = value.parse().map_err(|_| invalid())?;
                if Theme::from_index(index).is_none() {
                    return Err(invalid());
                }
                self.preferred_theme = index;
            }
            "openai_api_key" => self.openai_api_key = value.trim().to_string(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// File-backed settings storage
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, using defaults when the file does not exist
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Settings file not found, using defaults");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let settings: Settings = toml::from_str(&content)?;
        debug!(path = %self.path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(settings)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    /// Overwrite stored settings with defaults
    pub fn reset(&self) -> Result<Settings, SettingsError> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("settings.toml"));
        let settings = store.load().unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.openai_api_key, "");
        assert_eq!(settings.max_ads(), 2);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "show_debug_info = true\n").unwrap();

        let settings = SettingsStore::new(&path).load().unwrap();
        assert!(settings.show_debug_info);
        assert!(settings.auto_refresh_enabled);
        assert_eq!(settings.refresh_interval_secs, 4.0);
        assert_eq!(settings.vision_api_key, "");
    }

    #[test]
    fn test_round_trip_every_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("nested/settings.toml"));

        let settings = Settings {
            vision_api_key: "vision-key".to_string(),
            auto_refresh_enabled: false,
            refresh_interval_secs: 7.5,
            max_ads_count: 5,
            show_debug_info: true,
            preferred_theme: 3,
            openai_api_key: String::new(),
        };
        store.save(&settings).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, settings);
        assert_eq!(loaded.openai_api_key, "");
        assert_eq!(loaded.theme(), Theme::VisionPro);
    }

    #[test]
    fn test_reset() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("settings.toml"));
        let mut settings = Settings::default();
        settings.set("max_ads_count", "4").unwrap();
        store.save(&settings).unwrap();

        assert_eq!(store.reset().unwrap(), Settings::default());
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = Settings::default();
        for key in Settings::KEYS {
            assert!(settings.get(key).is_ok());
        }

        settings.set("refresh_interval_secs", "6").unwrap();
        assert_eq!(settings.get("refresh_interval_secs").unwrap(), "6");
        settings.set("openai_api_key", "  sk-test ").unwrap();
        assert_eq!(settings.openai_api_key, "sk-test");

        assert!(matches!(
            settings.set("auto_refresh_enabled", "maybe"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("preferred_theme", "9"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(settings.get("nope"), Err(SettingsError::UnknownKey(_))));
    }

    #[test]
    fn test_clamped_values() {
        let settings = Settings {
            refresh_interval_secs: 30.0,
            max_ads_count: 0,
            preferred_theme: 42,
            ..Settings::default()
        };
        assert_eq!(settings.refresh_interval(), std::time::Duration::from_secs(10));
        assert_eq!(settings.max_ads(), 1);
        assert_eq!(settings.theme(), Theme::SystemDefault);
    }
}
