//! Configuration loading and validation

use adintel_content::{ChatConfig, VisionConfig};
use adintel_core::PlacementConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: SettingsFileConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFileConfig {
    /// Path to the user settings file
    #[serde(default = "default_settings_path")]
    pub path: String,
}

impl Default for SettingsFileConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

fn default_settings_path() -> String {
    "./adintel-settings.toml".to_string()
}

/// Which content backends to compose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    /// Fixed sample labels and canned ad copy
    #[default]
    Placeholder,
    /// Hosted vision and chat-completion services
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub backend: ContentBackend,
    /// Artificial latency of the placeholder backends in milliseconds
    #[serde(default = "default_placeholder_delay")]
    pub placeholder_delay_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::default(),
            placeholder_delay_ms: default_placeholder_delay(),
        }
    }
}

fn default_placeholder_delay() -> u64 {
    1000
}

/// A wall in the synthetic room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    pub position: [f32; 3],
    /// Rotation about the vertical axis; 0 faces +Z
    #[serde(default)]
    pub yaw_degrees: f32,
    /// Seconds after start when tracking picks the wall up
    #[serde(default)]
    pub detected_at_secs: f64,
    /// Seconds after start when tracking loses the wall
    #[serde(default)]
    pub removed_at_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Also report a floor plane
    #[serde(default = "default_true")]
    pub floor: bool,
    /// Camera waypoints, walked at constant speed over the run
    #[serde(default = "default_camera_path")]
    pub camera_path: Vec<[f32; 3]>,
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    /// Playback speed relative to wall-clock time
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Attach a synthetic camera frame to every tick
    #[serde(default = "default_true")]
    pub frames: bool,
    #[serde(default = "default_walls")]
    pub walls: Vec<WallConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floor: true,
            camera_path: default_camera_path(),
            tick_hz: default_tick_hz(),
            duration_secs: default_duration(),
            speed: default_speed(),
            frames: true,
            walls: default_walls(),
        }
    }
}

fn default_walls() -> Vec<WallConfig> {
    vec![
        WallConfig {
            position: [0.0, 1.2, -1.0],
            yaw_degrees: 0.0,
            detected_at_secs: 0.5,
            removed_at_secs: None,
        },
        WallConfig {
            position: [-1.2, 1.2, 0.0],
            yaw_degrees: 90.0,
            detected_at_secs: 2.0,
            removed_at_secs: None,
        },
        WallConfig {
            position: [1.6, 1.2, -0.4],
            yaw_degrees: -90.0,
            detected_at_secs: 3.0,
            removed_at_secs: Some(9.0),
        },
    ]
}

fn default_camera_path() -> Vec<[f32; 3]> {
    vec![
        [0.0, 1.5, 0.0],
        [-0.4, 1.5, -0.1],
        [0.6, 1.5, -0.3],
        [0.0, 1.5, 0.2],
    ]
}

fn default_tick_hz() -> f64 {
    10.0
}

fn default_duration() -> f64 {
    12.0
}

fn default_speed() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
