//! Configuration management for TVPlayer
//!
//! This module handles loading and managing configuration from config
//! files and environment variables.

use crate::player::AspectMode;
use crate::utils::error::{IntoPlayerError, PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player behaviour
    pub player: PlayerConfig,

    /// Display output
    pub display: DisplayConfig,

    /// Simulated engine timings
    pub engine: EngineConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Player behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start playback when the view's renderer attaches
    pub auto_play: bool,

    /// Stop playback when the view's renderer detaches
    pub auto_stop: bool,

    /// Initial aspect mode
    pub aspect_mode: AspectMode,

    /// Whether the UI draws its own embedded transport controls
    pub uses_embedding_controls: bool,

    /// Initial volume (0.0 - 1.0)
    pub volume: f32,

    /// Start muted
    pub muted: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Logical to pixel scaling used for overlay regions
    pub scaling_factor: f64,

    /// Native handle of the application root window, used as overlay sink
    pub main_window: u64,
}

/// Timings of the simulated engine used by the demo binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reported stream duration
    pub duration_ms: u32,

    /// Time spent in Preparing
    pub prepare_delay_ms: u64,

    /// Time a seek takes to complete
    pub seek_delay_ms: u64,

    /// Make every prepare fail
    pub fail_prepare: bool,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_play: false,
            auto_stop: false,
            aspect_mode: AspectMode::Fit,
            uses_embedding_controls: true,
            volume: 1.0,
            muted: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scaling_factor: 1.0,
            main_window: 1,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            duration_ms: 60_000,
            prepare_delay_ms: 250,
            seek_delay_ms: 20,
            fail_prepare: false,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/tvplayer/config.toml on Linux)
    /// 3. User config file (~/.config/tvplayer/config.toml on Linux)
    /// 4. Environment variables (TVPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config = Self::read_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::read_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlayerError::NotFound(path.display().to_string()));
        }

        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| PlayerError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(volume) = std::env::var("TVPLAYER_VOLUME") {
            self.player.volume = volume
                .parse()
                .map_err(|_| PlayerError::Config("Invalid TVPLAYER_VOLUME".to_string()))?;
        }

        if let Ok(auto_play) = std::env::var("TVPLAYER_AUTO_PLAY") {
            self.player.auto_play = auto_play
                .parse()
                .map_err(|_| PlayerError::Config("Invalid TVPLAYER_AUTO_PLAY".to_string()))?;
        }

        if let Ok(scale) = std::env::var("TVPLAYER_SCALING_FACTOR") {
            self.display.scaling_factor = scale
                .parse()
                .map_err(|_| PlayerError::Config("Invalid TVPLAYER_SCALING_FACTOR".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("TVPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(PlayerError::Config(
                "Volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(self.display.scaling_factor > 0.0) {
            return Err(PlayerError::Config(
                "Scaling factor must be positive".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/tvplayer/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tvplayer").join("config.toml"))
    }
}
