//! Utility module for TVPlayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Small numeric helpers

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, DisplayConfig, EngineConfig, GeneralConfig, PlayerConfig};
pub use error::{IntoPlayerError, PlayerError, Result};

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Format a millisecond position for display
///
/// Formatted string in the format "HH:MM:SS" or "MM:SS" for positions under an hour
pub fn format_position(ms: u32) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Convert a native buffering percentage into a fraction in [0, 1]
pub fn percent_to_fraction(percent: i32) -> f64 {
    (percent as f64 / 100.0).clamp(0.0, 1.0)
}
