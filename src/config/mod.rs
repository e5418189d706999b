// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use roadlens::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.interval_secs = 10;
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_dir = PathBuf::from("./temp_config_dir");
//! std::fs::create_dir_all(&temp_dir).unwrap();
//! let temp_file = temp_dir.join("test_settings.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded_config = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert_eq!(loaded_config.interval_secs, 10);
//! std::fs::remove_dir_all(&temp_dir).unwrap();
//! ```

pub mod defaults;

use crate::app::paths;
use crate::domain::capture::IntervalSeconds;
use crate::domain::metadata::GpsCoordinates;
use crate::error::{Error, Result};
use defaults::{
    DEFAULT_APP_TAG, DEFAULT_INTERVAL_SECS, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_SUBDIR,
    MAX_INTERVAL_SECS, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

/// Directory under the data dir used when no pictures directory exists.
const FALLBACK_OUTPUT_DIR: &str = "captures";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of capture file names.
    pub app_tag: String,
    /// Seconds between two captures.
    pub interval_secs: u32,
    /// Where captures are written. Defaults to a folder in the pictures directory.
    pub output_dir: Option<PathBuf>,
    pub jpeg_quality: u8,
    /// Fixed position used when no positioning device is available.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_tag: DEFAULT_APP_TAG.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            output_dir: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            latitude: None,
            longitude: None,
        }
    }
}

impl Config {
    /// Capture interval, clamped to the supported range.
    #[must_use]
    pub fn interval(&self) -> IntervalSeconds {
        IntervalSeconds::new(self.interval_secs.min(MAX_INTERVAL_SECS))
    }

    /// JPEG quality, clamped to the supported range.
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.jpeg_quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
    }

    /// File name prefix; falls back to the default when blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the tag contains a path separator.
    pub fn tag(&self) -> Result<&str> {
        let tag = self.app_tag.trim();
        if tag.is_empty() {
            return Ok(DEFAULT_APP_TAG);
        }
        if tag.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "capture tag {tag:?} must not contain path separators"
            )));
        }
        Ok(tag)
    }

    /// Configured fixed position, if both coordinates are set.
    #[must_use]
    pub fn position(&self) -> Option<GpsCoordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(GpsCoordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    /// Output directory: the configured one, else `<pictures>/RoadLens`, else
    /// `<data dir>/captures`.
    #[must_use]
    pub fn resolved_output_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Some(dir.clone());
        }
        dirs::picture_dir()
            .map(|dir| dir.join(DEFAULT_OUTPUT_SUBDIR))
            .or_else(|| paths::get_app_data_dir().map(|dir| dir.join(FALLBACK_OUTPUT_DIR)))
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Reads a config file. Invalid TOML yields the defaults, a missing or
/// unreadable file is an error.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
        Config::default()
    }))
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
