//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the moon-config.toml file.
//! It provides the simulator's starting state, playback settings and output sizes.
//! Simulation state itself is never written back; every run starts from this file.

use crate::clock::{SimulationClock, Speed, DEFAULT_HOUR, DEFAULT_LUNAR_AGE};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "moon-config.toml";

/// Errors that can occur while reading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File missing or unreadable
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    /// TOML syntax error or a value out of its allowed set
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration loaded from moon-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Starting state and playback settings
    pub simulation: SimulationConfig,
    /// Output sizes for the terminal and framebuffer views
    pub display: DisplayConfig,
}

/// Initial clock state and playback pacing
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lunar age in days; any value is accepted and wrapped into one cycle
    pub lunar_age: f64,
    /// Hour of day; any value is accepted and wrapped into 0-24
    pub hour: f64,
    /// Playback speed, one of 1, 2, 4 or 8
    pub speed: Speed,
    /// Time between animation frames in milliseconds
    pub frame_interval_ms: u64,
}

/// Output sizes
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Framebuffer width in pixels (orbital view left half, sky view right half)
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
    /// Width of the ASCII sky view in characters
    pub ascii_columns: usize,
    /// Height of the ASCII sky view in rows, ground line included
    pub ascii_rows: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            lunar_age: DEFAULT_LUNAR_AGE,
            hour: DEFAULT_HOUR,
            speed: Speed::default(),
            frame_interval_ms: 16, // ~60 fps
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 600,
            height: 300,
            ascii_columns: 49,
            ascii_rows: 12,
        }
    }
}

impl SimulationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// A paused clock at the configured starting point.
    pub fn build_clock(&self) -> SimulationClock {
        SimulationClock::with_state(self.lunar_age, self.hour, self.speed)
    }
}

impl Config {
    /// Load configuration from moon-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Invalid config file {}: {}", path.display(), e);
                warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration, reporting any failure to the caller
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<Config>(contents)?)
    }
}
