//! Engine configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) is a
//! valid configuration. Hosts override individual values.

use records::LatLng;
use serde::{Deserialize, Serialize};
use sources::{DEFAULT_LOCATION, DEFAULT_RADIUS_METERS};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Largest radius the Places nearby search accepts.
pub const MAX_RADIUS_METERS: u32 = 50_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub gesture: GestureConfig,
    pub deck: DeckConfig,
    pub stats: StatsConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Used whenever the device location is unavailable.
    pub default_location: LatLng,
    pub radius_meters: u32,
    pub max_radius_meters: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION,
            radius_meters: DEFAULT_RADIUS_METERS,
            max_radius_meters: MAX_RADIUS_METERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Fraction of the screen width a drag must cover to commit.
    pub commit_threshold: f32,
    pub screen_width: f32,
    /// Rotation (degrees) reached at half a screen width of drag.
    pub max_rotation_degrees: f32,
}

impl GestureConfig {
    pub fn threshold_px(&self) -> f32 {
        self.commit_threshold * self.screen_width
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            commit_threshold: 0.25,
            screen_width: 390.0,
            max_rotation_degrees: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Cards shown stacked behind the active one.
    pub preview_count: usize,
    pub include_seen: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            preview_count: 2,
            include_seen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Commits between two remote stats updates.
    pub flush_every: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { flush_every: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub fetch_secs: u64,
    pub load_secs: u64,
}

impl TimeoutConfig {
    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }

    pub fn load(&self) -> Duration {
        Duration::from_secs(self.load_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fetch_secs: 8,
            load_secs: 8,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let gesture = &self.gesture;
        if !(gesture.commit_threshold > 0.0 && gesture.commit_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "gesture.commit_threshold must be in (0, 1], got {}",
                gesture.commit_threshold
            )));
        }
        if !(gesture.screen_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gesture.screen_width must be positive, got {}",
                gesture.screen_width
            )));
        }
        if !(gesture.max_rotation_degrees >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gesture.max_rotation_degrees must not be negative, got {}",
                gesture.max_rotation_degrees
            )));
        }
        if self.stats.flush_every == 0 {
            return Err(ConfigError::Invalid("stats.flush_every must be at least 1".to_string()));
        }
        if self.search.radius_meters == 0 || self.search.radius_meters > self.search.max_radius_meters {
            return Err(ConfigError::Invalid(format!(
                "search.radius_meters must be in 1..={}, got {}",
                self.search.max_radius_meters, self.search.radius_meters
            )));
        }
        Ok(())
    }
}
