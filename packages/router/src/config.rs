//! Router configuration.
//!
//! Defaults are embedded from `config/default.toml` at compile time. A
//! deployment can override any subset of values with its own TOML file,
//! named by the `SAFER_ROUTE_CONFIG` environment variable; missing keys
//! keep their defaults.

use std::path::Path;

use safer_route_directions::DirectionsConfig;
use safer_route_geometry::{GeometryError, ProjectionConfig, UtmProjection};
use safer_route_hotspots::{RankingConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::avoidance::AvoidanceConfig;

/// Default configuration embedded at compile time.
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Environment variable naming an override TOML file.
pub const CONFIG_PATH_ENV: &str = "SAFER_ROUTE_CONFIG";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`RouterConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The projection settings are unusable.
    #[error(transparent)]
    Projection(#[from] GeometryError),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Which value and why.
        message: String,
    },
}

/// Hotspot limits and de-duplication distance for the two passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Hotspots avoided in the first pass.
    pub phase1_limit: usize,
    /// Additional hotspots avoided in the second pass.
    pub phase2_limit: usize,
    /// Second-pass candidates this close (degrees) to a first-pass hotspot
    /// are skipped.
    pub min_exclusion_distance_degrees: f64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            phase1_limit: 7,
            phase2_limit: 7,
            min_exclusion_distance_degrees: 0.005,
        }
    }
}

/// Complete router configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Hotspot scoring.
    pub ranking: RankingConfig,
    /// Store search radius and timeout.
    pub search: SearchConfig,
    /// Per-phase limits.
    pub phases: PhaseConfig,
    /// Avoidance circle sizing.
    pub avoidance: AvoidanceConfig,
    /// Projection used for metric buffers.
    pub projection: ProjectionConfig,
    /// Directions provider connection.
    pub directions: DirectionsConfig,
}

impl RouterConfig {
    /// Parses the embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded file is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed input and
    /// [`ConfigError::Invalid`] or [`ConfigError::Projection`] for
    /// out-of-range values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded router configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `SAFER_ROUTE_CONFIG`, or the embedded
    /// defaults when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Self::embedded(),
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        UtmProjection::from_config(&self.projection)?;

        let a = &self.avoidance;
        if !positive(a.min_radius_meters) || a.min_radius_meters > a.max_radius_meters {
            return Err(invalid(format!(
                "avoidance radii must satisfy 0 < min <= max, got min {} and max {}",
                a.min_radius_meters, a.max_radius_meters
            )));
        }
        if !positive(a.base_radius_meters) {
            return Err(invalid(format!(
                "avoidance.base_radius_meters must be positive, got {}",
                a.base_radius_meters
            )));
        }
        if a.complaint_saturation == 0 {
            return Err(invalid("avoidance.complaint_saturation must be at least 1"));
        }
        if a.circle_segments_per_quadrant == 0 {
            return Err(invalid(
                "avoidance.circle_segments_per_quadrant must be at least 1",
            ));
        }
        if !non_negative(a.simplify_tolerance_degrees) {
            return Err(invalid("avoidance.simplify_tolerance_degrees must be >= 0"));
        }
        if !positive(self.search.search_radius_degrees) {
            return Err(invalid("search.search_radius_degrees must be positive"));
        }
        if self.search.query_timeout_ms == 0 {
            return Err(invalid("search.query_timeout_ms must be positive"));
        }
        if !non_negative(self.phases.min_exclusion_distance_degrees) {
            return Err(invalid(
                "phases.min_exclusion_distance_degrees must be >= 0",
            ));
        }
        if !positive(self.ranking.distance_epsilon) {
            return Err(invalid("ranking.distance_epsilon must be positive"));
        }
        if self.directions.timeout_secs == 0 {
            return Err(invalid("directions.timeout_secs must be positive"));
        }

        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}
