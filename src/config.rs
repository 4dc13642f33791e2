//! Trail configuration
//!
//! All tunable constants of the trail effect live in [`TrailConfig`]. The
//! defaults reproduce the site's look: six dots shrinking from 8px to 3px,
//! fading from 0.6 to 0.1 opacity, each closing 20% of its gap per frame.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`TrailConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Trail needs at least one point")]
    NoPoints,

    #[error("Trail supports at most {MAX_POINT_COUNT} points, got {0}")]
    TooManyPoints(usize),

    #[error("Easing factor must be in (0, 1], got {0}")]
    InvalidEasing(f64),

    #[error("Point {index} would have non-positive size {size}")]
    InvalidSize { index: usize, size: f64 },

    #[error("Invalid opacity setting: {0}")]
    InvalidOpacity(String),

    #[error("Grace period must be non-negative, got {0}ms")]
    InvalidGracePeriod(f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Upper bound on dots per session
pub const MAX_POINT_COUNT: usize = 64;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Visual and timing parameters for every trail session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrailConfig {
    /// Number of dots per session (head first)
    pub point_count: usize,
    /// Fraction of the remaining distance closed per frame
    pub easing: f64,
    /// Diameter of the head dot in pixels
    pub head_size: f64,
    /// Size lost by each successive dot
    pub size_step: f64,
    /// Base opacity of the head dot
    pub head_opacity: f64,
    /// Opacity lost by each successive dot
    pub opacity_step: f64,
    /// Delay between hiding an ended contact's dots and removing them
    pub grace_period_ms: f64,
    /// CSS color of the dots
    pub color: String,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            point_count: 6,
            easing: 0.20,
            head_size: 8.0,
            size_step: 1.0,
            head_opacity: 0.6,
            opacity_step: 0.1,
            grace_period_ms: 50.0,
            color: "var(--primary-color)".to_string(),
        }
    }
}

impl TrailConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrailConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every dot ends up with a usable size and opacity
    pub fn validate(&self) -> ConfigResult<()> {
        if self.point_count == 0 {
            return Err(ConfigError::NoPoints);
        }
        if self.point_count > MAX_POINT_COUNT {
            return Err(ConfigError::TooManyPoints(self.point_count));
        }

        if !(self.easing > 0.0 && self.easing <= 1.0) {
            return Err(ConfigError::InvalidEasing(self.easing));
        }

        let last = self.point_count - 1;
        let tail_size = self.point_size(last);
        if !(self.head_size > 0.0 && tail_size > 0.0) {
            let (index, size) = if self.head_size > 0.0 {
                (last, tail_size)
            } else {
                (0, self.head_size)
            };
            return Err(ConfigError::InvalidSize { index, size });
        }

        if !(0.0..=1.0).contains(&self.head_opacity) {
            return Err(ConfigError::InvalidOpacity(format!(
                "head opacity {} outside [0, 1]",
                self.head_opacity
            )));
        }
        if self.opacity_step < 0.0 {
            return Err(ConfigError::InvalidOpacity(format!(
                "opacity step {} is negative",
                self.opacity_step
            )));
        }

        if !(self.grace_period_ms >= 0.0) {
            return Err(ConfigError::InvalidGracePeriod(self.grace_period_ms));
        }

        Ok(())
    }

    /// Diameter of the dot at `index`
    pub fn point_size(&self, index: usize) -> f64 {
        self.head_size - index as f64 * self.size_step
    }

    /// Resting opacity of the dot at `index`, clamped at zero
    pub fn point_opacity(&self, index: usize) -> f64 {
        (self.head_opacity - index as f64 * self.opacity_step).max(0.0)
    }
}
