//! Simulation configuration
//!
//! Defaults reproduce the reference run: 15000 discs of radius 3 moving at
//! 180 px/s inside a 1600x1000 viewport, indexed by a 64x64 grid.

use crate::engine::Viewport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 1600;
pub const DEFAULT_HEIGHT: u32 = 1000;
pub const DEFAULT_PARTICLE_COUNT: usize = 15_000;
pub const DEFAULT_RADIUS: f32 = 3.0;
pub const DEFAULT_SPEED: f32 = 180.0;
pub const DEFAULT_GRID_ROWS: usize = 64;
pub const DEFAULT_GRID_COLS: usize = 64;
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;
pub const DEFAULT_ENERGY_LOG_INTERVAL: u64 = 60;

/// Which candidate-pair enumerator the resolver uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseKind {
    /// Pairs sharing at least one grid cell
    #[default]
    Grid,
    /// Every unordered pair, O(n^2)
    Naive,
}

/// What to do when a particle maps to a cell beyond the grid margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Abort the frame with `GridError::CellOutOfRange`
    #[default]
    Fail,
    /// Clamp to the nearest edge cell and log a warning
    Clamp,
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: u32,
    pub height: u32,
    pub particle_count: usize,
    pub radius: f32,
    /// Initial speed of every particle, in units per second
    pub speed: f32,
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Placement seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Consecutive rejections allowed while placing a single particle
    pub max_placement_attempts: u32,
    pub broad_phase: BroadPhaseKind,
    pub out_of_range: OutOfRangePolicy,
    /// Log the energy at info level every this many frames; 0 turns it off
    pub energy_log_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            particle_count: DEFAULT_PARTICLE_COUNT,
            radius: DEFAULT_RADIUS,
            speed: DEFAULT_SPEED,
            grid_rows: DEFAULT_GRID_ROWS,
            grid_cols: DEFAULT_GRID_COLS,
            seed: None,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            broad_phase: BroadPhaseKind::default(),
            out_of_range: OutOfRangePolicy::default(),
            energy_log_interval: DEFAULT_ENERGY_LOG_INTERVAL,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    /// Same settings, sized to `viewport`
    pub fn with_viewport(self, viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one cell, got {}x{}",
                self.grid_rows, self.grid_cols
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speed must be finite and non-negative, got {}",
                self.speed
            )));
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_placement_attempts must be at least 1".to_string(),
            ));
        }
        let diameter = 2.0 * self.radius;
        if (self.width as f32) <= diameter || (self.height as f32) <= diameter {
            return Err(ConfigError::Invalid(format!(
                "viewport {}x{} cannot hold a disc of radius {}",
                self.width, self.height, self.radius
            )));
        }
        Ok(())
    }
}
