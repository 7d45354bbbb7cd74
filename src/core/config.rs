//! Simulation configuration
//!
//! Built in code with the `with_*` builders, or loaded from a RON file.
//! Missing fields take their defaults.
//!
//! ```ron
//! (
//!     fixed_delta: 0.05,
//!     max_ticks: 400,
//!     ai_speed: 3.0,
//!     pawn_modules: ["BasicMover"],
//!     patrol: [(0.0, 0.0, 0.0), (4.0, 0.0, 0.0)],
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds simulated per tick
    pub fixed_delta: f32,
    /// Number of ticks to run
    pub max_ticks: u32,
    /// Movement speed of AI controllers, units per second
    pub ai_speed: f32,
    /// Speed of `BasicMover` modules, units per second
    pub mover_speed: f32,
    /// Starting hit points of `HealthModule`s
    pub max_hp: f32,
    /// Module type names attached to spawned pawns
    pub pawn_modules: Vec<String>,
    /// Waypoint positions of the demo patrol loop, visited in order
    pub patrol: Vec<Vec3>,
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_delta: 1.0 / 60.0,
            max_ticks: 600,
            ai_speed: 2.0,
            mover_speed: 1.0,
            max_hp: 10.0,
            pawn_modules: vec![String::from("BasicMover"), String::from("HealthModule")],
            patrol: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(6.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 6.0),
            ],
            log_filter: String::from("info"),
        }
    }
}

impl SimulationConfig {
    /// Set the tick length in seconds
    pub fn with_fixed_delta(mut self, fixed_delta: f32) -> Self {
        self.fixed_delta = fixed_delta;
        self
    }

    /// Set the number of ticks to run
    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Set AI controller speed
    pub fn with_ai_speed(mut self, speed: f32) -> Self {
        self.ai_speed = speed;
        self
    }

    /// Set pawn mover speed
    pub fn with_mover_speed(mut self, speed: f32) -> Self {
        self.mover_speed = speed;
        self
    }

    /// Set starting hit points
    pub fn with_max_hp(mut self, max_hp: f32) -> Self {
        self.max_hp = max_hp;
        self
    }

    /// Set the modules attached to spawned pawns
    pub fn with_pawn_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pawn_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Set the demo patrol loop
    pub fn with_patrol(mut self, patrol: impl Into<Vec<Vec3>>) -> Self {
        self.patrol = patrol.into();
        self
    }

    /// Set the default log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse a configuration from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON for this struct
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The contents are not a valid configuration
    #[error("invalid config: {0}")]
    Parse(String),
}
