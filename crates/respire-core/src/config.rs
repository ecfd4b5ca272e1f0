use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to serialize config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}

/// Detector tunables, fixed for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Window length that samples are accumulated over before averaging, seconds.
    pub window_secs: f32,
    /// Movement sensitivity as an integer percent. 100 is full sensitivity,
    /// which may pick up on digital jitter in the input.
    pub sensitivity: u8,
    /// Shortest duration a phase must persist before a transition out of it is
    /// accepted, seconds. Too small and rapid inhale/exhale flips get counted.
    pub dwell_secs: f32,
    /// Track the instantaneous sideways-lean value alongside the breath.
    pub enable_lean: bool,
    /// Lean magnitudes at or below this are reported as zero.
    pub lean_threshold: f32,
    /// Multiplier applied to the lean value before rounding.
    pub lean_gain: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_secs: 0.3,
            sensitivity: 90,
            dwell_secs: 1.0,
            enable_lean: false,
            lean_threshold: 0.10,
            lean_gain: 8.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.1..=2.0).contains(&self.window_secs) {
            return Err(ConfigError::OutOfRange {
                field: "window_secs",
                value: self.window_secs,
                expected: "0.1..=2.0",
            });
        }
        if self.sensitivity > 100 {
            return Err(ConfigError::OutOfRange {
                field: "sensitivity",
                value: f32::from(self.sensitivity),
                expected: "0..=100",
            });
        }
        if !(0.1..=2.0).contains(&self.dwell_secs) {
            return Err(ConfigError::OutOfRange {
                field: "dwell_secs",
                value: self.dwell_secs,
                expected: "0.1..=2.0",
            });
        }
        if !(0.0..=1.0).contains(&self.lean_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "lean_threshold",
                value: self.lean_threshold,
                expected: "0.0..=1.0",
            });
        }
        if !(0.0..=100.0).contains(&self.lean_gain) {
            return Err(ConfigError::OutOfRange {
                field: "lean_gain",
                value: self.lean_gain,
                expected: "0.0..=100.0",
            });
        }
        Ok(())
    }

    /// Load and validate a config from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
