use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    growth::DEFAULT_RING_DURATION_SECONDS, rhythm::DEFAULT_BPM, Result, TreeRingError,
};

/// Data file read from the working directory when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "tree_ring_data.json";

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.animation.validate()
    }
}

/// Timing parameters for the animation engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "AnimationConfig::default_bpm")]
    pub bpm: u32,
    #[serde(default = "AnimationConfig::default_ring_duration_secs")]
    pub ring_duration_secs: f64,
    #[serde(default = "AnimationConfig::default_target_fps")]
    pub target_fps: u32,
}

impl AnimationConfig {
    fn default_bpm() -> u32 {
        DEFAULT_BPM
    }
    fn default_ring_duration_secs() -> f64 {
        DEFAULT_RING_DURATION_SECONDS
    }
    fn default_target_fps() -> u32 {
        60
    }

    pub fn validate(&self) -> Result<()> {
        if self.bpm == 0 {
            return Err(TreeRingError::invalid_config("bpm must be positive"));
        }
        if !self.ring_duration_secs.is_finite() || self.ring_duration_secs <= 0.0 {
            return Err(TreeRingError::invalid_config(
                "ring_duration_secs must be a positive number",
            ));
        }
        if self.target_fps == 0 {
            return Err(TreeRingError::invalid_config("target_fps must be positive"));
        }
        Ok(())
    }

    /// Seconds between two host ticks.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / f64::from(self.target_fps.max(1))
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            bpm: Self::default_bpm(),
            ring_duration_secs: Self::default_ring_duration_secs(),
            target_fps: Self::default_target_fps(),
        }
    }
}

/// Where ring data comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DataConfig {
    /// Configured path, or the default data file.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }
}
