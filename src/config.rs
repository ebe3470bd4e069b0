//! Top-level generation configuration.
//!
//! Every tunable constant of the pipeline lives here and is passed in
//! explicitly. Configurations can be stored as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{OutputMode, TerrainPalette};
use crate::growth::GrowthConfig;
use crate::morphology::MorphologyConfig;
use crate::noise::NoiseFieldConfig;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Folds a 64-bit seed into the 32-bit noise seed, keeping the high bits.
pub fn noise_seed(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as i32
}

/// Complete configuration for one coastline generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoastConfig {
    pub growth: GrowthConfig,
    pub noise: NoiseFieldConfig,
    pub morphology: MorphologyConfig,
    pub output: OutputMode,
    pub palette: TerrainPalette,
}

impl CoastConfig {
    /// Default pipeline with the given seed for both noise and spur lengths.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            growth: GrowthConfig::with_seed(seed),
            noise: NoiseFieldConfig::with_seed(noise_seed(seed)),
            ..Default::default()
        }
    }

    /// Ungated fixed-range spurs, a single erode pass and binary output.
    pub fn classic(seed: u64) -> Self {
        Self {
            growth: GrowthConfig::classic(seed),
            noise: NoiseFieldConfig::with_seed(noise_seed(seed)),
            morphology: MorphologyConfig { erode_passes: 1 },
            output: OutputMode::Binary,
            palette: TerrainPalette::default(),
        }
    }

    /// Reseeds both spur lengths and the noise field.
    pub fn set_seed(&mut self, seed: u64) {
        self.growth.seed = seed;
        self.noise.seed = noise_seed(seed);
    }

    /// Reads a JSON configuration. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Checks value ranges that would otherwise produce meaningless output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let noise = &self.noise;
        if noise.octaves < 1 || noise.octaves > 16 {
            return Err(ConfigError::InvalidValue {
                name: "noise.octaves",
                reason: format!("{} is outside 1..=16", noise.octaves),
            });
        }
        for (name, value) in [
            ("noise.scale", noise.scale),
            ("noise.lacunarity", noise.lacunarity),
            ("noise.persistence", noise.persistence),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("{} must be a positive number", value),
                });
            }
        }
        for (name, value) in [
            ("growth.gate_base", self.growth.gate_base),
            ("growth.gate_ramp", self.growth.gate_ramp),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("{} must be a non-negative number", value),
                });
            }
        }
        let palette = &self.palette;
        if palette.land == palette.sand
            || palette.land == palette.water
            || palette.sand == palette.water
        {
            return Err(ConfigError::InvalidValue {
                name: "palette",
                reason: "land, sand and water colors must be distinct".to_string(),
            });
        }
        Ok(())
    }
}
