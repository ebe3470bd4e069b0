//! Morphology configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the dilate/erode cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    /// Erode passes applied after the single dilation.
    pub erode_passes: u32,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self { erode_passes: 3 }
    }
}
