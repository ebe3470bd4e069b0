//! Output coloring configuration.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// How the final grid is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Water, sand and land colors by neighbor density.
    Terrain,
    /// Opaque black shape on a transparent background.
    Binary,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Terrain
    }
}

/// RGBA colors for the three terrain bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainPalette {
    pub land: [u8; 4],
    pub sand: [u8; 4],
    pub water: [u8; 4],
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            land: [26, 102, 42, 255],
            sand: [250, 219, 117, 255],
            water: [18, 0, 82, 255],
        }
    }
}

impl TerrainPalette {
    pub fn land(&self) -> Rgba<u8> {
        Rgba(self.land)
    }

    pub fn sand(&self) -> Rgba<u8> {
        Rgba(self.sand)
    }

    pub fn water(&self) -> Rgba<u8> {
        Rgba(self.water)
    }
}
