//! Spur growth configuration.

use serde::{Deserialize, Serialize};

/// Parameters for growing spurs out of the mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Shortest spur length (inclusive).
    pub min_spur: u32,
    /// Longest spur length (exclusive). `max_spur <= min_spur` disables growth.
    pub max_spur: u32,
    /// Seed mixed with each source point's coordinates for its length draws.
    pub seed: u64,
    /// If false, every spur step is marked regardless of noise.
    pub noise_gating: bool,
    /// Gate threshold at the spur base (noise level, 0-255).
    pub gate_base: f32,
    /// Amount the gate threshold rises from base to tip.
    pub gate_ramp: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            min_spur: 0,
            max_spur: 25,
            seed: 0,
            noise_gating: true,
            gate_base: 100.0,
            gate_ramp: 155.0,
        }
    }
}

impl GrowthConfig {
    /// Creates the default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Straight spurs of 5-24 pixels with no noise gate.
    pub fn classic(seed: u64) -> Self {
        Self {
            min_spur: 5,
            max_spur: 25,
            seed,
            noise_gating: false,
            ..Default::default()
        }
    }

    /// Returns true if no spur can have a positive length.
    pub fn is_noop(&self) -> bool {
        self.max_spur <= self.min_spur || self.max_spur <= 1
    }

    /// Gate threshold for step `step` of a spur of length `len`.
    ///
    /// Rises linearly from `gate_base` at the base; the ramp term is
    /// truncated to a whole level.
    #[inline]
    pub fn gate_threshold(&self, step: u32, len: u32) -> f32 {
        if len == 0 {
            return self.gate_base;
        }
        let fraction = step as f32 / len as f32;
        self.gate_base + (fraction * self.gate_ramp).trunc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_threshold_ramp() {
        let config = GrowthConfig::default();
        assert_eq!(config.gate_threshold(0, 10), 100.0);
        assert_eq!(config.gate_threshold(5, 10), 177.0);
        assert_eq!(config.gate_threshold(9, 10), 239.0);
        assert!(config.gate_threshold(99, 100) < 255.0);
    }

    #[test]
    fn test_noop_ranges() {
        let mut config = GrowthConfig::default();
        assert!(!config.is_noop());

        config.min_spur = 0;
        config.max_spur = 0;
        assert!(config.is_noop());

        config.max_spur = 1;
        assert!(config.is_noop());

        config.min_spur = 9;
        config.max_spur = 4;
        assert!(config.is_noop());
    }

    #[test]
    fn test_classic_disables_gate() {
        let config = GrowthConfig::classic(3);
        assert!(!config.noise_gating);
        assert_eq!((config.min_spur, config.max_spur), (5, 25));
    }
}
