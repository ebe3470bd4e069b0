//! Precomputed multi-octave fractal noise field used to gate spur growth.

use image::GrayImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

/// Configuration for the fractal noise field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFieldConfig {
    /// Number of noise octaves.
    pub octaves: u8,
    /// Base frequency applied to normalized `[0, 1)` coordinates.
    pub scale: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude decay per octave.
    pub persistence: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
}

impl Default for NoiseFieldConfig {
    fn default() -> Self {
        Self {
            octaves: 2,
            scale: 1.0,
            lacunarity: 15.0,
            persistence: 1.0 / 1.5,
            seed: 10,
        }
    }
}

impl NoiseFieldConfig {
    /// Creates the default configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Broad, low-frequency blotches. Spurs fray in large patches.
    pub fn smooth(seed: i32) -> Self {
        Self {
            octaves: 4,
            scale: 4.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed,
        }
    }
}

/// Gain applied to raw simdnoise samples.
///
/// Unscaled single-octave simplex output peaks near `±0.025`; this brings it
/// to roughly `[-1, 1]` so the level mapping uses most of `[0, 255]`.
pub const RAW_NOISE_GAIN: f32 = 40.0;

/// Maps a noise sample to an integer level.
///
/// The sample is clamped to `[-1, 1]` and rescaled linearly to `[0, 255]`,
/// truncating toward zero.
#[inline]
pub fn noise_level(value: f32) -> u8 {
    if value.is_nan() {
        return 127;
    }
    ((value.clamp(-1.0, 1.0) + 1.0) / 2.0 * 255.0) as u8
}

/// Samples fractal noise at a 2D position.
///
/// Each octave is a single simdnoise fBm sample with its own seed offset,
/// scaled by [`RAW_NOISE_GAIN`]. The sum is normalized by the total
/// amplitude, so the result lies in approximately `[-1, 1]`.
pub fn sample_fractal_noise_2d(x: f32, y: f32, config: &NoiseFieldConfig) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = 1.0f32;
    let mut frequency = config.scale;
    let mut max_amplitude = 0.0f32;

    for octave in 0..config.octaves {
        let octave_seed = config.seed.wrapping_add(octave as i32 * 31337);

        let noise_value = NoiseBuilder::fbm_2d_offset(x * frequency, 1, y * frequency, 1)
            .with_seed(octave_seed)
            .with_freq(1.0)
            .with_octaves(1)
            .generate()
            .0[0]
            * RAW_NOISE_GAIN;

        total += noise_value * amplitude;
        max_amplitude += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    if max_amplitude > 0.0 {
        total / max_amplitude
    } else {
        0.0
    }
}

/// Dense per-pixel noise levels in `[0, 255]`.
///
/// Built once per image size and shared read-only by the growth stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl NoiseField {
    /// Generates the field for a `width` x `height` image.
    ///
    /// Pixel `(x, y)` is sampled at `(x / width, y / height)` and mapped to a
    /// level with [`noise_level`], independently of every other pixel.
    pub fn generate(width: u32, height: u32, config: &NoiseFieldConfig) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;

        let values = (0..(width as usize * height as usize))
            .into_par_iter()
            .map(|idx| {
                let x = (idx % width as usize) as f32;
                let y = (idx / width as usize) as f32;
                noise_level(sample_fractal_noise_2d(x / w, y / h, config))
            })
            .collect();

        Self {
            width,
            height,
            values,
        }
    }

    /// Wraps precomputed levels. `values` must be `width * height` long, row-major.
    pub fn from_values(width: u32, height: u32, values: Vec<u8>) -> Option<Self> {
        if values.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// A field holding the same level everywhere.
    pub fn constant(width: u32, height: u32, level: u8) -> Self {
        Self {
            width,
            height,
            values: vec![level; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Level at `(x, y)`, clamping coordinates to the nearest valid pixel.
    ///
    /// An empty field reads as 0.
    #[inline]
    pub fn sample(&self, x: i64, y: i64) -> u8 {
        if self.values.is_empty() {
            return 0;
        }
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.values[cy * self.width as usize + cx]
    }

    /// Copies the field into an 8-bit grayscale image.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.values[(y * self.width + x) as usize]])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NoiseFieldConfig::default();
        assert_eq!(config.octaves, 2);
        assert_eq!(config.lacunarity, 15.0);
        assert_eq!(config.seed, 10);
    }

    #[test]
    fn test_noise_reproducibility() {
        let config = NoiseFieldConfig::with_seed(12345);
        let a = sample_fractal_noise_2d(0.5, 0.3, &config);
        let b = sample_fractal_noise_2d(0.5, 0.3, &config);
        assert_eq!(a, b, "Same seed and position should produce same result");
    }

    #[test]
    fn test_field_reproducibility() {
        let config = NoiseFieldConfig::default();
        let f1 = NoiseField::generate(24, 17, &config);
        let f2 = NoiseField::generate(24, 17, &config);
        assert_eq!(f1, f2);
        assert_eq!(f1.values().len(), 24 * 17);
    }

    #[test]
    fn test_noise_level_is_linear_over_unit_range() {
        assert_eq!(noise_level(-1.0), 0);
        assert_eq!(noise_level(0.0), 127);
        assert_eq!(noise_level(0.5), 191);
        assert_eq!(noise_level(1.0), 255);
        assert_eq!(noise_level(-3.0), 0);
        assert_eq!(noise_level(7.5), 255);
    }

    #[test]
    fn test_field_levels_follow_own_sample() {
        let config = NoiseFieldConfig::default();
        let field = NoiseField::generate(8, 8, &config);
        for y in 0..8 {
            for x in 0..8 {
                let raw = sample_fractal_noise_2d(x as f32 / 8.0, y as f32 / 8.0, &config);
                assert_eq!(field.sample(x, y), noise_level(raw), "level at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_field_spreads_levels() {
        let field = NoiseField::generate(64, 64, &NoiseFieldConfig::smooth(7));
        let min = *field.values().iter().min().unwrap();
        let max = *field.values().iter().max().unwrap();
        assert!(max - min > 64, "levels span only {}..={}", min, max);
    }

    #[test]
    fn test_sample_clamps_out_of_bounds() {
        let values: Vec<u8> = (0..12).collect();
        let field = NoiseField::from_values(4, 3, values).unwrap();

        assert_eq!(field.sample(0, 0), 0);
        assert_eq!(field.sample(3, 2), 11);
        assert_eq!(field.sample(-5, -5), 0);
        assert_eq!(field.sample(10, 0), 3);
        assert_eq!(field.sample(1, 99), 9);
        assert_eq!(field.sample(99, 99), 11);
    }

    #[test]
    fn test_empty_field_samples_zero() {
        let field = NoiseField::generate(0, 0, &NoiseFieldConfig::default());
        assert!(field.values().is_empty());
        assert_eq!(field.sample(0, 0), 0);
    }

    #[test]
    fn test_from_values_rejects_wrong_length() {
        assert!(NoiseField::from_values(3, 3, vec![0; 8]).is_none());
    }

    #[test]
    fn test_to_gray_image() {
        let field = NoiseField::constant(3, 2, 77);
        let img = field.to_gray_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert!(img.pixels().all(|p| p.0[0] == 77));
    }
}
