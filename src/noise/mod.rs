//! Noise generation for the growth gate.
//!
//! Uses simdnoise for the per-octave noise primitive.

mod field;

pub use field::{
    noise_level, sample_fractal_noise_2d, NoiseField, NoiseFieldConfig, RAW_NOISE_GAIN,
};
