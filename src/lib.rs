//! Procedural coastline generator.
//!
//! Turns a sparse mask of coastline pixels into an organic terrain image:
//! boundary points sprout noise-gated spurs along their normals, the shape
//! is cleaned with dilation and erosion, and pixels are colored into water,
//! sand and land by neighbor density.

pub mod classify;
pub mod config;
pub mod export;
pub mod grid;
pub mod growth;
pub mod morphology;
pub mod noise;
pub mod pipeline;

pub use config::{CoastConfig, ConfigError};
pub use pipeline::{generate, Canvas, Pipeline, PipelineError};
