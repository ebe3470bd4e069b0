//! Pipeline module for orchestrating coastline generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that are composed into the growth, cleanup and coloring pipeline.

mod stage;

pub use stage::{
    generate, Canvas, ClassificationStage, GenerationStage, GrowthStage, MorphologyStage,
    Pipeline, PipelineError, StageId,
};
