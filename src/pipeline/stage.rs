//! Generation stage trait and pipeline orchestration.

use std::time::Instant;

use image::RgbaImage;
use thiserror::Error;

use crate::classify::{band_histogram, render, OutputMode};
use crate::config::CoastConfig;
use crate::growth::grow_spurs;
use crate::morphology::clean;
use crate::noise::NoiseField;

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Noise-gated spur growth from the mask.
    Growth,
    /// Dilate and erode cleanup.
    Morphology,
    /// Terrain band coloring (or binary rendering).
    Classification,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Growth => "growth",
            StageId::Morphology => "morphology",
            StageId::Classification => "classification",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// Working state threaded through the stages.
///
/// The source mask is never modified. Each stage replaces `current` with a
/// freshly allocated grid.
#[derive(Debug, Clone)]
pub struct Canvas {
    mask: RgbaImage,
    current: Option<RgbaImage>,
    noise: Option<NoiseField>,
    keep_intermediates: bool,
    /// Growth output, kept when intermediates are enabled.
    pub grown: Option<RgbaImage>,
    /// Morphology output, kept when intermediates are enabled.
    pub cleaned: Option<RgbaImage>,
}

impl Canvas {
    /// Creates a canvas over a source mask.
    pub fn new(mask: RgbaImage) -> Self {
        Self {
            mask,
            current: None,
            noise: None,
            keep_intermediates: false,
            grown: None,
            cleaned: None,
        }
    }

    /// Keep copies of the grown and cleaned grids for inspection.
    pub fn with_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    /// Uses a prebuilt noise field instead of generating one.
    pub fn with_noise(mut self, noise: NoiseField) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn mask(&self) -> &RgbaImage {
        &self.mask
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// Output of the most recent stage, if any has run.
    pub fn current(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    pub fn noise(&self) -> Option<&NoiseField> {
        self.noise.as_ref()
    }

    /// Consumes the canvas, returning the last stage's output.
    pub fn into_output(self) -> Option<RgbaImage> {
        self.current
    }

    fn require_current(&self, stage: &str) -> Result<&RgbaImage, PipelineError> {
        self.current.as_ref().ok_or_else(|| {
            PipelineError::StageFailed(stage.to_string(), "no input grid on canvas".to_string())
        })
    }
}

/// Trait for implementing generation stages.
///
/// Each stage reads the canvas's current grid and replaces it with a new
/// one, building upon previous stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage.
    fn execute(&self, canvas: &mut Canvas, config: &CoastConfig) -> Result<(), PipelineError>;
}

/// Orchestrates generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: CoastConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: CoastConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Growth, morphology and classification, in that order.
    pub fn standard(config: CoastConfig) -> Self {
        let mut pipeline = Self::new(config);
        pipeline
            .add_stage(GrowthStage)
            .add_stage(MorphologyStage)
            .add_stage(ClassificationStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &CoastConfig {
        &self.config
    }

    /// Executes all stages in order on the given canvas.
    pub fn run(&self, canvas: &mut Canvas) -> Result<(), PipelineError> {
        self.run_with_callbacks(canvas, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `canvas` - The canvas to generate on
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        canvas: &mut Canvas,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            let started = Instant::now();
            stage.execute(canvas, &self.config)?;
            tracing::info!(stage = stage.id().name(), elapsed = ?started.elapsed(), "stage complete");
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Runs the standard pipeline on `mask` and returns the final image.
pub fn generate(mask: &RgbaImage, config: &CoastConfig) -> Result<RgbaImage, PipelineError> {
    let mut canvas = Canvas::new(mask.clone());
    Pipeline::standard(config.clone()).run(&mut canvas)?;
    canvas.into_output().ok_or_else(|| {
        PipelineError::StageFailed("pipeline".to_string(), "no output produced".to_string())
    })
}

/// Spur growth stage. Builds the noise field on first use.
pub struct GrowthStage;

impl GenerationStage for GrowthStage {
    fn id(&self) -> StageId {
        StageId::Growth
    }

    fn name(&self) -> &str {
        "Spur Growth"
    }

    fn execute(&self, canvas: &mut Canvas, config: &CoastConfig) -> Result<(), PipelineError> {
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                format!("mask is empty ({}x{})", width, height),
            ));
        }

        let stale = canvas
            .noise
            .as_ref()
            .is_some_and(|n| (n.width(), n.height()) != (width, height));
        if stale {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "noise field size does not match the mask".to_string(),
            ));
        }
        if canvas.noise.is_none() && config.growth.noise_gating {
            tracing::debug!(width, height, "building noise field");
            canvas.noise = Some(NoiseField::generate(width, height, &config.noise));
        }

        // Ungated growth never reads the field.
        let fallback;
        let noise = match canvas.noise.as_ref() {
            Some(n) => n,
            None => {
                fallback = NoiseField::constant(width, height, 0);
                &fallback
            }
        };

        let grown = grow_spurs(&canvas.mask, noise, &config.growth);
        if canvas.keep_intermediates {
            canvas.grown = Some(grown.clone());
        }
        canvas.current = Some(grown);
        Ok(())
    }
}

/// One dilation followed by the configured erode passes.
pub struct MorphologyStage;

impl GenerationStage for MorphologyStage {
    fn id(&self) -> StageId {
        StageId::Morphology
    }

    fn name(&self) -> &str {
        "Morphology Cleanup"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Growth]
    }

    fn execute(&self, canvas: &mut Canvas, config: &CoastConfig) -> Result<(), PipelineError> {
        let input = canvas.require_current(self.name())?;
        let cleaned = clean(input, config.morphology.erode_passes);
        if canvas.keep_intermediates {
            canvas.cleaned = Some(cleaned.clone());
        }
        canvas.current = Some(cleaned);
        Ok(())
    }
}

/// Final rendering: terrain bands or a binary mask.
pub struct ClassificationStage;

impl GenerationStage for ClassificationStage {
    fn id(&self) -> StageId {
        StageId::Classification
    }

    fn name(&self) -> &str {
        "Terrain Classification"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Morphology]
    }

    fn execute(&self, canvas: &mut Canvas, config: &CoastConfig) -> Result<(), PipelineError> {
        let input = canvas.require_current(self.name())?;
        let output = render(input, config.output, &config.palette);
        if config.output == OutputMode::Terrain {
            let hist = band_histogram(&output, &config.palette);
            tracing::debug!(water = hist.water, sand = hist.sand, land = hist.land, "bands");
        }
        canvas.current = Some(output);
        Ok(())
    }
}
