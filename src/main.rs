//! Coastgen CLI - grows organic coastlines from mask images.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use coastgen::classify::{band_histogram, classify, OutputMode, TerrainPalette};
use coastgen::export::{export_noise_png, export_png, load_mask, PngExportOptions};
use coastgen::grid::occupied_len;
use coastgen::growth::summarize_directions;
use coastgen::noise::NoiseField;
use coastgen::pipeline::{Canvas, Pipeline};
use coastgen::CoastConfig;

/// Procedural coastline generator.
#[derive(Parser)]
#[command(name = "coastgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow, clean and color a coastline mask.
    Generate(GenerateArgs),

    /// Display information about a mask without generating.
    Info {
        /// Mask image to inspect.
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Mask image: coastline pixels on a transparent or white background.
    #[arg(short, long)]
    input: PathBuf,

    /// Output PNG path.
    #[arg(short, long, default_value = "post.png")]
    output: PathBuf,

    /// JSON configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from the ungated, single-erosion, binary preset.
    #[arg(long, conflicts_with = "config")]
    classic: bool,

    /// Seed for spur lengths and noise. The noise seed folds the high 32 bits
    /// into the low ones.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Shortest spur length (inclusive).
    #[arg(long)]
    min_spur: Option<u32>,

    /// Longest spur length (exclusive).
    #[arg(long)]
    max_spur: Option<u32>,

    /// Number of noise octaves (1-16).
    #[arg(long)]
    octaves: Option<u8>,

    /// Base noise frequency over the normalized image.
    #[arg(long)]
    scale: Option<f32>,

    /// Frequency multiplier per octave.
    #[arg(long)]
    lacunarity: Option<f32>,

    /// Amplitude decay per octave.
    #[arg(long)]
    persistence: Option<f32>,

    /// Grow every spur step regardless of noise.
    #[arg(long)]
    no_noise_gate: bool,

    /// Erode passes after the dilation.
    #[arg(long)]
    erode_passes: Option<u32>,

    /// Output rendering.
    #[arg(short, long)]
    mode: Option<ModeArg>,

    /// Also write the noise field as a grayscale PNG.
    #[arg(long)]
    noise_map: Option<PathBuf>,

    /// Also write the grown and cleaned grids beside the output.
    #[arg(long)]
    keep_intermediates: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Water, sand and land colors.
    Terrain,
    /// Black shape on transparent background.
    Binary,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Terrain => OutputMode::Terrain,
            ModeArg::Binary => OutputMode::Binary,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { input } => run_info(&input),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }
}

fn build_config(args: &GenerateArgs) -> CoastConfig {
    let mut config = match &args.config {
        Some(path) => CoastConfig::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None if args.classic => CoastConfig::classic(0),
        None => CoastConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.set_seed(seed);
    }
    if let Some(v) = args.min_spur {
        config.growth.min_spur = v;
    }
    if let Some(v) = args.max_spur {
        config.growth.max_spur = v;
    }
    if let Some(v) = args.octaves {
        config.noise.octaves = v;
    }
    if let Some(v) = args.scale {
        config.noise.scale = v;
    }
    if let Some(v) = args.lacunarity {
        config.noise.lacunarity = v;
    }
    if let Some(v) = args.persistence {
        config.noise.persistence = v;
    }
    if args.no_noise_gate {
        config.growth.noise_gating = false;
    }
    if let Some(v) = args.erode_passes {
        config.morphology.erode_passes = v;
    }
    if let Some(mode) = args.mode {
        config.output = mode.into();
    }

    config.validate().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    config
}

/// `<dir>/<stem>_<suffix>.png` next to `output`.
fn sibling_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "coast".to_string());
    output.with_file_name(format!("{}_{}.png", stem, suffix))
}

fn run_generate(args: GenerateArgs) {
    let config = build_config(&args);

    println!("Coastgen - Procedural Coastline Generator");
    println!("=========================================");
    println!("Input:  {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!(
        "Spurs: [{}, {}) noise gate: {}",
        config.growth.min_spur,
        config.growth.max_spur,
        if config.growth.noise_gating { "on" } else { "off" }
    );
    println!(
        "Noise: octaves={} scale={} lacunarity={} persistence={:.3} seed={}",
        config.noise.octaves,
        config.noise.scale,
        config.noise.lacunarity,
        config.noise.persistence,
        config.noise.seed
    );
    println!("Erode passes: {}", config.morphology.erode_passes);

    let start = Instant::now();

    let mask = load_mask(&args.input).unwrap_or_else(|e| {
        eprintln!("Error loading mask: {}", e);
        std::process::exit(1);
    });
    println!(
        "Mask: {}x{}, {} occupied pixels",
        mask.width(),
        mask.height(),
        occupied_len(&mask)
    );

    println!("\nRunning generation pipeline...");
    let mut canvas = Canvas::new(mask).with_intermediates(args.keep_intermediates);
    let pipeline = Pipeline::standard(config.clone());
    pipeline
        .run_with_callbacks(
            &mut canvas,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    println!("\nExporting...");
    let options = PngExportOptions::default();

    if let Some(path) = &args.noise_map {
        // Ungated runs never build the field, so make one for the preview.
        let built;
        let field = match canvas.noise() {
            Some(field) => field,
            None => {
                let (width, height) = canvas.dimensions();
                built = NoiseField::generate(width, height, &config.noise);
                &built
            }
        };
        export_noise_png(field, path, &options).unwrap_or_else(|e| {
            eprintln!("Error exporting noise map: {}", e);
            std::process::exit(1);
        });
        println!("  Exported noise map: {}", path.display());
    }

    if args.keep_intermediates {
        for (grid, suffix) in [(&canvas.grown, "grown"), (&canvas.cleaned, "cleaned")] {
            if let Some(grid) = grid {
                let path = sibling_path(&args.output, suffix);
                export_png(grid, &path, &PngExportOptions::fast()).unwrap_or_else(|e| {
                    eprintln!("Error exporting {} grid: {}", suffix, e);
                    std::process::exit(1);
                });
                println!("  Exported {} grid: {}", suffix, path.display());
            }
        }
    }

    let output = canvas.into_output().unwrap_or_else(|| {
        eprintln!("Error: pipeline produced no output");
        std::process::exit(1);
    });

    if config.output == OutputMode::Terrain {
        let hist = band_histogram(&output, &config.palette);
        let total = hist.total().max(1) as f64;
        println!(
            "  Bands: water {:.1}%  sand {:.1}%  land {:.1}%",
            hist.water as f64 * 100.0 / total,
            hist.sand as f64 * 100.0 / total,
            hist.land as f64 * 100.0 / total
        );
    }

    export_png(&output, &args.output, &options).unwrap_or_else(|e| {
        eprintln!("Error exporting PNG: {}", e);
        std::process::exit(1);
    });
    println!("  Exported {}", args.output.display());

    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(input: &Path) {
    let mask = load_mask(input).unwrap_or_else(|e| {
        eprintln!("Error loading mask: {}", e);
        std::process::exit(1);
    });
    let summary = summarize_directions(&mask);
    let pixels = mask.width() as u64 * mask.height() as u64;

    println!("Coastgen - Mask Info");
    println!("====================");
    println!();
    println!("File:       {}", input.display());
    println!("Dimensions: {}x{}", mask.width(), mask.height());
    println!("Pixels:     {:>12}", pixels);
    println!();
    println!("Coastline points:");
    println!("  Occupied:    {:>10}", summary.sources);
    println!("  Isolated:    {:>10}", summary.isolated);
    println!("  Degenerate:  {:>10}", summary.degenerate);
    if pixels > 0 {
        println!(
            "  Coverage:    {:>9.3}%",
            summary.sources as f64 * 100.0 / pixels as f64
        );
    }
    println!();

    // Density bands of the raw mask, before any growth.
    let palette = TerrainPalette::default();
    let hist = band_histogram(&classify(&mask, &palette), &palette);
    println!("Raw mask bands:");
    println!("  Water:       {:>10}", hist.water);
    println!("  Sand:        {:>10}", hist.sand);
    println!("  Land:        {:>10}", hist.land);
    println!();

    // Each source point keeps its own spur list until growth finishes.
    let spur_bytes = summary.sources as u64 * 2 * 25 * 8;
    let grid_bytes = pixels * 4;
    println!("Memory estimate (default config):");
    for (label, bytes) in [
        ("Grids (x3):  ", grid_bytes * 3),
        ("Noise field: ", pixels),
        ("Spur targets:", spur_bytes),
    ] {
        println!(
            "  {} {:>12} bytes ({:.2} MB)",
            label,
            bytes,
            bytes as f64 / 1024.0 / 1024.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_conflicts_with_config() {
        let result = Cli::try_parse_from([
            "coastgen", "generate", "-i", "mask.png", "--config", "coast.json", "--classic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_classic_alone_parses() {
        let cli = Cli::try_parse_from(["coastgen", "generate", "-i", "mask.png", "--classic"])
            .unwrap();
        match cli.command {
            Commands::Generate(args) => assert!(args.classic && args.config.is_none()),
            Commands::Info { .. } => panic!("expected generate"),
        }
    }
}
