//! PNG decode and encode for masks, results and noise previews.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, RgbaImage};
use thiserror::Error;

use crate::noise::NoiseField;

/// Errors that can occur while reading a mask image.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum ImageWriteError {
    #[error("Failed to create '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Faster, larger files. Useful for intermediate dumps.
    pub fn fast() -> Self {
        Self {
            compression: CompressionType::Fast,
            filter: FilterType::NoFilter,
        }
    }
}

/// Decodes an image file into an RGBA8 grid.
///
/// Any format the `image` crate was built with is accepted; grayscale and
/// RGB inputs become opaque RGBA.
pub fn load_mask(path: &Path) -> Result<RgbaImage, ImageLoadError> {
    let reader = image::ImageReader::open(path).map_err(|source| ImageLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| ImageLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = reader.decode().map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

fn write_png(
    path: &Path,
    data: &[u8],
    width: u32,
    height: u32,
    color: image::ExtendedColorType,
    options: &PngExportOptions,
) -> Result<(), ImageWriteError> {
    let file = File::create(path).map_err(|source| ImageWriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let encoder =
        PngEncoder::new_with_quality(writer.by_ref(), options.compression, options.filter);
    encoder
        .write_image(data, width, height, color)
        .map_err(|source| ImageWriteError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(|source| ImageWriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an RGBA8 grid as a PNG file.
pub fn export_png(
    grid: &RgbaImage,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), ImageWriteError> {
    write_png(
        path,
        grid.as_raw(),
        grid.width(),
        grid.height(),
        image::ExtendedColorType::Rgba8,
        options,
    )
}

/// Writes a noise field as an 8-bit grayscale PNG.
pub fn export_noise_png(
    field: &NoiseField,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), ImageWriteError> {
    write_png(
        path,
        field.values(),
        field.width(),
        field.height(),
        image::ExtendedColorType::L8,
        options,
    )
}
