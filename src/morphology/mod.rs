//! Binary morphology on occupancy grids.
//!
//! Both operations look at the 8-neighborhood only. Out-of-bounds cells are
//! background, so erosion always clears the outer border.
//!
//! - [`dilate`]: occupied if the pixel or any neighbor is occupied.
//! - [`erode`]: occupied only if all eight neighbors are occupied. The pixel
//!   itself is not consulted.

mod config;

pub use config::MorphologyConfig;

use image::RgbaImage;
use rayon::prelude::*;

use crate::grid::{is_empty_at, occupied_count, OPAQUE_BLACK, TRANSPARENT};

/// Builds a new binary grid where each pixel is occupied iff `keep(x, y)`.
fn map_occupancy<F>(grid: &RgbaImage, keep: F) -> RgbaImage
where
    F: Fn(i64, i64) -> bool + Sync,
{
    let (width, height) = grid.dimensions();
    let mut out = RgbaImage::new(width, height);
    if width == 0 {
        return out;
    }

    out.par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let value = if keep(x as i64, y as i64) {
                    OPAQUE_BLACK
                } else {
                    TRANSPARENT
                };
                px.copy_from_slice(&value.0);
            }
        });
    out
}

/// Dilation with a 3x3 square element.
pub fn dilate(grid: &RgbaImage) -> RgbaImage {
    map_occupancy(grid, |x, y| {
        !is_empty_at(grid, x, y) || occupied_count((x, y), grid) > 0
    })
}

/// Strict erosion: every one of the eight neighbors must be occupied.
pub fn erode(grid: &RgbaImage) -> RgbaImage {
    map_occupancy(grid, |x, y| occupied_count((x, y), grid) == 8)
}

/// One dilation followed by `erode_passes` erosions.
///
/// Each pass reads the previous pass's output; the input is untouched.
pub fn clean(grid: &RgbaImage, erode_passes: u32) -> RgbaImage {
    let mut current = dilate(grid);
    for pass in 0..erode_passes {
        current = erode(&current);
        tracing::trace!(pass, "erode pass finished");
    }
    current
}
