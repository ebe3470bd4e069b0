//! Terrain band classification by final neighbor density.
//!
//! A pixel's band depends only on how many of its eight neighbors are
//! occupied in the cleaned grid; its own occupancy is ignored.

mod config;

pub use config::{OutputMode, TerrainPalette};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::grid::{occupied_count, to_binary};

/// Terrain band assigned to a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainBand {
    Water,
    Sand,
    Land,
}

impl TerrainBand {
    /// More than four occupied neighbors is land, any is sand, none is water.
    pub fn from_neighbor_count(count: u8) -> Self {
        match count {
            0 => TerrainBand::Water,
            1..=4 => TerrainBand::Sand,
            _ => TerrainBand::Land,
        }
    }

    pub fn color(self, palette: &TerrainPalette) -> Rgba<u8> {
        match self {
            TerrainBand::Water => palette.water(),
            TerrainBand::Sand => palette.sand(),
            TerrainBand::Land => palette.land(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerrainBand::Water => "water",
            TerrainBand::Sand => "sand",
            TerrainBand::Land => "land",
        }
    }
}

/// Pixel counts per band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandHistogram {
    pub water: usize,
    pub sand: usize,
    pub land: usize,
}

impl BandHistogram {
    pub fn total(&self) -> usize {
        self.water + self.sand + self.land
    }
}

/// Band of every pixel, row-major.
pub fn classify_bands(grid: &RgbaImage) -> Vec<TerrainBand> {
    let width = grid.width() as usize;
    let total = width * grid.height() as usize;
    (0..total)
        .into_par_iter()
        .map(|idx| {
            let x = (idx % width) as i64;
            let y = (idx / width) as i64;
            TerrainBand::from_neighbor_count(occupied_count((x, y), grid))
        })
        .collect()
}

/// Colors every pixel of `grid` by its terrain band.
pub fn classify(grid: &RgbaImage, palette: &TerrainPalette) -> RgbaImage {
    let bands = classify_bands(grid);
    let mut out = RgbaImage::new(grid.width(), grid.height());
    out.pixels_mut()
        .zip(bands)
        .for_each(|(px, band)| *px = band.color(palette));
    out
}

/// Binary rendering: occupied pixels opaque black, the rest transparent.
pub fn binarize(grid: &RgbaImage) -> RgbaImage {
    to_binary(grid)
}

/// Renders the cleaned grid in the requested mode.
pub fn render(grid: &RgbaImage, mode: OutputMode, palette: &TerrainPalette) -> RgbaImage {
    match mode {
        OutputMode::Terrain => classify(grid, palette),
        OutputMode::Binary => binarize(grid),
    }
}

/// Counts pixels of a classified image by matching palette colors.
///
/// Pixels that match none of the colors are not counted. The palette's colors
/// must be distinct, which `CoastConfig::validate` enforces.
pub fn band_histogram(classified: &RgbaImage, palette: &TerrainPalette) -> BandHistogram {
    let mut hist = BandHistogram::default();
    for px in classified.pixels() {
        if *px == palette.land() {
            hist.land += 1;
        } else if *px == palette.sand() {
            hist.sand += 1;
        } else if *px == palette.water() {
            hist.water += 1;
        }
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{OPAQUE_BLACK, TRANSPARENT};
    use crate::morphology::dilate;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(TerrainBand::from_neighbor_count(0), TerrainBand::Water);
        for n in 1..=4 {
            assert_eq!(TerrainBand::from_neighbor_count(n), TerrainBand::Sand);
        }
        for n in 5..=8 {
            assert_eq!(TerrainBand::from_neighbor_count(n), TerrainBand::Land);
        }
    }

    #[test]
    fn test_blank_grid_is_all_water() {
        let palette = TerrainPalette::default();
        let out = classify(&RgbaImage::from_pixel(5, 5, TRANSPARENT), &palette);
        assert!(out.pixels().all(|p| *p == palette.water()));
        assert_eq!(band_histogram(&out, &palette).water, 25);
    }

    #[test]
    fn test_dilated_single_pixel_enumeration() {
        let palette = TerrainPalette::default();
        let mut grid = RgbaImage::from_pixel(5, 5, TRANSPARENT);
        grid.put_pixel(2, 2, OPAQUE_BLACK);
        let out = classify(&dilate(&grid), &palette);

        // 3x3 block at (1..=3, 1..=3). Center sees 8, edge midpoints see 5,
        // block corners see 3, outer ring cells see 1-3.
        assert_eq!(*out.get_pixel(2, 2), palette.land());
        for (x, y) in [(2, 1), (1, 2), (3, 2), (2, 3)] {
            assert_eq!(*out.get_pixel(x, y), palette.land(), "({}, {})", x, y);
        }
        for (x, y) in [(1, 1), (3, 1), (1, 3), (3, 3)] {
            assert_eq!(*out.get_pixel(x, y), palette.sand(), "({}, {})", x, y);
        }
        for (x, y) in [(0, 0), (2, 0), (4, 4), (0, 3)] {
            assert_eq!(*out.get_pixel(x, y), palette.sand(), "({}, {})", x, y);
        }

        let hist = band_histogram(&out, &palette);
        assert_eq!(hist, BandHistogram { water: 0, sand: 20, land: 5 });
    }

    #[test]
    fn test_far_pixels_are_water() {
        let palette = TerrainPalette::default();
        let mut grid = RgbaImage::from_pixel(7, 7, TRANSPARENT);
        grid.put_pixel(3, 3, OPAQUE_BLACK);
        let hist = band_histogram(&classify(&dilate(&grid), &palette), &palette);
        // 5x5 window around the block is sand or land, the 24-cell frame is water.
        assert_eq!(hist, BandHistogram { water: 24, sand: 20, land: 5 });
    }

    #[test]
    fn test_evaluation_order_does_not_matter() {
        let palette = TerrainPalette::default();
        let grid = RgbaImage::from_fn(11, 9, |x, y| {
            if (x * 7 + y * 3) % 5 < 2 {
                OPAQUE_BLACK
            } else {
                TRANSPARENT
            }
        });
        let forward = classify(&grid, &palette);

        // Visit pixels back to front, one at a time.
        let mut backward = RgbaImage::new(11, 9);
        for y in (0..9).rev() {
            for x in (0..11).rev() {
                let band = TerrainBand::from_neighbor_count(occupied_count((x, y), &grid));
                backward.put_pixel(x as u32, y as u32, band.color(&palette));
            }
        }
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_render_modes() {
        let palette = TerrainPalette::default();
        let mut grid = RgbaImage::from_pixel(3, 3, TRANSPARENT);
        grid.put_pixel(1, 1, OPAQUE_BLACK);
        assert_eq!(render(&grid, OutputMode::Binary, &palette), grid);
        assert_eq!(
            *render(&grid, OutputMode::Terrain, &palette).get_pixel(1, 1),
            palette.water()
        );
    }
}
