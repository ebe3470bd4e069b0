//! Pixel grid primitives: emptiness, safe out-of-bounds access and
//! 8-connected neighbor lookup.
//!
//! Grids are plain `image::RgbaImage` buffers. Points are signed so callers
//! can look one cell past the edge; such reads see a transparent pixel.

mod neighbors;

pub use neighbors::{find_neighbors, occupied_count, NeighborSet, NEIGHBOR_OFFSETS};

use image::{Rgba, RgbaImage};

/// Integer pixel coordinate. May lie outside the grid.
pub type Point = (i64, i64);

/// Marker written for every occupied pixel produced by the pipeline.
pub const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Background sentinel, also returned for out-of-bounds reads.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Returns true if the pixel counts as background.
///
/// Fully transparent pixels and opaque pure white pixels are background;
/// every other color is occupied.
#[inline]
pub fn is_empty(pixel: Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    a == 0 || (a == u8::MAX && r == u8::MAX && g == u8::MAX && b == u8::MAX)
}

/// Reads a pixel, returning [`TRANSPARENT`] outside the grid.
#[inline]
pub fn pixel_at(grid: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    if in_bounds(grid, x, y) {
        *grid.get_pixel(x as u32, y as u32)
    } else {
        TRANSPARENT
    }
}

#[inline]
pub fn is_empty_at(grid: &RgbaImage, x: i64, y: i64) -> bool {
    is_empty(pixel_at(grid, x, y))
}

#[inline]
pub fn in_bounds(grid: &RgbaImage, x: i64, y: i64) -> bool {
    x >= 0 && y >= 0 && x < grid.width() as i64 && y < grid.height() as i64
}

/// Lists every occupied pixel in row-major order (y outer, x inner).
pub fn occupied_points(grid: &RgbaImage) -> Vec<Point> {
    grid.enumerate_pixels()
        .filter(|(_, _, p)| !is_empty(**p))
        .map(|(x, y, _)| (x as i64, y as i64))
        .collect()
}

/// Number of occupied pixels in the grid.
pub fn occupied_len(grid: &RgbaImage) -> usize {
    grid.pixels().filter(|p| !is_empty(**p)).count()
}

/// Allocates a transparent grid of the same size.
pub fn blank_like(grid: &RgbaImage) -> RgbaImage {
    RgbaImage::from_pixel(grid.width(), grid.height(), TRANSPARENT)
}

/// Normalizes a mask: occupied pixels become opaque black, the rest transparent.
pub fn to_binary(grid: &RgbaImage) -> RgbaImage {
    let mut out = blank_like(grid);
    for (src, dst) in grid.pixels().zip(out.pixels_mut()) {
        if !is_empty(*src) {
            *dst = OPAQUE_BLACK;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_and_white_are_empty() {
        assert!(is_empty(Rgba([0, 0, 0, 0])));
        assert!(is_empty(Rgba([12, 200, 7, 0])));
        assert!(is_empty(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_colors_are_occupied() {
        assert!(!is_empty(Rgba([0, 0, 0, 255])));
        assert!(!is_empty(Rgba([255, 255, 254, 255])));
        assert!(!is_empty(Rgba([26, 102, 42, 255])));
        // Translucent white is still ink.
        assert!(!is_empty(Rgba([255, 255, 255, 128])));
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let grid = RgbaImage::from_pixel(3, 3, OPAQUE_BLACK);
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 3), (-1, -1), (3, 3), (i64::MIN, 1), (1, i64::MAX)] {
            assert!(is_empty_at(&grid, x, y), "({}, {}) should read as background", x, y);
            assert_eq!(pixel_at(&grid, x, y), TRANSPARENT);
        }
        assert!(!is_empty_at(&grid, 2, 2));
    }

    #[test]
    fn test_occupied_points_row_major() {
        let mut grid = RgbaImage::from_pixel(4, 3, TRANSPARENT);
        grid.put_pixel(3, 0, OPAQUE_BLACK);
        grid.put_pixel(0, 1, Rgba([10, 20, 30, 255]));
        grid.put_pixel(2, 2, OPAQUE_BLACK);
        grid.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        assert_eq!(occupied_points(&grid), vec![(3, 0), (0, 1), (2, 2)]);
        assert_eq!(occupied_len(&grid), 3);
    }

    #[test]
    fn test_to_binary() {
        let mut grid = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        grid.put_pixel(1, 0, Rgba([90, 90, 90, 255]));
        let bin = to_binary(&grid);
        assert_eq!(*bin.get_pixel(1, 0), OPAQUE_BLACK);
        assert_eq!(*bin.get_pixel(0, 0), TRANSPARENT);
        assert_eq!(occupied_len(&bin), 1);
    }
}
