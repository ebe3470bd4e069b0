//! Spur growth: every occupied mask pixel sprouts two short, noise-gated
//! runs of pixels along its boundary normals.
//!
//! Each source point owns an RNG seeded from its coordinates, and spur
//! targets are gathered per point before any write. Output is therefore
//! identical for any thread count or iteration order.

mod config;
mod direction;

pub use config::GrowthConfig;
pub use direction::{
    derive_directions, derive_tangent, summarize_directions, DirectionSummary, Directions,
};

use glam::DVec2;
use image::RgbaImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::grid::{
    find_neighbors, in_bounds, is_empty, occupied_points, to_binary, Point, OPAQUE_BLACK,
};
use crate::noise::NoiseField;

/// Derives the RNG seed for a source point.
fn point_seed(seed: u64, point: Point) -> u64 {
    let (x, y) = point;
    seed ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Draws a spur length from `[min_spur, max_spur)`; an empty range gives 0.
fn draw_length(rng: &mut ChaCha8Rng, config: &GrowthConfig) -> u32 {
    if config.max_spur > config.min_spur {
        rng.random_range(config.min_spur..config.max_spur)
    } else {
        0
    }
}

/// Pixels marked by one spur of length `len` along `normal`.
fn spur_targets(
    origin: Point,
    normal: DVec2,
    len: u32,
    grid: &RgbaImage,
    noise: &NoiseField,
    config: &GrowthConfig,
    out: &mut Vec<(u32, u32)>,
) {
    let base = DVec2::new(origin.0 as f64, origin.1 as f64);
    for step in 0..len {
        let pos = (base + normal * step as f64).floor();
        let (cx, cy) = (pos.x as i64, pos.y as i64);

        if config.noise_gating {
            let level = noise.sample(cx, cy) as f32;
            if level >= config.gate_threshold(step, len) {
                continue;
            }
        }

        if in_bounds(grid, cx, cy) {
            out.push((cx as u32, cy as u32));
        }
    }
}

/// Every pixel the two spurs of `point` will mark.
fn point_targets(
    point: Point,
    mask: &RgbaImage,
    noise: &NoiseField,
    config: &GrowthConfig,
) -> Vec<(u32, u32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(point_seed(config.seed, point));
    let lengths = [draw_length(&mut rng, config), draw_length(&mut rng, config)];

    let neighbors = find_neighbors(point, mask);
    let mut out = Vec::new();
    if let Some(dirs) = derive_directions(point, &neighbors) {
        for (normal, len) in dirs.normals.into_iter().zip(lengths) {
            spur_targets(point, normal, len, mask, noise, config, &mut out);
        }
    }
    out
}

/// Sets every target to opaque black and returns how many pixels were
/// previously empty. Repeated targets are counted once.
fn mark_targets(grid: &mut RgbaImage, targets: impl IntoIterator<Item = (u32, u32)>) -> usize {
    let mut marked = 0;
    for (x, y) in targets {
        let px = grid.get_pixel_mut(x, y);
        if is_empty(*px) {
            marked += 1;
        }
        *px = OPAQUE_BLACK;
    }
    marked
}

/// Grows spurs out of `mask` and returns a new binary grid.
///
/// The result starts as the mask's occupied set (opaque black on
/// transparent) plus every spur pixel that passed the growth gate. The
/// input is never modified.
pub fn grow_spurs(mask: &RgbaImage, noise: &NoiseField, config: &GrowthConfig) -> RgbaImage {
    let mut grown = to_binary(mask);
    if config.is_noop() {
        tracing::debug!("spur range [{}, {}) is empty, growth skipped", config.min_spur, config.max_spur);
        return grown;
    }

    let sources = occupied_points(mask);
    let targets: Vec<Vec<(u32, u32)>> = sources
        .par_iter()
        .map(|&p| point_targets(p, mask, noise, config))
        .collect();

    let marked = mark_targets(&mut grown, targets.into_iter().flatten());

    tracing::debug!(sources = sources.len(), marked, "spur growth finished");
    grown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{occupied_len, TRANSPARENT};
    use crate::noise::NoiseFieldConfig;

    fn sample_mask() -> RgbaImage {
        let mut mask = RgbaImage::from_pixel(48, 48, TRANSPARENT);
        for x in 10..38 {
            mask.put_pixel(x, 24, OPAQUE_BLACK);
        }
        mask.put_pixel(5, 5, OPAQUE_BLACK);
        mask
    }

    fn occupied_subset(a: &RgbaImage, b: &RgbaImage) -> bool {
        a.pixels()
            .zip(b.pixels())
            .all(|(pa, pb)| crate::grid::is_empty(*pa) || !crate::grid::is_empty(*pb))
    }

    #[test]
    fn test_empty_range_adds_nothing() {
        let mask = sample_mask();
        let noise = NoiseField::constant(48, 48, 0);
        for (min, max) in [(0, 0), (0, 1), (7, 7), (9, 3)] {
            let config = GrowthConfig {
                min_spur: min,
                max_spur: max,
                ..Default::default()
            };
            let grown = grow_spurs(&mask, &noise, &config);
            assert_eq!(grown, to_binary(&mask), "range [{}, {}) must be a no-op", min, max);
        }
    }

    #[test]
    fn test_mask_is_preserved() {
        let mask = sample_mask();
        let noise = NoiseField::generate(48, 48, &NoiseFieldConfig::default());
        let grown = grow_spurs(&mask, &noise, &GrowthConfig::with_seed(4));
        assert!(occupied_subset(&mask, &grown));
    }

    #[test]
    fn test_closed_gate_blocks_growth() {
        let mask = sample_mask();
        let noise = NoiseField::constant(48, 48, 255);
        let grown = grow_spurs(&mask, &noise, &GrowthConfig::with_seed(1));
        assert_eq!(occupied_len(&grown), occupied_len(&mask));
    }

    #[test]
    fn test_open_gate_grows_perpendicular_spurs() {
        let mut mask = RgbaImage::from_pixel(9, 30, TRANSPARENT);
        mask.put_pixel(4, 15, OPAQUE_BLACK);
        let noise = NoiseField::constant(9, 30, 0);
        let config = GrowthConfig {
            min_spur: 6,
            max_spur: 7,
            ..Default::default()
        };

        // Isolated point: tangent (0, 1), normals (1, 0) and (-1, 0).
        let grown = grow_spurs(&mask, &noise, &config);
        let row: Vec<bool> = (0..9)
            .map(|x| !crate::grid::is_empty(*grown.get_pixel(x, 15)))
            .collect();
        assert_eq!(row, vec![true; 9]);
        assert_eq!(occupied_len(&grown), 9, "spurs off the grid edge are skipped");
    }

    #[test]
    fn test_gate_ramp_lets_tips_through() {
        let mut mask = RgbaImage::from_pixel(40, 3, TRANSPARENT);
        mask.put_pixel(0, 1, OPAQUE_BLACK);
        mask.put_pixel(1, 1, OPAQUE_BLACK);
        // Level 180 blocks steps below the 177 threshold reached at half length.
        let noise = NoiseField::constant(40, 3, 180);
        let config = GrowthConfig {
            min_spur: 10,
            max_spur: 11,
            ..Default::default()
        };
        let grown = grow_spurs(&mask, &noise, &config);
        // (1,1) has one neighbor (0,1): tangent (1,0), normals (0,-1), (0,1).
        // Steps 0..=5 are gated off, steps 6.. land outside the 3-row grid.
        assert_eq!(occupied_len(&grown), 2);
    }

    #[test]
    fn test_classic_growth_is_ungated() {
        let mask = sample_mask();
        let noise = NoiseField::constant(48, 48, 255);
        let grown = grow_spurs(&mask, &noise, &GrowthConfig::classic(2));
        assert!(occupied_len(&grown) > occupied_len(&mask));
    }

    #[test]
    fn test_reproducible() {
        let mask = sample_mask();
        let noise = NoiseField::generate(48, 48, &NoiseFieldConfig::default());
        let config = GrowthConfig::with_seed(99);
        assert_eq!(grow_spurs(&mask, &noise, &config), grow_spurs(&mask, &noise, &config));
    }

    #[test]
    fn test_thread_count_does_not_matter() {
        let mask = sample_mask();
        let noise = NoiseField::generate(48, 48, &NoiseFieldConfig::default());
        let config = GrowthConfig::with_seed(5);

        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let many = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let a = single.install(|| grow_spurs(&mask, &noise, &config));
        let b = many.install(|| grow_spurs(&mask, &noise, &config));
        assert_eq!(a, b);
    }

    #[test]
    fn test_mark_targets_counts_new_pixels_once() {
        let mut grid = RgbaImage::from_pixel(4, 4, TRANSPARENT);
        grid.put_pixel(0, 0, OPAQUE_BLACK);
        let marked = mark_targets(&mut grid, [(0, 0), (1, 1), (1, 1), (2, 3)]);
        assert_eq!(marked, 2);
        assert_eq!(occupied_len(&grid), 3);
    }

    #[test]
    fn test_point_seed_differs_by_coordinate() {
        assert_ne!(point_seed(1, (0, 1)), point_seed(1, (1, 0)));
        assert_ne!(point_seed(1, (3, 3)), point_seed(2, (3, 3)));
    }
}
