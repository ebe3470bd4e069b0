//! 8-neighborhood (Moore) lookup on a planar pixel grid.
//!
//! Offsets are visited column by column: `dx` in the outer loop, `dy` in the
//! inner loop, both running -1, 0, +1. Direction derivation depends on this
//! order, so it must not change.

use image::RgbaImage;

use super::{is_empty_at, Point};

/// The eight neighbor offsets `(dx, dy)` in scan order, center excluded.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Occupied neighbors of a point, in scan order. Holds at most eight entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborSet {
    points: [Point; 8],
    len: u8,
}

impl NeighborSet {
    fn push(&mut self, p: Point) {
        self.points[self.len as usize] = p;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<Point> {
        self.as_slice().first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.as_slice().last().copied()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.as_slice().iter()
    }
}

/// Collects the occupied 8-neighbors of `point`.
///
/// Offsets that fall outside the grid read as background and are never
/// returned.
pub fn find_neighbors(point: Point, grid: &RgbaImage) -> NeighborSet {
    let (x, y) = point;
    let mut set = NeighborSet::default();
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let (nx, ny) = (x + dx, y + dy);
        if !is_empty_at(grid, nx, ny) {
            set.push((nx, ny));
        }
    }
    set
}

/// Number of occupied 8-neighbors of `point`, without building the set.
#[inline]
pub fn occupied_count(point: Point, grid: &RgbaImage) -> u8 {
    let (x, y) = point;
    NEIGHBOR_OFFSETS
        .iter()
        .filter(|(dx, dy)| !is_empty_at(grid, x + dx, y + dy))
        .count() as u8
}
