//! Tangent and normal derivation at a boundary point.

use glam::DVec2;
use image::RgbaImage;

use crate::grid::{find_neighbors, occupied_points, NeighborSet, Point};

/// Local boundary direction at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directions {
    /// Unnormalized tangent.
    pub tangent: DVec2,
    /// Unit normals: tangent rotated by -90 and +90 degrees.
    pub normals: [DVec2; 2],
}

/// Raw tangent at `point` from its occupied neighbors.
///
/// Isolated points use `(0, 1)`. A single neighbor points away from it.
/// Otherwise the tangent runs from the last neighbor in scan order to the
/// first, which is deliberately sensitive to scan order.
pub fn derive_tangent(point: Point, neighbors: &NeighborSet) -> DVec2 {
    let (px, py) = point;
    match (neighbors.len(), neighbors.first(), neighbors.last()) {
        (1, Some((nx, ny)), _) => DVec2::new((px - nx) as f64, (py - ny) as f64),
        (_, Some((fx, fy)), Some((lx, ly))) => DVec2::new((fx - lx) as f64, (fy - ly) as f64),
        _ => DVec2::new(0.0, 1.0),
    }
}

/// Tangent and unit normals at `point`, or `None` for a zero-length tangent.
pub fn derive_directions(point: Point, neighbors: &NeighborSet) -> Option<Directions> {
    let tangent = derive_tangent(point, neighbors);
    let length = tangent.length();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let normals = [
        DVec2::new(tangent.y, -tangent.x) / length,
        DVec2::new(-tangent.y, tangent.x) / length,
    ];
    Some(Directions { tangent, normals })
}

/// Counts of source points by direction outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionSummary {
    /// Occupied pixels in the mask.
    pub sources: usize,
    /// Sources with no occupied neighbor (fallback tangent).
    pub isolated: usize,
    /// Sources whose tangent has zero length; they grow nothing.
    pub degenerate: usize,
}

/// Classifies every occupied point of `mask` by its direction outcome.
pub fn summarize_directions(mask: &RgbaImage) -> DirectionSummary {
    let mut summary = DirectionSummary::default();
    for point in occupied_points(mask) {
        let neighbors = find_neighbors(point, mask);
        summary.sources += 1;
        if neighbors.is_empty() {
            summary.isolated += 1;
        }
        if derive_directions(point, &neighbors).is_none() {
            summary.degenerate += 1;
        }
    }
    summary
}
