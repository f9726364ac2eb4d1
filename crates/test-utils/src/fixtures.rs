//! Common test fixtures for overlay tests.
//!
//! This module provides pre-defined bounds, boundaries and sample sets that
//! represent common scenarios.

use overlay_common::{BoundaryGeometry, GeoBounds, Ring, Sample};

pub use overlay_common::GHANA_BOUNDS;

/// A 10° square around the origin quadrant: lon/lat in `[0, 10]`.
pub const SQUARE_BOUNDS: GeoBounds = GeoBounds {
    north: 10.0,
    south: 0.0,
    east: 10.0,
    west: 0.0,
};

/// Bounds with no area.
pub const DEGENERATE_BOUNDS: GeoBounds = GeoBounds {
    north: 5.0,
    south: 5.0,
    east: 1.0,
    west: 2.0,
};

/// Closed axis-aligned square ring.
pub fn square_ring(west: f64, south: f64, east: f64, north: f64) -> Ring {
    vec![
        [west, south],
        [east, south],
        [east, north],
        [west, north],
        [west, south],
    ]
}

/// Boundary covering exactly [`SQUARE_BOUNDS`].
pub fn square_boundary() -> Vec<BoundaryGeometry> {
    vec![BoundaryGeometry::polygon(vec![square_ring(0.0, 0.0, 10.0, 10.0)])]
}

/// [`SQUARE_BOUNDS`] with a hole over `[4, 6] × [4, 6]`.
pub fn square_with_hole_boundary() -> Vec<BoundaryGeometry> {
    vec![BoundaryGeometry::polygon(vec![
        square_ring(0.0, 0.0, 10.0, 10.0),
        square_ring(4.0, 4.0, 6.0, 6.0),
    ])]
}

/// Two disjoint squares as a single multi-polygon: west half and a north-east island.
pub fn two_island_boundary() -> Vec<BoundaryGeometry> {
    vec![BoundaryGeometry::multi_polygon(vec![
        vec![square_ring(0.0, 0.0, 4.0, 10.0)],
        vec![square_ring(7.0, 7.0, 10.0, 10.0)],
    ])]
}

/// Coarse outline of Ghana, good enough for containment tests.
pub fn ghana_outline() -> Vec<BoundaryGeometry> {
    vec![BoundaryGeometry::polygon(vec![vec![
        [-3.25, 5.0],
        [-2.0, 4.75],
        [-1.0, 5.0],
        [1.2, 6.1],
        [0.6, 7.0],
        [0.5, 8.5],
        [0.4, 10.0],
        [0.0, 11.1],
        [-1.5, 11.0],
        [-2.8, 11.0],
        [-2.9, 9.5],
        [-2.5, 8.0],
        [-3.25, 6.5],
        [-3.25, 5.0],
    ]])]
}

/// Points known to lie inside [`ghana_outline`] (lon, lat).
pub const GHANA_INSIDE_POINTS: [(f64, f64); 3] = [(-0.19, 5.6), (-1.62, 6.69), (-0.85, 9.4)];

/// Points inside [`GHANA_BOUNDS`] but outside [`ghana_outline`] (lon, lat).
pub const GHANA_OUTSIDE_POINTS: [(f64, f64); 3] = [(1.1, 10.9), (-3.2, 11.1), (1.1, 4.8)];

/// District-centroid style samples across Ghana.
pub fn ghana_district_samples() -> Vec<Sample> {
    vec![
        Sample::new(5.60, -0.19, 27.1),  // Accra
        Sample::new(6.69, -1.62, 26.4),  // Kumasi
        Sample::new(9.40, -0.85, 28.9),  // Tamale
        Sample::new(10.79, -0.85, 29.6), // Bolgatanga
        Sample::new(6.60, 0.47, 26.8),   // Ho
        Sample::new(4.90, -1.76, 26.5),  // Takoradi
        Sample::new(7.34, -2.33, 26.0),  // Sunyani
        Sample::new(10.06, -2.50, 28.7), // Wa
    ]
}
