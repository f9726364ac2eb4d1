//! Regular lattice of interpolated values over a bounding box.

use std::time::Instant;

use overlay_common::{BoundaryGeometry, GeoBounds, PreparedBoundary, Sample};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::idw::{interpolate, IdwOptions};

/// Georeferencing information for a grid or a raster derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMetadata {
    pub bounds: GeoBounds,
    pub resolution: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridMetadata {
    /// Corner pair `[[south, west], [north, east]]` of the overlay image.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        self.bounds.corners()
    }

    /// Center of cell `(row, col)` as `(lat, lon)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        cell_center(&self.bounds, self.resolution, row, col)
    }
}

/// Interpolated values and boundary mask, both row-major from the north-west corner.
///
/// Grids are only produced whole by [`build_grid`]; there is no way to observe
/// one with some cells still missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    values: Vec<f64>,
    mask: Vec<bool>,
    bounds: GeoBounds,
    resolution: f64,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// A grid with no cells.
    pub fn empty(bounds: GeoBounds, resolution: f64) -> Self {
        Self {
            values: Vec::new(),
            mask: Vec::new(),
            bounds,
            resolution,
            rows: 0,
            cols: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Containment mask in row-major order.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Value of cell `(row, col)`, or `None` outside the grid.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    /// Whether cell `(row, col)` lies inside the boundary. False outside the grid.
    pub fn is_inside(&self, row: usize, col: usize) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.mask.get(row * self.cols + col).copied().unwrap_or(false)
    }

    /// One row of values.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.values.get(start..start + self.cols)
    }

    /// Number of cells inside the boundary.
    pub fn inside_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Minimum and maximum over cells inside the boundary.
    pub fn inside_value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .zip(&self.mask)
            .filter(|(_, inside)| **inside)
            .map(|(&v, _)| v)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn metadata(&self) -> GridMetadata {
        GridMetadata {
            bounds: self.bounds,
            resolution: self.resolution,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

/// Largest lattice `build_grid` will allocate (a 4096 x 4096 grid).
pub const MAX_GRID_CELLS: usize = 4096 * 4096;

/// Lattice dimensions `(rows, cols)` for `bounds` at `resolution`.
///
/// Degenerate bounds, non-positive or non-finite resolutions and lattices
/// larger than [`MAX_GRID_CELLS`] give `(0, 0)`.
pub fn grid_dimensions(bounds: &GeoBounds, resolution: f64) -> (usize, usize) {
    let finite = [bounds.north, bounds.south, bounds.east, bounds.west]
        .iter()
        .all(|v| v.is_finite());
    if !finite || bounds.is_degenerate() || !(resolution > 0.0 && resolution.is_finite()) {
        return (0, 0);
    }

    let cols = (bounds.width() / resolution).ceil();
    let rows = (bounds.height() / resolution).ceil();
    if !(cols.is_finite() && rows.is_finite()) {
        return (0, 0);
    }

    let (rows, cols) = (rows as usize, cols as usize);
    match rows.checked_mul(cols) {
        Some(cells) if cells <= MAX_GRID_CELLS => (rows, cols),
        _ => (0, 0),
    }
}

/// Center of cell `(row, col)` as `(lat, lon)`.
pub fn cell_center(bounds: &GeoBounds, resolution: f64, row: usize, col: usize) -> (f64, f64) {
    let lat = bounds.north - row as f64 * resolution - resolution / 2.0;
    let lon = bounds.west + col as f64 * resolution + resolution / 2.0;
    (lat, lon)
}

/// Interpolate `samples` over the lattice spanning `bounds`.
///
/// Cells are visited north to south, west to east. Each cell value is the IDW
/// estimate at the cell center; the mask records whether the center lies
/// inside `boundary` (every cell is inside when no boundary is given).
pub fn build_grid(
    bounds: &GeoBounds,
    samples: &[Sample],
    resolution: f64,
    options: &IdwOptions,
    boundary: Option<&[BoundaryGeometry]>,
) -> Grid {
    let start = Instant::now();
    let (rows, cols) = grid_dimensions(bounds, resolution);
    if rows == 0 || cols == 0 {
        debug!(?bounds, resolution, "Degenerate lattice, returning empty grid");
        return Grid::empty(*bounds, resolution);
    }

    let prepared = boundary.map(PreparedBoundary::new);
    let mut values = Vec::with_capacity(rows * cols);
    let mut mask = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        for col in 0..cols {
            let (lat, lon) = cell_center(bounds, resolution, row, col);
            values.push(interpolate(lat, lon, samples, options));
            mask.push(match &prepared {
                Some(boundary) => boundary.contains(lon, lat),
                None => true,
            });
        }
    }

    let grid = Grid {
        values,
        mask,
        bounds: *bounds,
        resolution,
        rows,
        cols,
    };

    debug!(
        rows,
        cols,
        samples = samples.len(),
        inside = grid.inside_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Built interpolated grid"
    );

    grid
}
