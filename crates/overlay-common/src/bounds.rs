//! Geographic bounding box in degrees.

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// Default extent of the overlay (Ghana).
pub const GHANA_BOUNDS: GeoBounds = GeoBounds {
    north: 11.2,
    south: 4.74,
    east: 1.2,
    west: -3.3,
};

/// A geographic bounding box, expressed as edges in degrees.
///
/// The same angular units are used for grid resolution, so a bounds/resolution
/// pair fully determines the lattice dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Create new bounds from edge coordinates.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Parse a "west,south,east,north" string (the usual bbox ordering).
    pub fn from_bbox_string(s: &str) -> Result<Self, OverlayError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(OverlayError::InvalidBounds(format!(
                "{}. Expected 'west,south,east,north'",
                s
            )));
        }

        let parse = |p: &str| {
            p.parse::<f64>()
                .map_err(|_| OverlayError::InvalidBounds(format!("invalid number: {}", p)))
        };

        Ok(Self {
            west: parse(parts[0])?,
            south: parse(parts[1])?,
            east: parse(parts[2])?,
            north: parse(parts[3])?,
        })
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Bounds with no area yield an empty lattice.
    pub fn is_degenerate(&self) -> bool {
        !(self.east > self.west && self.north > self.south)
    }

    /// Check if a point is contained within these bounds (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Corner pair `[[south, west], [north, east]]` as expected by image overlays.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        GHANA_BOUNDS
    }
}
