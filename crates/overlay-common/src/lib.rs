//! Common types and utilities shared across the overlay crates and services.

pub mod boundary;
pub mod bounds;
pub mod error;
pub mod sample;

pub use boundary::{
    boundary_from_geojson, point_in_boundary, BoundaryGeometry, Polygon, PreparedBoundary, Ring,
};
pub use bounds::{GeoBounds, GHANA_BOUNDS};
pub use error::{OverlayError, OverlayResult};
pub use sample::{value_range, Sample};
