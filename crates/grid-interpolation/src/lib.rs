//! Grid interpolation for sparse scalar samples.
//!
//! This crate turns a set of point samples into a regular lattice of values:
//!
//! - [`idw`]: inverse-distance-weighted estimate at a single coordinate
//! - [`grid`]: lattice sampling over a bounding box, masked by a boundary
//! - [`cache`]: request fingerprints and a fixed-capacity FIFO grid cache
//! - [`config`]: defaults and environment overrides
//!
//! # Example
//!
//! ```
//! use grid_interpolation::{build_grid, IdwOptions};
//! use overlay_common::{Sample, GHANA_BOUNDS};
//!
//! let samples = vec![Sample::new(7.0, -1.0, 30.0)];
//! let grid = build_grid(&GHANA_BOUNDS, &samples, 0.1, &IdwOptions::default(), None);
//! assert_eq!((grid.rows(), grid.cols()), (65, 45));
//! ```

pub mod cache;
pub mod config;
pub mod grid;
pub mod idw;

pub use cache::{boundary_fingerprint, fingerprint, CacheStats, GridCache, DEFAULT_CACHE_CAPACITY};
pub use config::GridConfig;
pub use grid::{build_grid, cell_center, grid_dimensions, Grid, GridMetadata, MAX_GRID_CELLS};
pub use idw::{interpolate, IdwOptions, EXACT_MATCH_DISTANCE};
