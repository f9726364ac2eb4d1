//! Integration tests for grid building.
//!
//! Covers:
//! - The Ghana scenario at the default resolution
//! - Lattice dimensions across resolutions
//! - Masking with holes and multi-polygons
//! - Caching grids by fingerprint

use std::sync::Arc;

use grid_interpolation::{build_grid, fingerprint, grid_dimensions, GridCache, IdwOptions};
use overlay_common::{point_in_boundary, GeoBounds, Sample};
use test_utils::fixtures::*;
use test_utils::{assert_approx_eq, constant_samples, scattered_samples};

// ============================================================================
// Ghana scenario
// ============================================================================

#[test]
fn test_single_sample_fills_country() {
    let samples = vec![Sample::new(7.0, -1.0, 30.0)];
    let outline = ghana_outline();
    let grid = build_grid(
        &GHANA_BOUNDS,
        &samples,
        0.1,
        &IdwOptions::default(),
        Some(&outline),
    );

    assert_eq!(grid.rows(), 65);
    assert_eq!(grid.cols(), 45);
    assert_eq!(grid.values().len(), 65 * 45);
    assert_eq!(grid.mask().len(), 65 * 45);
    assert!(grid.inside_count() > 0);
    assert!(grid.inside_count() < grid.len());

    for (value, inside) in grid.values().iter().zip(grid.mask()) {
        if *inside {
            assert_approx_eq!(*value, 30.0, 1e-9);
        }
    }
}

#[test]
fn test_district_samples_stay_within_range() {
    let samples = ghana_district_samples();
    let grid = build_grid(&GHANA_BOUNDS, &samples, 0.1, &IdwOptions::default(), None);

    let (lo, hi) = overlay_common::value_range(&samples).unwrap();
    for &v in grid.values() {
        assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "{} outside [{}, {}]", v, lo, hi);
    }
}

#[test]
fn test_mask_matches_point_in_boundary() {
    let outline = ghana_outline();
    let grid = build_grid(
        &GHANA_BOUNDS,
        &ghana_district_samples(),
        0.25,
        &IdwOptions::default(),
        Some(&outline),
    );
    let meta = grid.metadata();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let (lat, lon) = meta.cell_center(row, col);
            assert_eq!(grid.is_inside(row, col), point_in_boundary(lon, lat, &outline));
        }
    }
}

// ============================================================================
// Dimensions
// ============================================================================

#[test]
fn test_dimensions_cover_bounds() {
    for resolution in [0.05, 0.1, 0.2, 0.25, 0.3, 0.5, 1.0, 2.0] {
        let (rows, cols) = grid_dimensions(&GHANA_BOUNDS, resolution);
        assert_eq!(rows, (GHANA_BOUNDS.height() / resolution).ceil() as usize);
        assert_eq!(cols, (GHANA_BOUNDS.width() / resolution).ceil() as usize);
        assert!(rows as f64 * resolution >= GHANA_BOUNDS.height() - 1e-9);
        assert!(cols as f64 * resolution >= GHANA_BOUNDS.width() - 1e-9);
    }
}

#[test]
fn test_degenerate_bounds_give_empty_grid() {
    let grid = build_grid(
        &DEGENERATE_BOUNDS,
        &constant_samples(&SQUARE_BOUNDS, 4, 1.0),
        0.1,
        &IdwOptions::default(),
        None,
    );
    assert!(grid.is_empty());
    assert!(grid.values().is_empty());
    assert!(grid.mask().is_empty());
}

#[test]
fn test_empty_samples_give_zero_values() {
    let grid = build_grid(&SQUARE_BOUNDS, &[], 1.0, &IdwOptions::default(), None);
    assert_eq!(grid.len(), 100);
    assert!(grid.values().iter().all(|&v| v == 0.0));
}

// ============================================================================
// Masking
// ============================================================================

#[test]
fn test_hole_cells_are_masked_out() {
    let boundary = square_with_hole_boundary();
    let grid = build_grid(
        &SQUARE_BOUNDS,
        &constant_samples(&SQUARE_BOUNDS, 5, 12.0),
        1.0,
        &IdwOptions::default(),
        Some(&boundary),
    );

    // Cell centers at 4.5 and 5.5 fall in the hole: 2x2 cells
    assert_eq!(grid.inside_count(), 100 - 4);
    // Row 4 covers lat 5..6, col 4 covers lon 4..5
    assert!(!grid.is_inside(4, 4));
    assert!(!grid.is_inside(5, 5));
    assert!(grid.is_inside(0, 0));
    assert!(grid.is_inside(3, 4));
}

#[test]
fn test_multipolygon_mask() {
    let boundary = two_island_boundary();
    let grid = build_grid(
        &SQUARE_BOUNDS,
        &scattered_samples(&SQUARE_BOUNDS, 10, 3),
        1.0,
        &IdwOptions::default(),
        Some(&boundary),
    );

    // West strip: 4 columns x 10 rows. North-east island: 3 x 3.
    assert_eq!(grid.inside_count(), 40 + 9);
    assert!(grid.is_inside(9, 0));
    assert!(grid.is_inside(0, 9));
    assert!(!grid.is_inside(5, 5));
    assert!(!grid.is_inside(9, 9));
}

#[test]
fn test_without_boundary_every_cell_is_inside() {
    let grid = build_grid(
        &SQUARE_BOUNDS,
        &scattered_samples(&SQUARE_BOUNDS, 6, 9),
        0.5,
        &IdwOptions::default(),
        None,
    );
    assert_eq!(grid.inside_count(), grid.len());
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_cache_serves_identical_requests() {
    let samples = ghana_district_samples();
    let options = IdwOptions::default();
    let key = fingerprint(&samples, 0.1, options.power);
    let mut cache = GridCache::new(20);
    let mut builds = 0;

    let (first, hit) = cache.get_or_compute(&key, || {
        builds += 1;
        build_grid(&GHANA_BOUNDS, &samples, 0.1, &options, None)
    });
    assert!(!hit);

    let (second, hit) = cache.get_or_compute(&key, || {
        builds += 1;
        build_grid(&GHANA_BOUNDS, &samples, 0.1, &options, None)
    });
    assert!(hit);
    assert_eq!(builds, 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_cache_keeps_most_recent_insertions() {
    let bounds = GeoBounds::new(1.0, 0.0, 1.0, 0.0);
    let mut cache = GridCache::new(20);
    let keys: Vec<String> = (0..35)
        .map(|i| {
            let samples = vec![Sample::new(0.5, 0.5, i as f64)];
            fingerprint(&samples, 0.5, 2.0)
        })
        .collect();

    for key in &keys {
        let grid = build_grid(&bounds, &[], 0.5, &IdwOptions::default(), None);
        cache.insert(key.clone(), Arc::new(grid));
        assert!(cache.len() <= 20);
    }

    let survivors: Vec<&str> = cache.keys().collect();
    let expected: Vec<&str> = keys[15..].iter().map(String::as_str).collect();
    assert_eq!(survivors, expected);
}
