//! Test data generators for creating synthetic sample sets.
//!
//! These generators create predictable, verifiable sample patterns that can be
//! used across the test suite.

use overlay_common::{GeoBounds, Sample};

/// Creates samples on a regular `n_lat × n_lon` lattice strictly inside `bounds`.
///
/// Sample values are produced by `value_fn(lat, lon)`, which makes it easy to
/// build gradients or constant fields.
///
/// # Example
///
/// ```
/// use test_utils::{sample_lattice, fixtures::SQUARE_BOUNDS};
///
/// let samples = sample_lattice(&SQUARE_BOUNDS, 3, 4, |lat, lon| lat + lon);
/// assert_eq!(samples.len(), 12);
/// ```
pub fn sample_lattice<F>(bounds: &GeoBounds, n_lat: usize, n_lon: usize, value_fn: F) -> Vec<Sample>
where
    F: Fn(f64, f64) -> f64,
{
    let mut samples = Vec::with_capacity(n_lat * n_lon);
    let d_lat = bounds.height() / (n_lat + 1) as f64;
    let d_lon = bounds.width() / (n_lon + 1) as f64;

    for i in 1..=n_lat {
        for j in 1..=n_lon {
            let lat = bounds.south + i as f64 * d_lat;
            let lon = bounds.west + j as f64 * d_lon;
            samples.push(Sample::new(lat, lon, value_fn(lat, lon)));
        }
    }
    samples
}

/// Creates samples whose value grows linearly from south (`low`) to north (`high`).
pub fn latitude_gradient_samples(bounds: &GeoBounds, count: usize, low: f64, high: f64) -> Vec<Sample> {
    let n = count.max(1);
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f64 / (n - 1) as f64 };
            let lat = bounds.south + t * bounds.height();
            let lon = bounds.west + 0.5 * bounds.width();
            Sample::new(lat, lon, low + t * (high - low))
        })
        .collect()
}

/// Creates `count` scattered samples with deterministic pseudo-random positions
/// inside `bounds` and values in `[0, 50)`.
///
/// Uses a simple hash-based approach for reproducibility.
pub fn scattered_samples(bounds: &GeoBounds, count: usize, seed: u32) -> Vec<Sample> {
    (0..count as u32)
        .map(|i| {
            let a = simple_hash(i, 0, seed);
            let b = simple_hash(i, 1, seed);
            let c = simple_hash(i, 2, seed);
            let lat = bounds.south + unit(a) * bounds.height();
            let lon = bounds.west + unit(b) * bounds.width();
            Sample::new(lat, lon, (c % 5000) as f64 / 100.0)
        })
        .collect()
}

/// Creates `count` samples that all carry the same value.
pub fn constant_samples(bounds: &GeoBounds, count: usize, value: f64) -> Vec<Sample> {
    scattered_samples(bounds, count, 7)
        .into_iter()
        .map(|s| Sample::new(s.lat, s.lon, value))
        .collect()
}

fn unit(hash: u32) -> f64 {
    hash as f64 / u32::MAX as f64
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
