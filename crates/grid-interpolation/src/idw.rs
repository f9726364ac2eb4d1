//! Inverse Distance Weighting (IDW) estimate at a single coordinate.
//!
//! ```text
//! z(lat, lon) = Σ(wi * zi) / Σ(wi)
//! where wi = 1 / d(lat, lon, lat_i, lon_i)^p
//! ```
//!
//! Distances are Euclidean in degree-space. At country scale the error against
//! a geodesic distance is small and the weights only care about ratios.

use overlay_common::Sample;
use serde::{Deserialize, Serialize};

/// Samples closer than this (degrees) are returned verbatim.
pub const EXACT_MATCH_DISTANCE: f64 = 1e-4;

/// Parameters for IDW interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdwOptions {
    /// Power parameter. Higher values give more weight to nearby samples.
    pub power: f64,
    /// Search radius in degrees. `None` uses every sample.
    pub max_distance: Option<f64>,
    /// Minimum number of samples inside the radius. When fewer are found the
    /// radius is dropped and every sample contributes.
    pub min_points: usize,
}

impl Default for IdwOptions {
    fn default() -> Self {
        Self {
            power: 2.0,
            max_distance: Some(10.0),
            min_points: 1,
        }
    }
}

impl IdwOptions {
    /// Default options with a different power.
    pub fn with_power(power: f64) -> Self {
        Self {
            power,
            ..Self::default()
        }
    }
}

/// Interpolate a value at `(target_lat, target_lon)`.
///
/// Total over its inputs: an empty sample set, or one where every weight
/// underflows to zero, yields `0.0`.
pub fn interpolate(target_lat: f64, target_lon: f64, samples: &[Sample], options: &IdwOptions) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut used_points = 0usize;

    for sample in samples {
        let d = sample.distance_to(target_lat, target_lon);

        if d < EXACT_MATCH_DISTANCE {
            return sample.value;
        }

        if let Some(max_distance) = options.max_distance {
            if d > max_distance {
                continue;
            }
        }

        let weight = 1.0 / d.powf(options.power);
        weighted_sum += weight * sample.value;
        weight_sum += weight;
        used_points += 1;
    }

    // Not enough neighbours within the radius: fall back to every sample.
    if used_points < options.min_points {
        weighted_sum = 0.0;
        weight_sum = 0.0;

        for sample in samples {
            let d = sample.distance_to(target_lat, target_lon);
            let weight = 1.0 / d.powf(options.power);
            weighted_sum += weight * sample.value;
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    }
}
