//! Scalar observations located at district centroids.

use serde::{Deserialize, Serialize};

/// A single scalar observation at a geographic location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(lat: f64, lon: f64, value: f64) -> Self {
        Self { lat, lon, value }
    }

    /// Euclidean distance in degree-space.
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        let d_lat = self.lat - lat;
        let d_lon = self.lon - lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt()
    }
}

/// Minimum and maximum sample value, or `None` for an empty set.
pub fn value_range(samples: &[Sample]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), s| (min.min(s.value), max.max(s.value)),
    ))
}
