//! Configuration for grid building.

use overlay_common::{GeoBounds, OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::idw::IdwOptions;

/// Configuration for grid building and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Area covered by every grid.
    pub bounds: GeoBounds,

    /// Cell size in degrees.
    pub resolution: f64,

    /// IDW parameters.
    pub idw: IdwOptions,

    /// Number of grids kept in the FIFO cache.
    pub cache_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::default(),
            resolution: 0.1,
            idw: IdwOptions::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("OVERLAY_BOUNDS") {
            if let Ok(bounds) = GeoBounds::from_bbox_string(&val) {
                config.bounds = bounds;
            }
        }

        if let Some(val) = lookup("OVERLAY_RESOLUTION") {
            if let Ok(resolution) = val.parse() {
                config.resolution = resolution;
            }
        }

        if let Some(val) = lookup("OVERLAY_IDW_POWER") {
            if let Ok(power) = val.parse() {
                config.idw.power = power;
            }
        }

        if let Some(val) = lookup("OVERLAY_IDW_MAX_DISTANCE") {
            match val.to_lowercase().as_str() {
                "none" | "off" => config.idw.max_distance = None,
                other => {
                    if let Ok(distance) = other.parse() {
                        config.idw.max_distance = Some(distance);
                    }
                }
            }
        }

        if let Some(val) = lookup("OVERLAY_IDW_MIN_POINTS") {
            if let Ok(points) = val.parse() {
                config.idw.min_points = points;
            }
        }

        if let Some(val) = lookup("OVERLAY_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.cache_capacity = capacity;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.bounds.is_degenerate() {
            return Err(OverlayError::InvalidBounds(format!(
                "north must exceed south and east must exceed west: {:?}",
                self.bounds
            )));
        }

        if !(self.resolution > 0.0 && self.resolution.is_finite()) {
            return Err(OverlayError::invalid_config(
                "resolution",
                "must be a positive number",
            ));
        }

        if !(self.idw.power > 0.0 && self.idw.power.is_finite()) {
            return Err(OverlayError::invalid_config("power", "must be a positive number"));
        }

        if let Some(distance) = self.idw.max_distance {
            if !(distance > 0.0) {
                return Err(OverlayError::invalid_config(
                    "max_distance",
                    "must be positive when set",
                ));
            }
        }

        if self.cache_capacity == 0 {
            return Err(OverlayError::invalid_config("cache_capacity", "must be > 0"));
        }

        Ok(())
    }
}
