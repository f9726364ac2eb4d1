//! Worker configuration.

use std::path::PathBuf;

use grid_interpolation::GridConfig;
use overlay_common::{OverlayError, OverlayResult};
use renderer::{ColorScale, DEFAULT_OPACITY};

/// Runtime configuration for the overlay worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Grid building and cache settings
    pub grid: GridConfig,

    /// Overlay opacity in `[0, 1]`
    pub opacity: f64,

    /// Color scale used when rendering
    pub color_scale: ColorScale,

    /// GeoJSON file with the default boundary
    pub boundary_path: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            opacity: DEFAULT_OPACITY,
            color_scale: ColorScale::Temperature,
            boundary_path: None,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            grid: GridConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(val) = lookup("OVERLAY_OPACITY") {
            if let Ok(opacity) = val.parse() {
                config.opacity = opacity;
            }
        }

        if let Some(val) = lookup("OVERLAY_COLOR_SCALE") {
            config.color_scale = ColorScale::from_name(&val);
        }

        if let Some(val) = lookup("OVERLAY_BOUNDARY") {
            if !val.trim().is_empty() {
                config.boundary_path = Some(PathBuf::from(val));
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OverlayResult<()> {
        self.grid.validate()?;

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(OverlayError::invalid_config(
                "opacity",
                format!("must be within [0, 1], got {}", self.opacity),
            ));
        }

        Ok(())
    }
}
