//! Image rendering for interpolated overlays.
//!
//! - [`raster`]: grid → RGBA8 pixel buffer, masked by the boundary
//! - [`color`]: RGBA colors and CSS color-string parsing
//! - [`scales`]: built-in climate color scales and legend stops
//! - [`png`]: indexed / RGBA PNG encoding

pub mod color;
pub mod png;
pub mod raster;
pub mod scales;

pub use color::{parse_color, try_parse_color, Color};
pub use raster::{
    opacity_to_alpha, rasterize, render_overlay, OverlayMetadata, PixelBuffer, RasterOverlay,
    DEFAULT_OPACITY,
};
pub use scales::{legend_stops, ColorScale, LegendStop};
