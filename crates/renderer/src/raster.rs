//! Grid → RGBA8 rasterization.

use grid_interpolation::{Grid, GridMetadata};
use overlay_common::{GeoBounds, OverlayResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::try_parse_color;
use crate::png;

/// Default overlay opacity.
pub const DEFAULT_OPACITY: f64 = 0.8;

/// RGBA8 pixel buffer, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: usize,
    pub height: usize,
    /// `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    /// The four bytes of pixel `(row, col)`.
    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 4]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row * self.width + col) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Encode as PNG, indexed when the palette allows it.
    pub fn to_png(&self) -> OverlayResult<Vec<u8>> {
        png::create_png_auto(&self.data, self.width, self.height)
    }
}

/// Alpha byte for an opacity in `[0, 1]`. Out-of-range opacities are clamped.
pub fn opacity_to_alpha(opacity: f64) -> u8 {
    if opacity.is_nan() {
        return 0;
    }
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Paint `grid` into an RGBA8 buffer of `cols × rows` pixels.
///
/// Cells outside the mask are fully transparent. Every other cell value is
/// clamped into `[min, max]`, handed to `color_fn(value, min, max)`, and the
/// returned CSS color is painted with alpha `round(opacity * 255)`. A color
/// string that does not parse leaves the pixel transparent.
///
/// `min > max` is not rejected; the clamp then pins every value to `min`.
pub fn rasterize<F>(grid: &Grid, min: f64, max: f64, color_fn: F, opacity: f64) -> PixelBuffer
where
    F: Fn(f64, f64, f64) -> String,
{
    let mut buffer = PixelBuffer::new(grid.cols(), grid.rows());
    let alpha = opacity_to_alpha(opacity);

    let cells = grid.values().iter().zip(grid.mask());
    for ((value, inside), px) in cells.zip(buffer.data.chunks_exact_mut(4)) {
        if !*inside {
            continue;
        }

        let clamped = max.min(*value).max(min);
        if let Some(color) = try_parse_color(&color_fn(clamped, min, max)) {
            px.copy_from_slice(&color.with_alpha(alpha).to_bytes());
        }
    }

    buffer
}

/// Where a raster sits on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMetadata {
    pub bounds: GeoBounds,
    pub resolution: f64,
    pub rows: usize,
    pub cols: usize,
    /// `[[south, west], [north, east]]`
    pub corners: [[f64; 2]; 2],
}

impl From<GridMetadata> for OverlayMetadata {
    fn from(meta: GridMetadata) -> Self {
        Self {
            bounds: meta.bounds,
            resolution: meta.resolution,
            rows: meta.rows,
            cols: meta.cols,
            corners: meta.corners(),
        }
    }
}

/// A rasterized grid together with its georeferencing.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOverlay {
    pub pixels: PixelBuffer,
    pub metadata: OverlayMetadata,
}

impl RasterOverlay {
    pub fn to_png(&self) -> OverlayResult<Vec<u8>> {
        self.pixels.to_png()
    }
}

/// Rasterize `grid` and attach its metadata.
pub fn render_overlay<F>(grid: &Grid, min: f64, max: f64, color_fn: F, opacity: f64) -> RasterOverlay
where
    F: Fn(f64, f64, f64) -> String,
{
    let pixels = rasterize(grid, min, max, color_fn, opacity);
    debug!(
        width = pixels.width,
        height = pixels.height,
        min,
        max,
        opacity,
        "Rasterized grid"
    );

    RasterOverlay {
        pixels,
        metadata: grid.metadata().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_interpolation::{build_grid, IdwOptions};
    use overlay_common::Sample;

    fn small_grid() -> Grid {
        let bounds = GeoBounds::new(2.0, 0.0, 3.0, 0.0);
        let samples = vec![Sample::new(1.5, 0.5, 0.0), Sample::new(0.5, 2.5, 10.0)];
        build_grid(&bounds, &samples, 1.0, &IdwOptions::default(), None)
    }

    #[test]
    fn test_opacity_to_alpha() {
        assert_eq!(opacity_to_alpha(0.8), 204);
        assert_eq!(opacity_to_alpha(1.0), 255);
        assert_eq!(opacity_to_alpha(0.0), 0);
        assert_eq!(opacity_to_alpha(1.5), 255);
        assert_eq!(opacity_to_alpha(-0.3), 0);
        assert_eq!(opacity_to_alpha(f64::NAN), 0);
    }

    #[test]
    fn test_buffer_dimensions() {
        let grid = small_grid();
        let buffer = rasterize(&grid, 0.0, 10.0, |_, _, _| "#ffffff".into(), 1.0);
        assert_eq!((buffer.width, buffer.height), (3, 2));
        assert_eq!(buffer.data.len(), 3 * 2 * 4);
        assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(buffer.pixel(2, 0), None);
    }

    #[test]
    fn test_values_are_clamped_before_coloring() {
        let grid = small_grid();
        let buffer = rasterize(
            &grid,
            2.0,
            8.0,
            |v, min, max| {
                assert!(v >= min && v <= max);
                format!("rgb({}, 0, 0)", v as u8)
            },
            1.0,
        );
        // Exact sample hits at the corners clamp to the domain edges
        assert_eq!(buffer.pixel(0, 0), Some([2, 0, 0, 255]));
        assert_eq!(buffer.pixel(1, 2), Some([8, 0, 0, 255]));
    }

    #[test]
    fn test_inverted_domain_does_not_panic() {
        let grid = small_grid();
        let buffer = rasterize(&grid, 8.0, 2.0, |v, _, _| format!("rgb({}, 0, 0)", v as u8), 1.0);
        assert_eq!(buffer.pixel(1, 2), Some([8, 0, 0, 255]));
    }

    #[test]
    fn test_unparseable_color_leaves_pixel_transparent() {
        let grid = small_grid();
        let buffer = rasterize(&grid, 0.0, 10.0, |_, _, _| "not a color".into(), 0.8);
        assert!(buffer.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_overlay_metadata() {
        let grid = small_grid();
        let overlay = render_overlay(&grid, 0.0, 10.0, |_, _, _| "#000000".into(), 0.5);
        assert_eq!(overlay.metadata.rows, 2);
        assert_eq!(overlay.metadata.cols, 3);
        assert_eq!(overlay.metadata.corners, [[0.0, 0.0], [2.0, 3.0]]);
        assert_eq!(overlay.pixels.pixel(0, 1), Some([0, 0, 0, 128]));
    }
}
