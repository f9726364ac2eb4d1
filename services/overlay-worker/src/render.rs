//! One-shot rendering: samples and boundary files in, PNG and metadata out.

use std::path::{Path, PathBuf};

use overlay_common::{
    boundary_from_geojson, value_range, BoundaryGeometry, OverlayError, OverlayResult, Sample,
};
use renderer::{legend_stops, render_overlay, ColorScale, LegendStop, OverlayMetadata};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WorkerConfig;
use crate::submitter::GridSubmitter;
use crate::worker::GridWorker;

/// Number of intervals in the written legend.
const LEGEND_STEPS: usize = 5;

/// Inputs and outputs of a render run.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// JSON array of `{lat, lon, value}` objects
    pub samples_path: PathBuf,
    /// GeoJSON boundary; falls back to the configured one
    pub boundary_path: Option<PathBuf>,
    /// PNG destination
    pub output: PathBuf,
    /// Metadata destination; defaults to the PNG path with a `.json` extension
    pub metadata_path: Option<PathBuf>,
    /// Color domain minimum; defaults to the smallest sample value
    pub min: Option<f64>,
    /// Color domain maximum; defaults to the largest sample value
    pub max: Option<f64>,
}

/// What a render run wrote, also stored as the metadata JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    #[serde(flatten)]
    pub metadata: OverlayMetadata,
    pub min: f64,
    pub max: f64,
    pub scale: ColorScale,
    pub opacity: f64,
    pub sample_count: usize,
    pub inside_cells: usize,
    pub legend: Vec<LegendStop>,
}

/// Read a JSON array of samples.
pub async fn load_samples(path: &Path) -> OverlayResult<Vec<Sample>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OverlayError::InputError(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

/// Read boundary geometries from a GeoJSON file.
pub async fn load_boundary(path: &Path) -> OverlayResult<Vec<BoundaryGeometry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OverlayError::InputError(format!("{}: {}", path.display(), e)))?;
    boundary_from_geojson(&text)
}

/// Compute, rasterize and write one overlay.
pub async fn render(config: &WorkerConfig, options: &RenderOptions) -> OverlayResult<RenderSummary> {
    config.validate()?;

    let samples = load_samples(&options.samples_path).await?;
    let Some((lo, hi)) = value_range(&samples) else {
        return Err(OverlayError::InputError(format!(
            "{}: no samples to render",
            options.samples_path.display()
        )));
    };
    let min = options.min.unwrap_or(lo);
    let max = options.max.unwrap_or(hi);

    let boundary = match options.boundary_path.as_ref().or(config.boundary_path.as_ref()) {
        Some(path) => Some(load_boundary(path).await?),
        None => None,
    };

    let sample_count = samples.len();
    let (mut submitter, task) = GridSubmitter::connect(GridWorker::new(&config.grid, boundary));
    submitter.submit(samples, config.grid.resolution, config.grid.idw.power)?;
    let grid = submitter.next_accepted().await?;
    drop(submitter);
    task.await
        .map_err(|e| OverlayError::InternalError(format!("worker task failed: {}", e)))?;

    let scale = config.color_scale;
    let overlay = render_overlay(
        &grid,
        min,
        max,
        |v, lo, hi| scale.color(v, lo, hi),
        config.opacity,
    );
    let png = overlay.to_png()?;
    tokio::fs::write(&options.output, &png).await?;

    let summary = RenderSummary {
        metadata: overlay.metadata,
        min,
        max,
        scale,
        opacity: config.opacity,
        sample_count,
        inside_cells: grid.inside_count(),
        legend: legend_stops(min, max, scale, LEGEND_STEPS),
    };

    let metadata_path = options
        .metadata_path
        .clone()
        .unwrap_or_else(|| options.output.with_extension("json"));
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| OverlayError::EncodeError(e.to_string()))?;
    tokio::fs::write(&metadata_path, json).await?;

    info!(
        output = %options.output.display(),
        metadata = %metadata_path.display(),
        rows = summary.metadata.rows,
        cols = summary.metadata.cols,
        png_bytes = png.len(),
        "Wrote overlay"
    );

    Ok(summary)
}
