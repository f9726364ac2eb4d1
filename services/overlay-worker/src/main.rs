//! Overlay worker.
//!
//! Renders IDW overlays from sample files, or serves the grid worker protocol
//! as newline-delimited JSON over stdin/stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use overlay_common::GeoBounds;
use renderer::ColorScale;
use tokio::io::BufReader;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overlay_worker::render::load_boundary;
use overlay_worker::{render, serve, GridWorker, RenderOptions, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "overlay-worker")]
#[command(about = "Interpolated map overlays from district samples")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", env = "OVERLAY_LOG_LEVEL")]
    log_level: String,

    /// Bounding box as west,south,east,north
    #[arg(long, global = true, allow_hyphen_values = true)]
    bounds: Option<String>,

    /// Grid resolution in degrees
    #[arg(long, global = true)]
    resolution: Option<f64>,

    /// IDW power parameter
    #[arg(long, global = true)]
    power: Option<f64>,

    /// GeoJSON boundary file
    #[arg(long, global = true)]
    boundary: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one overlay to PNG plus metadata JSON
    Render(RenderArgs),
    /// Answer compute requests read from stdin, one JSON message per line
    Serve,
}

#[derive(ClapArgs, Debug)]
struct RenderArgs {
    /// JSON array of {lat, lon, value} samples
    #[arg(long)]
    samples: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Metadata JSON path (defaults to the output path with .json)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Color scale (temperature, precipitation, hot_days, dry_days, diverging)
    #[arg(long)]
    scale: Option<String>,

    /// Overlay opacity in [0, 1]
    #[arg(long)]
    opacity: Option<f64>,

    /// Color domain minimum
    #[arg(long, allow_hyphen_values = true)]
    min: Option<f64>,

    /// Color domain maximum
    #[arg(long, allow_hyphen_values = true)]
    max: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr so `serve` keeps stdout for protocol messages
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = WorkerConfig::from_env();
    if let Some(bounds) = &args.bounds {
        config.grid.bounds = GeoBounds::from_bbox_string(bounds)?;
    }
    if let Some(resolution) = args.resolution {
        config.grid.resolution = resolution;
    }
    if let Some(power) = args.power {
        config.grid.idw.power = power;
    }
    if let Some(boundary) = args.boundary {
        config.boundary_path = Some(boundary);
    }

    match args.command {
        Command::Render(render_args) => {
            if let Some(scale) = &render_args.scale {
                config.color_scale = ColorScale::from_name(scale);
            }
            if let Some(opacity) = render_args.opacity {
                config.opacity = opacity;
            }

            let options = RenderOptions {
                samples_path: render_args.samples,
                boundary_path: None,
                output: render_args.output,
                metadata_path: render_args.metadata,
                min: render_args.min,
                max: render_args.max,
            };

            let summary = render(&config, &options)
                .await
                .context("Failed to render overlay")?;
            info!(
                rows = summary.metadata.rows,
                cols = summary.metadata.cols,
                inside_cells = summary.inside_cells,
                "Render complete"
            );
        }
        Command::Serve => {
            config.validate()?;

            let boundary = match &config.boundary_path {
                Some(path) => Some(load_boundary(path).await?),
                None => None,
            };
            info!(
                resolution = config.grid.resolution,
                cache_capacity = config.grid.cache_capacity,
                has_boundary = boundary.is_some(),
                "Serving grid worker on stdin/stdout"
            );

            let worker = GridWorker::new(&config.grid, boundary);
            let stdin = BufReader::new(tokio::io::stdin());
            let (_, stats) = serve(stdin, tokio::io::stdout(), worker).await?;
            info!(responses = stats.responses, "Serve finished");
        }
    }

    Ok(())
}
