use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use walker::route_loader::{DEFAULT_TOLERANCE_DEG, format_json_pairs, write_route_file};
use walker::{RouteLoader, RouteSource};

const PREVIEW_POINTS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "route-convert")]
#[command(about = "Inspect a route file and convert it between GPX, JSON and WALK_PATH lists")]
struct Args {
    /// Route file (.gpx, .json, .py or .txt)
    input: PathBuf,

    /// Output file; the format follows the extension. Prints JSON when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Keep every Nth point
    #[arg(long)]
    stride: Option<usize>,

    /// Duplicate tolerance in degrees
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_DEG)]
    tolerance: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut loader = RouteLoader::new().with_tolerance(args.tolerance);
    if let Some(stride) = args.stride {
        loader = loader.with_stride(stride);
    }

    let source = RouteSource::from_file(&args.input)?;
    let route = loader
        .load(&source)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    info!("Route: {}", source.describe());
    info!("  Points: {}", route.len());
    info!("  Lap (planar): {:.1} m", route.lap_length_m());
    info!("  Lap (great circle): {:.1} m", route.lap_length_haversine_m());
    for (i, p) in route.points().iter().take(PREVIEW_POINTS).enumerate() {
        info!("  {}: ({:.7}, {:.7})", i + 1, p.lat, p.lon);
    }
    if route.len() > PREVIEW_POINTS {
        info!("  ... {} more", route.len() - PREVIEW_POINTS);
    }

    match &args.output {
        Some(output) => {
            write_route_file(output, route.points())
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {} points to {}", route.len(), output.display());
        }
        None => println!("{}", format_json_pairs(route.points())?),
    }

    Ok(())
}
