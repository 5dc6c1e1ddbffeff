//! Compare generated accelerometer data with real recordings.
//!
//! Run with:
//! ```
//! cargo run -p sensor-data --bin sensor-compare -- --samples real_sensor
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

use sensor_data::format;
use sensor_data::generator::{DEFAULT_AVG_SPEED_MPS, SignalGenerator};
use sensor_data::stats::compare;

#[derive(Parser, Debug)]
#[command(name = "sensor-compare")]
#[command(about = "Compare generated sensor data against real recordings", long_about = None)]
struct Args {
    /// Directory of recorded .txt sensor files
    #[arg(long, default_value = "real_sensor")]
    samples: PathBuf,

    /// Number of recordings to draw at random and concatenate
    #[arg(long, default_value_t = 3)]
    count: usize,

    /// Average speed passed to the generator in m/s
    #[arg(long, default_value_t = DEFAULT_AVG_SPEED_MPS)]
    speed: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&args.samples)
        .with_context(|| format!("Cannot read {}", args.samples.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "txt") {
            files.push(path);
        }
    }
    if files.is_empty() {
        bail!("No .txt recordings in {}", args.samples.display());
    }

    let mut rng = rand::thread_rng();
    let chosen: Vec<_> = files.choose_multiple(&mut rng, args.count).collect();

    tracing::info!("Loaded {} recordings:", chosen.len());
    let mut real = Vec::new();
    for path in chosen {
        let samples = format::read_file(path)?;
        tracing::info!("  - {} ({} samples)", path.display(), samples.len());
        real.extend(samples);
    }

    let generator = SignalGenerator::new();
    let duration = real.len() as f64 / generator.config().sampling_rate_hz;
    let generated = generator.generate_with(duration, args.speed, &mut rng)?;

    let cmp = compare(&generated.samples, &real)?;
    tracing::info!("Real data:\n{}", cmp.real);
    tracing::info!("Generated data:\n{}", cmp.generated);
    tracing::info!("Mean difference:  {:.2}%", cmp.mean_diff_pct);
    tracing::info!("Stdev difference: {:.2}%", cmp.stdev_diff_pct);
    tracing::info!("Verdict: {}", cmp.similarity);

    Ok(())
}
