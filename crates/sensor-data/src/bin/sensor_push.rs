//! Generate accelerometer data for a finished walk and upload it to the
//! emulator, replacing the app's recording.
//!
//! Run with:
//! ```
//! cargo run -p sensor-data --bin sensor-push -- --duration 1143 --speed 2.8
//! ```

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sensor_data::device::{self, SensorFile};
use sensor_data::format::LocalSignalFile;
use sensor_data::generator::{DEFAULT_AVG_SPEED_MPS, DEFAULT_DURATION_SECS, SignalGenerator};
use sensor_data::stats::SignalStats;
use walker::ConfigStore;
use walker::emulator::Adb;

/// Files shown in the selection list.
const SHOWN_FILES: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "sensor-push")]
#[command(about = "Generate accelerometer data and push it to the emulator", long_about = None)]
struct Args {
    /// Path to config.json
    #[arg(long, env = "WALKER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Run duration in seconds
    #[arg(long, default_value_t = DEFAULT_DURATION_SECS)]
    duration: f64,

    /// Average speed in m/s
    #[arg(long, default_value_t = DEFAULT_AVG_SPEED_MPS)]
    speed: f64,

    /// File to replace, 1 = most recently modified. Prompts when omitted.
    #[arg(long)]
    index: Option<usize>,

    /// Upload under a new random name instead of replacing a recording
    #[arg(long, default_value_t = false)]
    new: bool,

    /// Keep the generated file in the working directory
    #[arg(long, default_value_t = false)]
    keep_local: bool,
}

async fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().to_string())
}

async fn choose_target(args: &Args, files: &[SensorFile]) -> anyhow::Result<String> {
    if args.new {
        return Ok(device::new_sensor_file_name());
    }

    if files.is_empty() {
        tracing::warn!("No sensor files on the device; start a run in the app first");
        let answer = prompt("Create a new file instead? (y/N): ").await?;
        if !answer.eq_ignore_ascii_case("y") {
            bail!("Cancelled");
        }
        return Ok(device::new_sensor_file_name());
    }

    tracing::info!("Found {} sensor files, newest first:", files.len());
    for (i, file) in files.iter().take(SHOWN_FILES).enumerate() {
        tracing::info!("  {}. {file}", i + 1);
    }
    if files.len() > SHOWN_FILES {
        tracing::info!("  ... {} more", files.len() - SHOWN_FILES);
    }

    let index = match args.index {
        Some(index) => index,
        None => {
            let answer = prompt("File to replace [1]: ").await?;
            if answer.is_empty() {
                1
            } else {
                answer
                    .parse()
                    .with_context(|| format!("Not a number: {answer}"))?
            }
        }
    };

    let file = index
        .checked_sub(1)
        .and_then(|i| files.get(i))
        .with_context(|| format!("No file number {index}, pick 1 to {}", files.len()))?;
    Ok(file.name.clone())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let store = ConfigStore::new(&args.config);
    let config = store.load()?;
    let adb = Adb::from_config(&config, &store)
        .context("adb not available; run walker once to locate the emulator")?;
    tracing::info!("Using adb at {}", adb.path().display());

    let files = device::list_recent(&adb).await?;
    let target = choose_target(args, &files).await?;
    tracing::info!("Target file: {target}");

    let signal = SignalGenerator::new().generate(args.duration, args.speed)?;
    let stats = SignalStats::compute(&signal.samples)
        .context("Duration too short to produce any samples")?;
    tracing::info!("Generated data:\n{stats}");

    // Dropped on every exit from here, including Ctrl-C
    let (local, bytes) = LocalSignalFile::create(&target, &signal.samples, args.keep_local)?;
    tracing::info!("Wrote {} ({bytes} bytes)", local.path().display());

    let remote = device::push_sensor_file(&adb, local.path(), &target).await?;
    tracing::info!("Sensor data replaced: {remote}");
    tracing::info!("You can now finish the run in the app");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tokio::select! {
        result = run(&args) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Stopped by user");
            Ok(())
        }
    }
}
