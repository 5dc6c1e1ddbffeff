use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use walker::clock::{ManualClock, TokioClock};
use walker::emulator::{self, Emulator, LogSink};
use walker::route_loader::{DEFAULT_ROUTE_FILE, RouteSource};
use walker::simulator::{
    DEFAULT_BASE_SPEED_MPS, DEFAULT_DISTANCE_LIMIT_M, DEFAULT_JITTER_RADIUS_M,
    DEFAULT_SPEED_JITTER_RATIO, RunSummary, TickReport,
};
use walker::{ConfigStore, PositionSimulator, RouteLoader, SimulationConfig, WalkerError};

#[derive(Parser, Debug)]
#[command(name = "walker")]
#[command(about = "Walk a route on a MuMu emulator by spoofing its GPS location", long_about = None)]
struct Args {
    /// Path to config.json
    #[arg(long, env = "WALKER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Stop after this many meters
    #[arg(long, default_value_t = DEFAULT_DISTANCE_LIMIT_M)]
    distance: f64,

    /// Base walking speed in m/s
    #[arg(long, default_value_t = DEFAULT_BASE_SPEED_MPS)]
    speed: f64,

    /// Relative speed variation per tick (0.2 = ±20%)
    #[arg(long, default_value_t = DEFAULT_SPEED_JITTER_RATIO)]
    speed_jitter: f64,

    /// Positional jitter radius in meters
    #[arg(long, default_value_t = DEFAULT_JITTER_RADIUS_M)]
    jitter: f64,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 400)]
    tick: u64,

    /// Keep every Nth route point
    #[arg(long)]
    stride: Option<usize>,

    /// Start walking without waiting for Enter
    #[arg(long, default_value_t = false)]
    no_wait: bool,

    /// Simulate on a virtual clock without touching the emulator
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Wait for Enter before exiting
    #[arg(long, default_value_t = false)]
    pause_on_exit: bool,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_tick_interval(Duration::from_millis(self.tick))
            .with_base_speed(self.speed)
            .with_speed_jitter(self.speed_jitter)
            .with_jitter_radius(self.jitter)
            .with_distance_limit(self.distance)
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn wait_for_enter(prompt: &str) {
    print!("{prompt}");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if let Err(e) = BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        warn!("Could not read stdin: {e}");
    }
}

fn log_tick(report: &TickReport) {
    info!(
        "#{:<5} {:>7.1}s  speed {:.2} m/s  dist {:>7.1} m  avg {:.2} m/s  {:.2} Hz  seg {}{}",
        report.frame,
        report.elapsed.as_secs_f64(),
        report.speed_mps,
        report.distance_total_m,
        report.average_speed_mps,
        report.tick_rate_hz,
        report.segment_index,
        if report.sink_ok { "" } else { "  (update failed)" },
    );
}

async fn run(args: &Args) -> Result<RunSummary, WalkerError> {
    let store = ConfigStore::new(&args.config);
    let mut config = store.load()?;
    let mut dirty = false;

    // Reject bad input before touching the device
    let sim_config = args.simulation_config();
    sim_config.validate()?;

    let mut loader = RouteLoader::new();
    if let Some(stride) = args.stride {
        loader = loader.with_stride(stride);
    }
    let loaded = loader.load_from_config(&config, &store)?;

    if config.walk_path_file.is_none() && matches!(loaded.source, RouteSource::Gpx(_)) {
        info!("Remembering {DEFAULT_ROUTE_FILE} as the route file");
        config.walk_path_file = Some(DEFAULT_ROUTE_FILE.to_string());
        dirty = true;
    }

    let mut simulator =
        PositionSimulator::new(loaded.route, loaded.offset, sim_config, rand::thread_rng())?;

    if args.dry_run {
        info!("Dry run: simulating on a virtual clock");
        if dirty {
            store.save(&config)?;
        }
        let clock = ManualClock::new();
        let mut sink = LogSink::default();
        return Ok(simulator.run(&clock, &mut sink, log_tick).await);
    }

    let emu_dir = emulator::find_emu_dir(&mut config, &store, &emulator::search_roots())?;
    dirty |= emu_dir.discovered;
    if dirty {
        store.save(&config)?;
    }

    let emulator = Emulator::from_dir(&emu_dir.path)?;
    emulator.connect().await?;

    if !args.no_wait {
        wait_for_enter("Emulator connected. Press Enter to start walking...").await;
    }

    let mut sink = emulator.location_sink();
    Ok(simulator.run(TokioClock, &mut sink, log_tick).await)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let result = tokio::select! {
        result = run(&args) => result,
        _ = tokio::signal::ctrl_c() => Err(WalkerError::Interrupted),
    };

    let outcome = match result {
        Ok(summary) => {
            info!(
                "Done: {} frames, {:.1} m in {:.1}s ({} failed updates)",
                summary.frames,
                summary.distance_total_m,
                summary.elapsed.as_secs_f64(),
                summary.sink_failures
            );
            Ok(())
        }
        Err(WalkerError::Interrupted) => {
            info!("Stopped by user");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            if e.is_input_error() {
                error!("Check {} and try again", args.config.display());
            }
            Err(e.into())
        }
    };

    if args.pause_on_exit {
        wait_for_enter("Press Enter to exit...").await;
    }
    outcome
}
