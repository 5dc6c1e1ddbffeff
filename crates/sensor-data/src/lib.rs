//! Synthetic accelerometer data for walker runs.
//!
//! Running apps record accelerometer magnitudes alongside GPS. When the GPS
//! track is simulated, this crate produces a matching gait-like signal,
//! checks it against real recordings, and uploads it over ADB in place of
//! the app's own file.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sensor_data::prelude::*;
//!
//! let signal = SignalGenerator::new().generate(1143.0, 2.8)?;
//! let stats = SignalStats::compute(&signal.samples)?;
//! format::write_file("run.txt", &signal.samples)?;
//! ```

pub mod device;
pub mod format;
pub mod generator;
pub mod stats;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::device::{SENSOR_DIR, SensorFile, list_recent, push_sensor_file};
    pub use crate::format::{self, SignalFileError};
    pub use crate::generator::{GeneratedSignal, SignalConfig, SignalError, SignalGenerator};
    pub use crate::stats::{Comparison, SignalStats, Similarity, StatsError, compare};
}
