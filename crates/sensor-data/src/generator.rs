//! Synthetic accelerometer magnitude generation.
//!
//! Produces a gait-like signal: a constant baseline, a periodic step
//! component with two harmonics whose amplitude is re-drawn every few steps,
//! and Gaussian noise. The defaults were fitted against recorded running
//! sessions (mean ≈ 15, stdev ≈ 12).

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;
use tracing::info;

/// Duration of a 3.2 km run at the default speed.
pub const DEFAULT_DURATION_SECS: f64 = 1143.0;
pub const DEFAULT_AVG_SPEED_MPS: f64 = 2.8;
/// Upper bound on one generated sequence, about 115 days at 10 Hz.
pub const MAX_SAMPLES: usize = 100_000_000;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Invalid signal parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Tuning constants for [`SignalGenerator`].
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Samples per second.
    pub sampling_rate_hz: f64,
    /// Step frequency range in Hz (150 to 180 steps per minute).
    pub step_freq_range: (f64, f64),
    /// Baseline magnitude at the reference speed.
    pub amplitude_base: f64,
    /// Peak swing of the periodic component.
    pub amplitude_variation: f64,
    /// Weight applied to `amplitude_variation`.
    pub variation_scale: f64,
    /// Standard deviation of the additive noise.
    pub noise_stddev: f64,
    /// Range of the per-stride amplitude factor.
    pub irregularity_range: (f64, f64),
    /// Seconds between irregularity changes.
    pub irregularity_period_secs: f64,
    /// Output clamp.
    pub clamp: (f64, f64),
    /// Speed at which the baseline equals `amplitude_base`.
    pub reference_speed_mps: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 10.0,
            step_freq_range: (2.5, 3.0),
            amplitude_base: 15.0,
            amplitude_variation: 38.0,
            variation_scale: 0.45,
            noise_stddev: 7.0,
            irregularity_range: (0.6, 1.4),
            irregularity_period_secs: 1.2,
            clamp: (0.5, 100.0),
            reference_speed_mps: DEFAULT_AVG_SPEED_MPS,
        }
    }
}

impl SignalConfig {
    pub fn with_sampling_rate(mut self, hz: f64) -> Self {
        self.sampling_rate_hz = hz;
        self
    }

    pub fn with_noise(mut self, stddev: f64) -> Self {
        self.noise_stddev = stddev;
        self
    }

    pub fn with_step_frequency(mut self, min_hz: f64, max_hz: f64) -> Self {
        self.step_freq_range = (min_hz, max_hz);
        self
    }

    /// Samples between irregularity changes, at least one.
    fn irregularity_every(&self) -> usize {
        ((self.sampling_rate_hz * self.irregularity_period_secs).floor() as usize).max(1)
    }
}

/// A generated sequence with the parameters drawn for it.
#[derive(Debug, Clone)]
pub struct GeneratedSignal {
    pub samples: Vec<f64>,
    pub step_frequency_hz: f64,
    pub amplitude: f64,
    pub sampling_rate_hz: f64,
}

impl GeneratedSignal {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Generates `floor(duration * rate)` samples using the thread RNG.
    pub fn generate(
        &self,
        duration_secs: f64,
        avg_speed_mps: f64,
    ) -> Result<GeneratedSignal, SignalError> {
        self.generate_with(duration_secs, avg_speed_mps, &mut rand::thread_rng())
    }

    /// Same as [`Self::generate`] with a caller-supplied RNG.
    pub fn generate_with(
        &self,
        duration_secs: f64,
        avg_speed_mps: f64,
        rng: &mut impl Rng,
    ) -> Result<GeneratedSignal, SignalError> {
        let cfg = &self.config;
        check("duration_secs", duration_secs, duration_secs >= 0.0)?;
        check("avg_speed_mps", avg_speed_mps, avg_speed_mps > 0.0)?;
        check("sampling_rate_hz", cfg.sampling_rate_hz, cfg.sampling_rate_hz > 0.0)?;
        let noise = Normal::new(0.0, cfg.noise_stddev).map_err(|_| SignalError::InvalidParameter {
            name: "noise_stddev",
            value: cfg.noise_stddev,
        })?;

        let (f_min, f_max) = cfg.step_freq_range;
        check("step_freq_range.min", f_min, f_min > 0.0)?;
        check("step_freq_range.max", f_max, f_max >= f_min)?;
        let (irr_min, irr_max) = cfg.irregularity_range;
        check("irregularity_range.min", irr_min, irr_min >= 0.0)?;
        check("irregularity_range.max", irr_max, irr_max >= irr_min)?;

        let exact = (duration_secs * cfg.sampling_rate_hz).floor();
        check("duration_secs", duration_secs, exact <= MAX_SAMPLES as f64)?;
        let count = exact as usize;
        let amplitude = cfg.amplitude_base * (0.85 + 0.15 * avg_speed_mps / cfg.reference_speed_mps);
        let step_frequency_hz = rng.gen_range(f_min..=f_max);
        let swing = cfg.amplitude_variation * cfg.variation_scale;
        let every = cfg.irregularity_every();
        let (lo, hi) = cfg.clamp;

        info!(
            "Generating {count} samples: step {step_frequency_hz:.2} Hz ({:.0} steps/min), amplitude {amplitude:.2}",
            step_frequency_hz * 60.0
        );

        let mut irregularity = 1.0;
        let mut samples = Vec::with_capacity(count);
        for i in 0..count {
            let t = i as f64 / cfg.sampling_rate_hz;
            let phase = TAU * step_frequency_hz * t;
            let periodic = 0.6 * phase.sin() + 0.3 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin();

            if i % every == 0 {
                irregularity = rng.gen_range(irr_min..=irr_max);
            }

            let value = amplitude + periodic * swing * irregularity + noise.sample(rng);
            samples.push(round6(value.clamp(lo, hi)));
        }

        Ok(GeneratedSignal {
            samples,
            step_frequency_hz,
            amplitude,
            sampling_rate_hz: cfg.sampling_rate_hz,
        })
    }
}

fn check(name: &'static str, value: f64, ok: bool) -> Result<(), SignalError> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(SignalError::InvalidParameter { name, value })
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
