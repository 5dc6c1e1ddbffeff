//! Descriptive statistics and generated-vs-recorded comparison.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Cannot compute statistics of an empty sequence")]
    Empty,
    #[error("Sample {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },
}

/// Summary statistics of one sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalStats {
    pub count: usize,
    pub mean: f64,
    /// Standard deviation with divisor `n`.
    pub population_stdev: f64,
    /// Standard deviation with divisor `n - 1`; zero for a single sample.
    pub sample_stdev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// `sorted[n / 4]`
    pub p25: f64,
    /// `sorted[n * 3 / 4]`
    pub p75: f64,
}

impl SignalStats {
    pub fn compute(values: &[f64]) -> Result<Self, StatsError> {
        if values.is_empty() {
            return Err(StatsError::Empty);
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(StatsError::NonFinite { index, value });
        }

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        let population_stdev = (squares / n as f64).sqrt();
        let sample_stdev = if n > 1 {
            (squares / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Ok(Self {
            count: n,
            mean,
            population_stdev,
            sample_stdev,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            p25: sorted[n / 4],
            p75: sorted[n * 3 / 4],
        })
    }
}

impl fmt::Display for SignalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  count:  {}", self.count)?;
        writeln!(f, "  mean:   {:.2} m/s^2", self.mean)?;
        writeln!(f, "  stdev:  {:.2} m/s^2", self.sample_stdev)?;
        writeln!(f, "  median: {:.2} m/s^2", self.median)?;
        writeln!(f, "  min:    {:.2} m/s^2", self.min)?;
        writeln!(f, "  max:    {:.2} m/s^2", self.max)?;
        writeln!(f, "  p25:    {:.2} m/s^2", self.p25)?;
        write!(f, "  p75:    {:.2} m/s^2", self.p75)
    }
}

/// How closely generated data matches a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Similarity {
    /// Mean within 10% and stdev within 20%.
    HighlySimilar,
    /// Mean within 20% and stdev within 30%.
    BroadlyConsistent,
    NeedsAdjustment,
}

impl Similarity {
    pub fn classify(mean_diff_pct: f64, stdev_diff_pct: f64) -> Self {
        if mean_diff_pct < 10.0 && stdev_diff_pct < 20.0 {
            Similarity::HighlySimilar
        } else if mean_diff_pct < 20.0 && stdev_diff_pct < 30.0 {
            Similarity::BroadlyConsistent
        } else {
            Similarity::NeedsAdjustment
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Similarity::HighlySimilar => "generated data is highly similar to the recording",
            Similarity::BroadlyConsistent => "generated data is broadly consistent with the recording",
            Similarity::NeedsAdjustment => "generated data needs adjustment",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub generated: SignalStats,
    pub real: SignalStats,
    pub mean_diff_pct: f64,
    pub stdev_diff_pct: f64,
    pub similarity: Similarity,
}

impl Comparison {
    /// Compares two summaries, taking `real` as the reference.
    pub fn from_stats(generated: SignalStats, real: SignalStats) -> Self {
        let mean_diff_pct = percent_diff(real.mean, generated.mean);
        let stdev_diff_pct = percent_diff(real.sample_stdev, generated.sample_stdev);
        Self {
            generated,
            real,
            mean_diff_pct,
            stdev_diff_pct,
            similarity: Similarity::classify(mean_diff_pct, stdev_diff_pct),
        }
    }
}

/// Compares generated samples against recorded ones.
pub fn compare(generated: &[f64], real: &[f64]) -> Result<Comparison, StatsError> {
    Ok(Comparison::from_stats(
        SignalStats::compute(generated)?,
        SignalStats::compute(real)?,
    ))
}

/// `|reference - other| / |reference|` in percent. A zero reference yields
/// zero when `other` is also zero and infinity otherwise.
pub fn percent_diff(reference: f64, other: f64) -> f64 {
    if reference == 0.0 {
        if other == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (reference - other).abs() / reference.abs() * 100.0
    }
}
