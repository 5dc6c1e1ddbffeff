//! Route-following position simulation.
//!
//! The simulator walks a [`Route`] in a loop at a jittered speed, emitting
//! one position per tick to a [`LocationSink`] until the cumulative distance
//! reaches the configured limit.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{Clock, Pacer};
use crate::geodesy;
use crate::models::{Offset, Route, Waypoint};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(400);
pub const DEFAULT_BASE_SPEED_MPS: f64 = 2.8;
pub const DEFAULT_SPEED_JITTER_RATIO: f64 = 0.20;
pub const DEFAULT_JITTER_RADIUS_M: f64 = 0.1;
pub const DEFAULT_DISTANCE_LIMIT_M: f64 = 4000.0;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid simulation parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("Offset must be finite, got ({lat}, {lon})")]
    NonFiniteOffset { lat: f64, lon: f64 },
}

/// Tuning for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Wall-clock period between emitted positions.
    pub tick_interval: Duration,
    /// Mean speed in meters per second.
    pub base_speed_mps: f64,
    /// Per-tick speed factor is drawn from `[1 - ratio, 1 + ratio]`.
    pub speed_jitter_ratio: f64,
    /// Half-width in meters of the per-axis positional jitter.
    pub jitter_radius_m: f64,
    /// The run ends once the total distance reaches this.
    pub distance_limit_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            base_speed_mps: DEFAULT_BASE_SPEED_MPS,
            speed_jitter_ratio: DEFAULT_SPEED_JITTER_RATIO,
            jitter_radius_m: DEFAULT_JITTER_RADIUS_M,
            distance_limit_m: DEFAULT_DISTANCE_LIMIT_M,
        }
    }
}

impl SimulationConfig {
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_base_speed(mut self, mps: f64) -> Self {
        self.base_speed_mps = mps;
        self
    }

    pub fn with_speed_jitter(mut self, ratio: f64) -> Self {
        self.speed_jitter_ratio = ratio;
        self
    }

    pub fn with_jitter_radius(mut self, meters: f64) -> Self {
        self.jitter_radius_m = meters;
        self
    }

    pub fn with_distance_limit(mut self, meters: f64) -> Self {
        self.distance_limit_m = meters;
        self
    }

    /// Checks every parameter without building a simulator.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |name: &'static str, value: String| {
            Err(SimulationError::InvalidParameter { name, value })
        };

        if self.tick_interval.is_zero() {
            return invalid("tick_interval", format!("{:?}", self.tick_interval));
        }
        if !(self.base_speed_mps.is_finite() && self.base_speed_mps > 0.0) {
            return invalid("base_speed_mps", self.base_speed_mps.to_string());
        }
        if !(0.0..1.0).contains(&self.speed_jitter_ratio) {
            return invalid("speed_jitter_ratio", self.speed_jitter_ratio.to_string());
        }
        if !(self.jitter_radius_m.is_finite() && self.jitter_radius_m >= 0.0) {
            return invalid("jitter_radius_m", self.jitter_radius_m.to_string());
        }
        if !(self.distance_limit_m.is_finite() && self.distance_limit_m > 0.0) {
            return invalid("distance_limit_m", self.distance_limit_m.to_string());
        }
        Ok(())
    }
}

/// Consumer of emitted positions, e.g. an emulator's GPS override.
pub trait LocationSink {
    type Error: Display;

    fn set_location(&mut self, lon: f64, lat: f64) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Mutable traversal state, owned by one simulator for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    pub segment_index: usize,
    pub distance_into_segment: f64,
    pub distance_total: f64,
    pub frame_count: u64,
}

/// Result of advancing along the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Speed drawn for this step, in m/s.
    pub speed_mps: f64,
    /// Distance covered by this step, in meters.
    pub distance_m: f64,
    /// Interpolated position on the route, before jitter and offset.
    pub on_route: Waypoint,
}

/// Live status for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub elapsed: Duration,
    pub dt: Duration,
    pub speed_mps: f64,
    pub distance_total_m: f64,
    pub average_speed_mps: f64,
    pub tick_rate_hz: f64,
    pub segment_index: usize,
    pub on_route: Waypoint,
    /// What was sent to the sink.
    pub emitted: Waypoint,
    pub sink_ok: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub distance_total_m: f64,
    pub elapsed: Duration,
    pub sink_failures: u64,
}

/// Walks a route tick by tick.
pub struct PositionSimulator<R: Rng> {
    route: Route,
    offset: Offset,
    config: SimulationConfig,
    rng: R,
    state: SimulationState,
}

impl<R: Rng> PositionSimulator<R> {
    pub fn new(
        route: Route,
        offset: Offset,
        config: SimulationConfig,
        rng: R,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if !offset.is_finite() {
            return Err(SimulationError::NonFiniteOffset {
                lat: offset.lat,
                lon: offset.lon,
            });
        }

        Ok(Self {
            route,
            offset,
            config,
            rng,
            state: SimulationState::default(),
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.state.distance_total >= self.config.distance_limit_m
    }

    /// Current position on the route, before jitter and offset.
    pub fn position(&self) -> Waypoint {
        let index = self.state.segment_index;
        let (start, end) = self.route.segment(index);
        let length = self.route.segment_length_m(index);
        let ratio = if length > 0.0 {
            self.state.distance_into_segment / length
        } else {
            0.0
        };
        start.lerp(&end, ratio)
    }

    /// Moves `distance_m` along the route, rolling over as many segments as
    /// the distance covers, and returns the new on-route position.
    pub fn advance_by(&mut self, distance_m: f64) -> Waypoint {
        self.state.distance_into_segment += distance_m;
        self.state.distance_total += distance_m;

        // Empty segments always satisfy the condition and are skipped. Route
        // guarantees at least one segment has length, so this terminates.
        let n = self.route.segment_count();
        loop {
            let length = self.route.segment_length_m(self.state.segment_index);
            if self.state.distance_into_segment < length {
                break;
            }
            self.state.distance_into_segment -= length;
            self.state.segment_index = (self.state.segment_index + 1) % n;
        }

        self.position()
    }

    /// Draws a jittered speed and advances by `speed * dt`.
    pub fn advance(&mut self, dt: Duration) -> Step {
        let ratio = self.config.speed_jitter_ratio;
        let speed_mps = self.config.base_speed_mps * self.rng.gen_range(1.0 - ratio..=1.0 + ratio);
        let distance_m = speed_mps * dt.as_secs_f64();
        let on_route = self.advance_by(distance_m);
        Step {
            speed_mps,
            distance_m,
            on_route,
        }
    }

    /// Applies per-tick positional jitter and the constant offset.
    pub fn emitted_position(&mut self, on_route: Waypoint) -> Waypoint {
        let r = self.config.jitter_radius_m;
        let dx = self.rng.gen_range(-r..=r);
        let dy = self.rng.gen_range(-r..=r);
        let (d_lat, d_lon) = geodesy::meters_to_degrees(on_route.lat, dx, dy);
        let jittered = Waypoint::new(on_route.lat + d_lat, on_route.lon + d_lon);
        self.offset.apply(jittered)
    }

    /// Runs until the distance limit is reached.
    ///
    /// The first route point is emitted immediately, then one position per
    /// tick. Sink failures are logged and counted, never retried.
    pub async fn run<C, S, F>(
        &mut self,
        clock: C,
        sink: &mut S,
        mut on_tick: F,
    ) -> RunSummary
    where
        C: Clock,
        S: LocationSink,
        F: FnMut(&TickReport),
    {
        let mut sink_failures = 0;

        let start = self.position();
        let emitted = self.emitted_position(start);
        if let Err(e) = sink.set_location(emitted.lon, emitted.lat).await {
            warn!("Failed to set initial location: {e}");
            sink_failures += 1;
        }
        info!(
            "Initial position set at ({:.6}, {:.6}), walking {:.0} m",
            emitted.lat, emitted.lon, self.config.distance_limit_m
        );

        let mut pacer = Pacer::new(clock, self.config.tick_interval);
        let mut elapsed = Duration::ZERO;

        while !self.is_finished() {
            let tick = pacer.tick().await;
            elapsed = tick.elapsed;

            let step = self.advance(tick.dt);
            let emitted = self.emitted_position(step.on_route);
            let sink_ok = match sink.set_location(emitted.lon, emitted.lat).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to set location: {e}");
                    sink_failures += 1;
                    false
                }
            };
            self.state.frame_count += 1;

            let secs = tick.elapsed.as_secs_f64();
            let report = TickReport {
                frame: self.state.frame_count,
                elapsed: tick.elapsed,
                dt: tick.dt,
                speed_mps: step.speed_mps,
                distance_total_m: self.state.distance_total,
                average_speed_mps: if secs > 0.0 {
                    self.state.distance_total / secs
                } else {
                    0.0
                },
                tick_rate_hz: if secs > 0.0 {
                    self.state.frame_count as f64 / secs
                } else {
                    0.0
                },
                segment_index: self.state.segment_index,
                on_route: step.on_route,
                emitted,
                sink_ok,
            };
            on_tick(&report);
        }

        debug!(
            "Run finished after {} frames, {:.1} m",
            self.state.frame_count, self.state.distance_total
        );

        RunSummary {
            frames: self.state.frame_count,
            distance_total_m: self.state.distance_total,
            elapsed,
            sink_failures,
        }
    }
}
