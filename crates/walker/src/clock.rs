//! Monotonic clock abstraction and fixed-period tick pacing.

use std::cell::Cell;
use std::future::Future;
use std::time::{Duration, Instant};

/// Source of monotonic time that can suspend until a deadline.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()>;
}

/// Real time backed by tokio's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()> {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline))
    }
}

/// Clock that only moves when told to. Sleeping jumps straight to the
/// deadline, so a whole run completes without waiting.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
    lag: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
            lag: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Every subsequent wake-up lands `lag` after its deadline, as an
    /// overloaded scheduler would.
    pub fn set_lag(&self, lag: Duration) {
        self.lag.set(lag);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()> {
        if deadline > self.now.get() {
            self.now.set(deadline + self.lag.get());
        }
        std::future::ready(())
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()> {
        (**self).sleep_until(deadline)
    }
}

/// Timing of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Wall-clock time since the previous tick.
    pub dt: Duration,
    /// Wall-clock time since the pacer started.
    pub elapsed: Duration,
}

/// Deadline accumulator for fixed-period ticks.
///
/// Deadlines form the sequence `start + k * period` and are never re-based
/// on the actual wake time, so scheduling jitter does not accumulate. The
/// reported `dt` is the real time between ticks.
#[derive(Debug)]
pub struct Pacer<C: Clock> {
    clock: C,
    period: Duration,
    start: Instant,
    last_tick: Instant,
    next_deadline: Instant,
}

impl<C: Clock> Pacer<C> {
    pub fn new(clock: C, period: Duration) -> Self {
        let start = clock.now();
        Self {
            clock,
            period,
            start,
            last_tick: start,
            next_deadline: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Waits for the next deadline (unless it already passed) and reports
    /// the tick's timing.
    pub async fn tick(&mut self) -> Tick {
        if self.clock.now() < self.next_deadline {
            self.clock.sleep_until(self.next_deadline).await;
        }
        let now = self.clock.now();
        self.next_deadline += self.period;

        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        Tick {
            dt,
            elapsed: now.saturating_duration_since(self.start),
        }
    }
}
