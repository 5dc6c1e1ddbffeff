//! End-to-end runs of the position simulator on a virtual clock.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use walker::clock::ManualClock;
use walker::geodesy::planar_distance_m;
use walker::simulator::{LocationSink, RunSummary, TickReport};
use walker::{Offset, PositionSimulator, Route, SimulationConfig, Waypoint};

const TICK: Duration = Duration::from_millis(400);

/// Records every update; optionally fails all of them.
#[derive(Default)]
struct RecordingSink {
    updates: Vec<Waypoint>,
    fail: bool,
}

impl LocationSink for RecordingSink {
    type Error = String;

    async fn set_location(&mut self, lon: f64, lat: f64) -> Result<(), String> {
        self.updates.push(Waypoint::new(lat, lon));
        if self.fail {
            Err("device offline".to_string())
        } else {
            Ok(())
        }
    }
}

fn triangle() -> Route {
    Route::new(vec![
        Waypoint::new(30.0, 120.0),
        Waypoint::new(30.0, 120.001),
        Waypoint::new(30.001, 120.001),
    ])
    .unwrap()
}

fn exact_config(limit_m: f64) -> SimulationConfig {
    SimulationConfig::default()
        .with_tick_interval(TICK)
        .with_jitter_radius(0.0)
        .with_distance_limit(limit_m)
}

async fn simulate(
    route: Route,
    offset: Offset,
    config: SimulationConfig,
    sink: &mut RecordingSink,
) -> (RunSummary, Vec<TickReport>) {
    let mut simulator =
        PositionSimulator::new(route, offset, config, StdRng::seed_from_u64(7)).unwrap();
    let clock = ManualClock::new();
    let mut reports = Vec::new();
    let summary = simulator
        .run(&clock, sink, |report| reports.push(*report))
        .await;
    (summary, reports)
}

#[tokio::test]
async fn test_start_point_is_emitted_first() {
    let route = triangle();
    let mut sink = RecordingSink::default();
    let (summary, reports) = simulate(route.clone(), Offset::ZERO, exact_config(50.0), &mut sink).await;

    assert_eq!(sink.updates[0], route.points()[0]);
    assert_eq!(sink.updates.len() as u64, summary.frames + 1);
    assert_eq!(reports.len() as u64, summary.frames);
}

#[tokio::test]
async fn test_positions_stay_on_route() {
    let route = triangle();
    let mut sink = RecordingSink::default();
    let (_, reports) = simulate(route.clone(), Offset::ZERO, exact_config(900.0), &mut sink).await;

    // More than two laps of a ~380m triangle
    assert!(reports.iter().any(|r| r.segment_index == 2));
    for report in &reports {
        let (a, b) = route.segment(report.segment_index);
        let p = report.on_route;
        let detour = planar_distance_m(a, p) + planar_distance_m(p, b) - planar_distance_m(a, b);
        assert!(detour.abs() < 1e-6, "frame {} left its segment", report.frame);
        assert_eq!(report.emitted, report.on_route);
    }
}

#[tokio::test]
async fn test_distance_is_monotonic_and_stops_at_limit() {
    let limit = 120.0;
    let mut sink = RecordingSink::default();
    let (summary, reports) = simulate(triangle(), Offset::ZERO, exact_config(limit), &mut sink).await;

    let mut previous = 0.0;
    for report in &reports {
        assert!(report.distance_total_m > previous);
        previous = report.distance_total_m;
    }

    // Only the final tick reaches the limit
    let (last, rest) = reports.split_last().unwrap();
    assert!(last.distance_total_m >= limit);
    assert!(rest.iter().all(|r| r.distance_total_m < limit));
    assert_eq!(summary.distance_total_m, last.distance_total_m);
}

#[tokio::test]
async fn test_ticks_follow_the_period() {
    let mut sink = RecordingSink::default();
    let (summary, reports) = simulate(triangle(), Offset::ZERO, exact_config(60.0), &mut sink).await;

    let nominal = 2.8 * TICK.as_secs_f64();
    let mut previous = 0.0;
    for (k, report) in reports.iter().enumerate() {
        assert_eq!(report.dt, TICK);
        assert_eq!(report.elapsed, TICK * (k as u32 + 1));
        let covered = report.distance_total_m - previous;
        assert!(covered >= nominal * 0.8 - 1e-9 && covered <= nominal * 1.2 + 1e-9);
        assert!((report.tick_rate_hz - 2.5).abs() < 1e-9);
        previous = report.distance_total_m;
    }
    assert_eq!(summary.elapsed, TICK * summary.frames as u32);
}

#[tokio::test]
async fn test_offset_shifts_every_update() {
    let route = triangle();
    let offset = Offset {
        lat: 0.01,
        lon: -0.02,
    };
    let mut sink = RecordingSink::default();
    let (_, reports) = simulate(route.clone(), offset, exact_config(40.0), &mut sink).await;

    assert_eq!(sink.updates[0], offset.apply(route.points()[0]));
    for report in &reports {
        assert_eq!(report.emitted, offset.apply(report.on_route));
    }
}

#[tokio::test]
async fn test_sink_failures_are_counted_not_retried() {
    let mut sink = RecordingSink {
        fail: true,
        ..Default::default()
    };
    let (summary, reports) = simulate(triangle(), Offset::ZERO, exact_config(30.0), &mut sink).await;

    assert!(summary.frames > 0);
    assert_eq!(sink.updates.len() as u64, summary.frames + 1);
    assert_eq!(summary.sink_failures, summary.frames + 1);
    assert!(reports.iter().all(|r| !r.sink_ok));
}

#[tokio::test]
async fn test_jitter_stays_within_radius() {
    let route = triangle();
    let config = exact_config(200.0).with_jitter_radius(0.5);
    let mut sink = RecordingSink::default();
    let (_, reports) = simulate(route, Offset::ZERO, config, &mut sink).await;

    for report in &reports {
        let d_lat_m = (report.emitted.lat - report.on_route.lat) * 111_320.0;
        let d_lon_m = (report.emitted.lon - report.on_route.lon)
            * 111_320.0
            * report.on_route.lat.to_radians().cos();
        assert!(d_lat_m.abs() <= 0.5 + 1e-6);
        assert!(d_lon_m.abs() <= 0.5 + 1e-6);
    }
}
