use geo::{Distance as _, Haversine, geometry::Point};
use serde::{Deserialize, Serialize};

use crate::geodesy;
use crate::route_loader::RouteError;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Converts to a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point {
        Point::new(self.lon, self.lat)
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    pub fn lerp(&self, other: &Waypoint, t: f64) -> Waypoint {
        Waypoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// True when both axes differ by at most `tolerance` degrees.
    pub fn within(&self, other: &Waypoint, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lon - other.lon).abs() <= tolerance
    }
}

/// Constant displacement added to every emitted position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub lat: f64,
    pub lon: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { lat: 0.0, lon: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn apply(&self, point: Waypoint) -> Waypoint {
        Waypoint::new(point.lat + self.lat, point.lon + self.lon)
    }
}

/// An ordered, implicitly closed path of at least two waypoints.
///
/// The segment from the last point back to the first is part of the route,
/// so traversal loops forever until the caller stops it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Waypoint>,
}

impl Route {
    pub const MIN_POINTS: usize = 2;

    pub fn new(points: Vec<Waypoint>) -> Result<Self, RouteError> {
        if points.is_empty() {
            return Err(RouteError::Empty);
        }
        if points.len() < Self::MIN_POINTS {
            return Err(RouteError::TooFewPoints(points.len()));
        }
        if let Some((index, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.lat.is_finite() && p.lon.is_finite()))
        {
            return Err(RouteError::InvalidPoint {
                index,
                reason: format!("({}, {}) is not finite", p.lat, p.lon),
            });
        }
        let route = Self { points };
        if route.lap_length_m() <= 0.0 {
            return Err(RouteError::ZeroLength);
        }
        Ok(route)
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of segments, including the closing one.
    pub fn segment_count(&self) -> usize {
        self.points.len()
    }

    /// Endpoints of segment `index`, wrapping past the last point.
    pub fn segment(&self, index: usize) -> (Waypoint, Waypoint) {
        let n = self.points.len();
        (self.points[index % n], self.points[(index + 1) % n])
    }

    /// Planar segment length in meters (see [`geodesy::planar_distance_m`]).
    pub fn segment_length_m(&self, index: usize) -> f64 {
        let (a, b) = self.segment(index);
        geodesy::planar_distance_m(a, b)
    }

    /// Planar length of one full lap, closing segment included.
    pub fn lap_length_m(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| self.segment_length_m(i))
            .sum()
    }

    /// Great-circle length of one full lap.
    pub fn lap_length_haversine_m(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| {
                let (a, b) = self.segment(i);
                Haversine.distance(a.point(), b.point())
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_requires_two_points() {
        assert!(matches!(Route::new(vec![]), Err(RouteError::Empty)));
        assert!(matches!(
            Route::new(vec![Waypoint::new(1.0, 2.0)]),
            Err(RouteError::TooFewPoints(1))
        ));
        assert!(Route::new(vec![Waypoint::new(1.0, 2.0), Waypoint::new(1.0, 2.1)]).is_ok());
        assert!(matches!(
            Route::new(vec![Waypoint::new(1.0, 2.0), Waypoint::new(1.0, 2.0)]),
            Err(RouteError::ZeroLength)
        ));
    }

    #[test]
    fn test_route_rejects_non_finite_points() {
        let err = Route::new(vec![Waypoint::new(0.0, 0.0), Waypoint::new(f64::NAN, 0.0)]);
        assert!(matches!(err, Err(RouteError::InvalidPoint { index: 1, .. })));

        let err = Route::new(vec![
            Waypoint::new(0.0, f64::INFINITY),
            Waypoint::new(0.0, 1.0),
            Waypoint::new(1.0, 1.0),
        ]);
        assert!(matches!(err, Err(RouteError::InvalidPoint { index: 0, .. })));
    }

    #[test]
    fn test_segments_wrap() {
        let route = Route::new(vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(0.0, 1.0),
            Waypoint::new(1.0, 1.0),
        ])
        .unwrap();

        assert_eq!(route.segment(2), (Waypoint::new(1.0, 1.0), Waypoint::new(0.0, 0.0)));
        assert_eq!(route.segment(3), route.segment(0));
    }

    #[test]
    fn test_lap_lengths() {
        let route = Route::new(vec![Waypoint::new(0.0, 0.0), Waypoint::new(0.001, 0.0)]).unwrap();

        // Out and back
        assert!((route.lap_length_m() - 2.0 * 111.32).abs() < 1e-6);
        // ~111.2m per 0.001 degrees of latitude on a sphere
        assert!((route.lap_length_haversine_m() - 222.4).abs() < 1.0);
    }

    #[test]
    fn test_offset_apply() {
        let offset = Offset { lat: 0.5, lon: -0.25 };
        let moved = offset.apply(Waypoint::new(10.0, 20.0));
        assert_eq!(moved, Waypoint::new(10.5, 19.75));
        assert!(Offset::ZERO.is_zero());
        assert!(!offset.is_zero());
    }
}
