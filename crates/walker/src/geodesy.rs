//! Flat-earth conversions between meters and degrees.
//!
//! Two different approximations are used on purpose:
//! - segment lengths treat one degree as 111,320 m on both axes, with no
//!   cosine correction for longitude;
//! - positional jitter converts meters to degrees with the longitude axis
//!   scaled by `cos(latitude)`.
//!
//! Both are only reasonable for short segments away from the poles.

use crate::models::Waypoint;

/// Meters per degree used by both approximations.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Euclidean distance between two points in degree space, scaled to meters.
pub fn planar_distance_m(a: Waypoint, b: Waypoint) -> f64 {
    (b.lat - a.lat).hypot(b.lon - a.lon) * METERS_PER_DEGREE
}

/// Converts a metric displacement at `lat` into `(d_lat, d_lon)` degrees.
///
/// `dx_m` points east, `dy_m` points north.
pub fn meters_to_degrees(lat: f64, dx_m: f64, dy_m: f64) -> (f64, f64) {
    let d_lat = dy_m / METERS_PER_DEGREE;
    let d_lon = dx_m / (METERS_PER_DEGREE * lat.to_radians().cos());
    (d_lat, d_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_latitude() {
        let equator = planar_distance_m(Waypoint::new(0.0, 0.0), Waypoint::new(0.0, 0.001));
        let north = planar_distance_m(Waypoint::new(60.0, 0.0), Waypoint::new(60.0, 0.001));
        assert!((equator - 111.32).abs() < 1e-9);
        assert!((equator - north).abs() < 1e-9);
    }

    #[test]
    fn test_meters_to_degrees_scales_longitude() {
        let (d_lat, d_lon) = meters_to_degrees(60.0, 1.0, 1.0);
        assert!((d_lat - 1.0 / METERS_PER_DEGREE).abs() < 1e-15);
        // cos(60°) = 0.5 doubles the longitude delta
        assert!((d_lon - 2.0 / METERS_PER_DEGREE).abs() < 1e-12);
    }
}
