//! Great-circle distance between geographic coordinates.
//!
//! Coordinates are carried as [`geo::Point`] with `x` = longitude and
//! `y` = latitude in decimal degrees, matching the rest of the crate.

use geo::Point;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Returns the great-circle distance between two points in meters,
/// using the spherical law of cosines.
///
/// Identical points short-circuit to exactly `0.0` without a trig
/// round-trip.
#[must_use]
pub fn distance(from: Point<f64>, to: Point<f64>) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat_from = from.y().to_radians();
    let lat_to = to.y().to_radians();
    let delta_lng = (from.x() - to.x()).abs().to_radians();

    (lat_from.sin() * lat_to.sin() + lat_from.cos() * lat_to.cos() * delta_lng.cos()).acos()
        * EARTH_RADIUS
}
