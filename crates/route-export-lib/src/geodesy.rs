//! Geodesic primitives on a spherical Earth
//!
//! Thin wrappers over `geo`'s haversine measure that give every input a
//! defined result: coincident points get a heading of 0 and interpolation
//! hits both endpoints exactly.

use crate::GeoPoint;
use geo::{Bearing, Destination, Distance, Haversine, InterpolatePoint, Point};

/// Distances below this (meters) are treated as coincident points
pub const COINCIDENT_EPSILON_M: f64 = 1e-9;

/// Heading returned when the two points coincide
pub const DEGENERATE_HEADING: f64 = 0.0;

/// Initial bearing from `a` to `b` along the great circle, in degrees `[0, 360)`
///
/// Returns [`DEGENERATE_HEADING`] when the points are (nearly) identical.
#[inline]
pub fn heading(a: GeoPoint, b: GeoPoint) -> f64 {
    if distance(a, b) < COINCIDENT_EPSILON_M {
        return DEGENERATE_HEADING;
    }
    let bearing = Haversine.bearing(a.to_point(), b.to_point());
    if !bearing.is_finite() {
        return DEGENERATE_HEADING;
    }
    let wrapped = bearing.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Great-circle distance between two points in meters
#[inline]
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// Point `fraction` of the way from `a` to `b` along the great circle
///
/// `fraction` is clamped to `[0, 1]`; the endpoints are returned verbatim.
/// For antipodal pairs, where the great circle is not unique, the path
/// leaving `a` due north is used.
pub fn interpolate(a: GeoPoint, b: GeoPoint, fraction: f64) -> GeoPoint {
    if fraction.is_nan() || fraction <= 0.0 {
        return a;
    }
    if fraction >= 1.0 {
        return b;
    }

    let total = distance(a, b);
    if total < COINCIDENT_EPSILON_M {
        return a;
    }

    let point: Point<f64> = Haversine.point_at_ratio_between(a.to_point(), b.to_point(), fraction);
    if point.x().is_finite() && point.y().is_finite() {
        return GeoPoint::from(point);
    }

    tracing::debug!(
        "Great circle between ({}, {}) and ({}, {}) is ambiguous, leaving northwards",
        a.lat,
        a.lng,
        b.lat,
        b.lng
    );
    GeoPoint::from(Haversine.destination(a.to_point(), 0.0, total * fraction))
}

/// Normalize a heading difference into `[-180, 180]`
#[inline]
pub fn normalize_turn(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    wrapped.clamp(-180.0, 180.0)
}

/// Signed turn at `p2` when travelling `p1 -> p2 -> p3`, in degrees `[-180, 180]`
///
/// Positive values turn clockwise (right), negative values counter-clockwise.
#[inline]
pub fn turn_angle(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint) -> f64 {
    normalize_turn(heading(p2, p3) - heading(p1, p2))
}
