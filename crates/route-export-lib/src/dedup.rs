//! Removal of consecutive near-identical points

use crate::GeoPoint;

/// Default tolerance in degrees on each axis (roughly one meter)
pub const DEFAULT_TOLERANCE_DEG: f64 = 1e-5;

/// Whether `candidate` is indistinguishable from `retained` on both axes
#[inline]
pub fn is_near_duplicate(retained: GeoPoint, candidate: GeoPoint, tolerance: f64) -> bool {
    let d_lat = (candidate.lat - retained.lat).abs();
    let d_lng = (candidate.lng - retained.lng).abs();
    (d_lat == 0.0 && d_lng == 0.0) || (d_lat < tolerance && d_lng < tolerance)
}

/// Drop every point that is a near duplicate of the last retained point
///
/// The first point is always kept and order is preserved.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn dedup_points(points: &[GeoPoint], tolerance: f64) -> Vec<GeoPoint> {
    let mut retained: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for &point in points {
        match retained.last() {
            Some(&last) if is_near_duplicate(last, point, tolerance) => {}
            _ => retained.push(point),
        }
    }

    tracing::debug!(
        "Deduplicated {} points down to {}",
        points.len(),
        retained.len()
    );
    retained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        assert!(dedup_points(&[], DEFAULT_TOLERANCE_DEG).is_empty());
        let p = GeoPoint::new(1.0, 2.0);
        assert_eq!(dedup_points(&[p], DEFAULT_TOLERANCE_DEG), vec![p]);
    }

    #[test]
    fn test_drops_consecutive_near_duplicates() {
        let a = GeoPoint::new(24.000000, 46.000000);
        let a2 = GeoPoint::new(24.000004, 46.000003);
        let b = GeoPoint::new(24.001000, 46.000000);
        let points = dedup_points(&[a, a, a2, b, b], DEFAULT_TOLERANCE_DEG);
        assert_eq!(points, vec![a, b]);
    }

    #[test]
    fn test_one_axis_move_is_kept() {
        let a = GeoPoint::new(24.0, 46.0);
        let b = GeoPoint::new(24.0, 46.00005);
        assert_eq!(dedup_points(&[a, b], DEFAULT_TOLERANCE_DEG), vec![a, b]);
    }

    #[test]
    fn test_compares_against_last_retained() {
        // Each step is below tolerance, but the drift adds up past it
        let points: Vec<GeoPoint> = (0..5)
            .map(|i| GeoPoint::new(24.0 + i as f64 * 6e-6, 46.0 + i as f64 * 6e-6))
            .collect();
        let retained = dedup_points(&points, DEFAULT_TOLERANCE_DEG);
        assert_eq!(retained, vec![points[0], points[2], points[4]]);
    }

    #[test]
    fn test_non_consecutive_repeats_are_kept() {
        let a = GeoPoint::new(24.0, 46.0);
        let b = GeoPoint::new(24.1, 46.1);
        assert_eq!(dedup_points(&[a, b, a], DEFAULT_TOLERANCE_DEG), vec![a, b, a]);
    }

    #[test]
    fn test_retained_points_respect_tolerance() {
        let points: Vec<GeoPoint> = (0..200)
            .map(|i| GeoPoint::new(24.0 + (i as f64 * 0.37).sin() * 3e-5, 46.0 + i as f64 * 2e-6))
            .collect();
        let retained = dedup_points(&points, DEFAULT_TOLERANCE_DEG);
        for pair in retained.windows(2) {
            assert!(!is_near_duplicate(pair[0], pair[1], DEFAULT_TOLERANCE_DEG));
        }
    }

    #[test]
    fn test_zero_tolerance_drops_exact_repeats_only() {
        let a = GeoPoint::new(24.0, 46.0);
        let b = GeoPoint::new(24.0, 46.0000001);
        assert_eq!(dedup_points(&[a, a, b], 0.0), vec![a, b]);
    }
}
