//! Adaptive resampling of step paths
//!
//! Every step is classified on its own and walked pair by pair; long pairs
//! get evenly spaced great-circle points inserted so that no gap exceeds
//! the effective spacing. Roundabouts use a third of the base spacing.

use crate::classify::{PathShape, classify};
use crate::export::Config;
use crate::{GeoPoint, geodesy};

/// Divisor applied to the base spacing on roundabouts
pub const ROUNDABOUT_DENSITY_FACTOR: f64 = 3.0;

/// Relative slack when turning a distance into a number of intervals, so a
/// pair lying exactly N spacings apart is not split into N + 1 pieces
const INTERVAL_EPSILON: f64 = 1e-9;

/// Upper bound on points inserted between a single pair
pub const MAX_INSERTED_PER_PAIR: usize = 1_000_000;

/// Result of resampling a single step
#[derive(Debug, Clone, PartialEq)]
pub struct SampledStep {
    pub shape: PathShape,
    pub points: Vec<GeoPoint>,
}

/// Effective spacing (meters) for a path of the given shape
#[inline]
pub fn spacing_for(shape: PathShape, base_spacing: f64) -> f64 {
    match shape {
        PathShape::Roundabout => base_spacing / ROUNDABOUT_DENSITY_FACTOR,
        PathShape::Straight | PathShape::SharpTurn => base_spacing,
    }
}

/// Number of points to insert between two points `distance` meters apart
#[inline]
pub fn inserted_points(distance: f64, spacing: f64) -> usize {
    if !(spacing > 0.0) || !spacing.is_finite() || !(distance > spacing) {
        return 0;
    }
    let inserted = (distance / spacing * (1.0 - INTERVAL_EPSILON)).ceil() - 1.0;
    if inserted >= MAX_INSERTED_PER_PAIR as f64 {
        tracing::warn!(
            "Capping densification of a {distance:.1} m gap at {MAX_INSERTED_PER_PAIR} points (spacing {spacing} m)"
        );
        return MAX_INSERTED_PER_PAIR;
    }
    inserted.max(0.0) as usize
}

/// Resample `path` so consecutive points are at most `spacing` meters apart
///
/// Paths with fewer than two points produce nothing.
pub fn resample_path(path: &[GeoPoint], spacing: f64) -> Vec<GeoPoint> {
    let Some(&last) = path.last() else {
        return Vec::new();
    };
    if path.len() < 2 {
        return Vec::new();
    }

    let mut output = Vec::with_capacity(path.len());
    for pair in path.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        output.push(start);

        let inserted = inserted_points(geodesy::distance(start, end), spacing);
        let intervals = (inserted + 1) as f64;
        output.extend((1..=inserted).map(|j| geodesy::interpolate(start, end, j as f64 / intervals)));
    }
    output.push(last);

    output
}

/// Classify and resample a single step
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resample_step(path: &[GeoPoint], config: &Config) -> SampledStep {
    if path.len() < 2 {
        tracing::debug!("Skipping degenerate step with {} point(s)", path.len());
        return SampledStep {
            shape: PathShape::Straight,
            points: Vec::new(),
        };
    }

    let shape = classify(path, &config.classifier);
    let points = if shape == PathShape::Straight && !config.resample_straight {
        path.to_vec()
    } else {
        resample_path(path, spacing_for(shape, config.point_spacing))
    };

    SampledStep { shape, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Destination, Haversine};

    fn offset(origin: GeoPoint, bearing: f64, meters: f64) -> GeoPoint {
        GeoPoint::from(Haversine.destination(origin.to_point(), bearing, meters))
    }

    fn config(spacing: f64) -> Config {
        Config {
            point_spacing: spacing,
            ..Config::default()
        }
    }

    #[test]
    fn test_spacing_for_shape() {
        assert_eq!(spacing_for(PathShape::Straight, 90.0), 90.0);
        assert_eq!(spacing_for(PathShape::SharpTurn, 90.0), 90.0);
        assert_eq!(spacing_for(PathShape::Roundabout, 90.0), 30.0);
    }

    #[test]
    fn test_inserted_points() {
        assert_eq!(inserted_points(50.0, 100.0), 0);
        assert_eq!(inserted_points(100.0, 100.0), 0);
        assert_eq!(inserted_points(150.0, 100.0), 1);
        assert_eq!(inserted_points(200.0, 100.0), 1);
        assert_eq!(inserted_points(200.0000001, 100.0), 1);
        assert_eq!(inserted_points(250.0, 100.0), 2);
        assert_eq!(inserted_points(1000.0, 0.0), 0);
        assert_eq!(inserted_points(1000.0, -5.0), 0);
        assert_eq!(inserted_points(f64::NAN, 10.0), 0);
    }

    #[test]
    fn test_inserted_points_cap_counts_inserted_points() {
        assert_eq!(inserted_points(1_000_000.0, 1.0), MAX_INSERTED_PER_PAIR - 1);
        assert_eq!(inserted_points(1_000_001.0, 1.0), MAX_INSERTED_PER_PAIR);
        assert_eq!(inserted_points(1e12, 1.0), MAX_INSERTED_PER_PAIR);
    }

    #[test]
    fn test_two_points_200m_one_midpoint() {
        let a = GeoPoint::new(24.7136, 46.6753);
        let b = offset(a, 45.0, 200.0);
        let points = resample_path(&[a, b], 100.0);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0], a);
        assert_eq!(points[2], b);
        assert!((geodesy::distance(a, points[1]) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_gaps_never_exceed_spacing() {
        let a = GeoPoint::new(21.4858, 39.1925);
        let b = offset(a, 120.0, 1234.5);
        let c = offset(b, 10.0, 77.0);
        let points = resample_path(&[a, b, c], 100.0);

        for pair in points.windows(2) {
            assert!(geodesy::distance(pair[0], pair[1]) <= 100.0 + 1e-6);
        }
        assert_eq!(points.first(), Some(&a));
        assert_eq!(points.last(), Some(&c));
        assert!(points.contains(&b));
    }

    #[test]
    fn test_degenerate_paths_contribute_nothing() {
        assert!(resample_path(&[], 100.0).is_empty());
        assert!(resample_path(&[GeoPoint::new(1.0, 1.0)], 100.0).is_empty());
        let step = resample_step(&[GeoPoint::new(1.0, 1.0)], &config(100.0));
        assert!(step.points.is_empty());
    }

    #[test]
    fn test_zero_length_segments_are_kept() {
        let p = GeoPoint::new(24.0, 46.0);
        let points = resample_path(&[p, p, p], 10.0);
        assert_eq!(points, vec![p, p, p]);
    }

    #[test]
    fn test_repeated_point_keeps_straight_density() {
        let a = GeoPoint::new(24.0, 46.0);
        let b = offset(a, 180.0, 120.0);
        let c = offset(b, 180.0, 120.0);

        let plain = resample_step(&[a, b, c], &config(10.0));
        let repeated = resample_step(&[a, b, b, c], &config(10.0));
        assert_eq!(plain.shape, PathShape::Straight);
        assert_eq!(repeated.shape, PathShape::Straight);
        // Only the repeated vertex itself is added
        assert_eq!(repeated.points.len(), plain.points.len() + 1);
    }

    #[test]
    fn test_roundabout_samples_three_times_denser() {
        let center = GeoPoint::new(24.7, 46.7);
        // 300 degree loop, 31 vertices about 10.5 m apart on a 60 m radius
        let roundabout: Vec<GeoPoint> = (0..31)
            .map(|i| offset(center, i as f64 * 10.0, 60.0))
            .collect();
        let spacing = 9.0;

        let step = resample_step(&roundabout, &config(spacing));
        assert_eq!(step.shape, PathShape::Roundabout);

        // Same pair gaps treated as a plain path at the base spacing
        let plain = resample_path(&roundabout, spacing);
        let dense = resample_path(&roundabout, spacing / 3.0);
        assert_eq!(step.points, dense);
        assert!(step.points.len() > plain.len());

        for pair in step.points.windows(2) {
            assert!(geodesy::distance(pair[0], pair[1]) <= spacing / 3.0 + 1e-6);
        }
    }

    #[test]
    fn test_straight_passthrough_when_disabled() {
        let a = GeoPoint::new(24.0, 46.0);
        let b = offset(a, 0.0, 1000.0);
        let c = offset(b, 0.0, 1000.0);
        let path = [a, b, c];

        let cfg = Config {
            resample_straight: false,
            ..config(100.0)
        };
        let step = resample_step(&path, &cfg);
        assert_eq!(step.shape, PathShape::Straight);
        assert_eq!(step.points, path.to_vec());

        let step = resample_step(&path, &config(100.0));
        assert_eq!(step.points.len(), 21);
    }
}
