//! Curvature classification of step paths
//!
//! Two signals are evaluated on the headings along a path: the cumulative
//! signed turn (a loop close to a full revolution marks a roundabout) and
//! the largest single turn (a sharp corner). The cumulative signal wins
//! when both fire.

use crate::GeoPoint;
use crate::geodesy::{self, COINCIDENT_EPSILON_M, turn_angle};

/// Shape of a step path as far as sampling density is concerned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathShape {
    #[default]
    Straight,
    SharpTurn,
    Roundabout,
}

impl PathShape {
    /// Whether the source geometry needs densifying beyond its own vertices
    #[inline]
    pub fn is_complex(self) -> bool {
        !matches!(self, PathShape::Straight)
    }
}

/// Thresholds used by [`classify`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifierConfig {
    /// Any single turn above this (degrees, absolute) flags a sharp turn
    pub sharp_turn_degrees: f64,
    /// Lower bound (exclusive) of the absolute cumulative turn for a roundabout
    pub roundabout_min_degrees: f64,
    /// Upper bound (exclusive) of the absolute cumulative turn for a roundabout
    pub roundabout_max_degrees: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sharp_turn_degrees: 30.0,
            roundabout_min_degrees: 250.0,
            roundabout_max_degrees: 370.0,
        }
    }
}

/// Minimum number of points for sharp-turn detection
pub const MIN_POINTS_SHARP_TURN: usize = 3;

/// Minimum number of points for roundabout detection
pub const MIN_POINTS_ROUNDABOUT: usize = 4;

/// `path` without points that coincide with the previous kept point
///
/// Zero-length segments have no direction of travel, so they must not
/// contribute a heading to turn measurements.
pub fn distinct_vertices(path: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut vertices: Vec<GeoPoint> = Vec::with_capacity(path.len());
    for &point in path {
        match vertices.last() {
            Some(&last) if geodesy::distance(last, point) < COINCIDENT_EPSILON_M => {}
            _ => vertices.push(point),
        }
    }
    vertices
}

/// Signed turn angle at every interior vertex of `path`, ignoring repeated points
pub fn turn_angles(path: &[GeoPoint]) -> Vec<f64> {
    distinct_vertices(path)
        .windows(3)
        .map(|w| turn_angle(w[0], w[1], w[2]))
        .collect()
}

/// Classify a path, checking for a roundabout before looking for sharp turns
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn classify(path: &[GeoPoint], config: &ClassifierConfig) -> PathShape {
    let vertices = distinct_vertices(path);
    if vertices.len() < MIN_POINTS_SHARP_TURN {
        return PathShape::Straight;
    }

    let mut cumulative = 0.0;
    let mut sharpest: f64 = 0.0;
    for angle in vertices.windows(3).map(|w| turn_angle(w[0], w[1], w[2])) {
        cumulative += angle;
        sharpest = sharpest.max(angle.abs());
    }

    if vertices.len() >= MIN_POINTS_ROUNDABOUT {
        let total = cumulative.abs();
        if total > config.roundabout_min_degrees && total < config.roundabout_max_degrees {
            return PathShape::Roundabout;
        }
    }

    if sharpest > config.sharp_turn_degrees {
        PathShape::SharpTurn
    } else {
        PathShape::Straight
    }
}
