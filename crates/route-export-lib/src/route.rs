//! Route input model
//!
//! This module provides the structures handed over by the routing service:
//! a [`RouteResult`] holding one or more [`Route`]s, each made of [`Leg`]s
//! and [`Step`]s whose geometry is either an explicit path or an encoded
//! polyline.

use crate::geodesy;
use crate::polyline::PolylineDecoder;
use crate::{ExportError, Result};
use std::borrow::Cow;

/// A geographic position in degrees (WGS84)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    #[inline]
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    #[inline]
    fn from(point: GeoPoint) -> Self {
        point.to_point()
    }
}

/// Geometry of a single step, as delivered by the routing service
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StepGeometry {
    /// Explicit ordered point sequence
    Path(Vec<GeoPoint>),
    /// Compact encoded polyline that must be decoded first
    Polyline(String),
}

/// One drivable piece of a leg
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub geometry: StepGeometry,
}

impl Step {
    pub fn from_path(path: Vec<GeoPoint>) -> Self {
        Self {
            geometry: StepGeometry::Path(path),
        }
    }

    pub fn from_polyline(encoded: impl Into<String>) -> Self {
        Self {
            geometry: StepGeometry::Polyline(encoded.into()),
        }
    }

    /// Resolve the step into an explicit path, decoding if needed
    pub fn resolve_path<'a>(&'a self, decoder: &dyn PolylineDecoder) -> Result<Cow<'a, [GeoPoint]>> {
        match &self.geometry {
            StepGeometry::Path(path) => Ok(Cow::Borrowed(path.as_slice())),
            StepGeometry::Polyline(encoded) => Ok(Cow::Owned(decoder.decode(encoded)?)),
        }
    }
}

/// Route section between two waypoints
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub steps: Vec<Step>,
    /// Distance reported by the routing service, in meters
    #[cfg_attr(feature = "serde", serde(default))]
    pub distance_meters: Option<f64>,
    /// Travel time reported by the routing service, in seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_seconds: Option<f64>,
}

impl Leg {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }
}

/// A complete driving route
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub legs: Vec<Leg>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Route {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    /// Build a route from GPX data
    ///
    /// Every track becomes a leg and every track segment one of its steps.
    /// GPX `<rte>` elements become single-step legs after the tracks.
    pub fn from_gpx(gpx_data: &gpx::Gpx) -> Result<Self> {
        let to_path = |points: &[gpx::Waypoint]| -> Vec<GeoPoint> {
            points.iter().map(|w| GeoPoint::from(w.point())).collect()
        };

        let mut legs: Vec<Leg> = gpx_data
            .tracks
            .iter()
            .map(|track| {
                Leg::new(
                    track
                        .segments
                        .iter()
                        .map(|segment| Step::from_path(to_path(&segment.points)))
                        .collect(),
                )
            })
            .collect();

        legs.extend(
            gpx_data
                .routes
                .iter()
                .map(|route| Leg::new(vec![Step::from_path(to_path(&route.points))])),
        );

        let route = Self::new(legs);
        if route.steps().all(|step| match &step.geometry {
            StepGeometry::Path(path) => path.is_empty(),
            StepGeometry::Polyline(_) => false,
        }) {
            return Err(ExportError::EmptyGpx);
        }
        Ok(route)
    }

    /// Iterate over all steps in leg/step order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }

    /// Total number of raw points across all steps
    pub fn point_count(&self, decoder: &dyn PolylineDecoder) -> Result<usize> {
        self.steps()
            .map(|step| step.resolve_path(decoder).map(|path| path.len()))
            .sum()
    }

    /// Sum of great-circle distances along every step, in meters
    pub fn total_distance(&self, decoder: &dyn PolylineDecoder) -> Result<f64> {
        let mut total = 0.0;
        for step in self.steps() {
            let path = step.resolve_path(decoder)?;
            total += path
                .windows(2)
                .map(|pair| geodesy::distance(pair[0], pair[1]))
                .sum::<f64>();
        }
        Ok(total)
    }
}

/// Response of the routing service; only the first route is ever used
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    #[cfg_attr(feature = "serde", serde(default))]
    pub routes: Vec<Route>,
}

impl RouteResult {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The primary route; alternates are ignored
    #[inline]
    pub fn primary(&self) -> Option<&Route> {
        self.routes.first()
    }
}

impl From<Route> for RouteResult {
    fn from(route: Route) -> Self {
        Self::new(vec![route])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline::{EncodedPolylineDecoder, encode};
    use gpx::{Gpx, Track, TrackSegment, Waypoint};

    fn create_test_waypoint(lat: f64, lon: f64) -> Waypoint {
        Waypoint::new(geo::Point::new(lon, lat))
    }

    fn create_test_gpx() -> Gpx {
        let mut gpx = Gpx::default();
        let mut track = Track::default();
        let mut first = TrackSegment::default();
        let mut second = TrackSegment::default();

        first.points.push(create_test_waypoint(24.7136, 46.6753));
        first.points.push(create_test_waypoint(24.7140, 46.6760));
        second.points.push(create_test_waypoint(24.7150, 46.6770));

        track.segments.push(first);
        track.segments.push(second);
        gpx.tracks.push(track);
        gpx
    }

    #[test]
    fn test_geo_point_conversion() {
        let p = GeoPoint::new(24.5, 46.25);
        let geo_point = p.to_point();
        assert_eq!(geo_point.x(), 46.25);
        assert_eq!(geo_point.y(), 24.5);
        assert_eq!(GeoPoint::from(geo_point), p);
    }

    #[test]
    fn test_route_from_gpx() {
        let route = Route::from_gpx(&create_test_gpx()).unwrap();
        assert_eq!(route.legs.len(), 1);
        assert_eq!(route.legs[0].steps.len(), 2);
        assert_eq!(route.point_count(&EncodedPolylineDecoder::default()).unwrap(), 3);
    }

    #[test]
    fn test_empty_gpx_fails() {
        let result = Route::from_gpx(&Gpx::default());
        assert!(matches!(result, Err(ExportError::EmptyGpx)));
    }

    #[test]
    fn test_resolve_encoded_step() {
        let path = vec![GeoPoint::new(38.5, -120.2), GeoPoint::new(40.7, -120.95)];
        let step = Step::from_polyline(encode(&path));
        let decoded = step.resolve_path(&EncodedPolylineDecoder::default()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!((decoded[1].lat - 40.7).abs() < 1e-5);
        assert!((decoded[1].lng + 120.95).abs() < 1e-5);
    }

    #[test]
    fn test_total_distance() {
        let route = Route::from_gpx(&create_test_gpx()).unwrap();
        let distance = route.total_distance(&EncodedPolylineDecoder::default()).unwrap();
        // Only the first segment has a pair of points, less than 100 m apart
        assert!(distance > 0.0);
        assert!(distance < 100.0);
    }

    #[test]
    fn test_primary_route_ignores_alternates() {
        let main = Route::new(vec![Leg::new(vec![Step::from_path(vec![GeoPoint::new(1.0, 2.0)])])]);
        let alternate = Route::default();
        let result = RouteResult::new(vec![main.clone(), alternate]);
        assert_eq!(result.primary(), Some(&main));
        assert!(RouteResult::default().primary().is_none());
    }
}
