//! Export orchestration
//!
//! [`RouteExporter`] runs the whole pipeline on the primary route of a
//! [`RouteResult`]: per-step classification and resampling, deduplication
//! of the concatenated points, formatting, chunking and packaging.

use crate::chunk::{self, Chunk, FormattedCoordinate};
use crate::classify::{ClassifierConfig, PathShape};
use crate::package::{self, Archive};
use crate::polyline::{EncodedPolylineDecoder, PolylineDecoder};
use crate::{ExportError, GeoPoint, Result, Route, RouteResult, dedup, resample};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status shown when there is nothing to export
pub const NO_ROUTE_MESSAGE: &str = "No route to export";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Base spacing between exported points, in meters.
    /// Non-positive values disable densification.
    /// Default: 100 000
    pub point_spacing: f64,
    /// Maximum characters per archive entry (soft limit).
    /// Zero puts everything in one entry.
    /// Default: 9000
    pub char_budget: usize,
    /// Per-axis tolerance in degrees below which consecutive points merge.
    /// Default: 1e-5
    pub dedup_tolerance: f64,
    /// Also densify steps classified as straight. When false those steps are
    /// exported with their original vertices only.
    /// Default: true
    pub resample_straight: bool,
    /// Curvature thresholds
    pub classifier: ClassifierConfig,
    /// File name given to the produced archive
    pub archive_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_spacing: 100_000.0,
            char_budget: chunk::DEFAULT_CHAR_BUDGET,
            dedup_tolerance: dedup::DEFAULT_TOLERANCE_DEG,
            resample_straight: true,
            classifier: ClassifierConfig::default(),
            archive_name: package::DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Reject values an operator most likely mistyped
    ///
    /// The pipeline runs with any configuration; this is for callers that
    /// want to refuse nonsensical input up front.
    pub fn validate(&self) -> Result<()> {
        if !(self.point_spacing > 0.0) || !self.point_spacing.is_finite() {
            return Err(ExportError::InvalidConfig(format!(
                "point spacing must be a positive number of meters, got {}",
                self.point_spacing
            )));
        }
        if self.char_budget == 0 {
            return Err(ExportError::InvalidConfig(
                "character budget must be positive".to_string(),
            ));
        }
        if !(self.dedup_tolerance >= 0.0) || !self.dedup_tolerance.is_finite() {
            return Err(ExportError::InvalidConfig(format!(
                "dedup tolerance must be a non-negative number of degrees, got {}",
                self.dedup_tolerance
            )));
        }
        let c = &self.classifier;
        if c.roundabout_min_degrees >= c.roundabout_max_degrees {
            return Err(ExportError::InvalidConfig(format!(
                "roundabout range ({}, {}) is empty",
                c.roundabout_min_degrees, c.roundabout_max_degrees
            )));
        }
        if self.archive_name.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "archive name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters gathered while running the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportStats {
    /// Steps in the primary route
    pub steps: usize,
    /// Steps skipped for having fewer than two points
    pub degenerate_steps: usize,
    pub sharp_turn_steps: usize,
    pub roundabout_steps: usize,
    /// Points in the source geometry
    pub source_points: usize,
    /// Points after resampling, before deduplication
    pub sampled_points: usize,
    /// Points left after deduplication
    pub exported_points: usize,
}

/// Intermediate result: everything but the archive
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub coordinates: Vec<FormattedCoordinate>,
    pub chunks: Vec<Chunk>,
    pub stats: ExportStats,
}

/// What an export call produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// No route, or a route without any usable geometry
    NoRoute,
    Exported { archive: Archive, stats: ExportStats },
}

impl ExportOutcome {
    /// Number of archive entries written
    pub fn parts(&self) -> usize {
        match self {
            ExportOutcome::NoRoute => 0,
            ExportOutcome::Exported { archive, .. } => archive.entries().len(),
        }
    }

    pub fn archive(&self) -> Option<&Archive> {
        match self {
            ExportOutcome::NoRoute => None,
            ExportOutcome::Exported { archive, .. } => Some(archive),
        }
    }

    /// User-facing status line
    pub fn status_message(&self) -> String {
        match self {
            ExportOutcome::NoRoute => NO_ROUTE_MESSAGE.to_string(),
            ExportOutcome::Exported { .. } => format!("Route exported in {} parts", self.parts()),
        }
    }
}

/// Runs the export pipeline with a fixed configuration
#[derive(Debug, Clone)]
pub struct RouteExporter<D = EncodedPolylineDecoder> {
    config: Config,
    decoder: D,
}

impl RouteExporter {
    /// Exporter using the standard polyline decoder
    pub fn new(config: Config) -> Self {
        Self::with_decoder(config, EncodedPolylineDecoder::default())
    }
}

impl Default for RouteExporter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<D: PolylineDecoder> RouteExporter<D> {
    pub fn with_decoder(config: Config, decoder: D) -> Self {
        Self { config, decoder }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Resample every step of `route` and concatenate in leg/step order
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn collect_points(&self, route: &Route, stats: &mut ExportStats) -> Result<Vec<GeoPoint>> {
        let mut points = Vec::new();

        for step in route.steps() {
            #[cfg(feature = "profiling")]
            profiling::scope!("export::collect_points::step");
            let path = step.resolve_path(&self.decoder)?;
            stats.steps += 1;
            stats.source_points += path.len();
            if path.len() < 2 {
                stats.degenerate_steps += 1;
            }

            let sampled = resample::resample_step(&path, &self.config);
            match sampled.shape {
                PathShape::SharpTurn => stats.sharp_turn_steps += 1,
                PathShape::Roundabout => stats.roundabout_steps += 1,
                PathShape::Straight => {}
            }
            points.extend(sampled.points);
        }

        stats.sampled_points = points.len();
        Ok(points)
    }

    /// Run every stage except packaging
    ///
    /// Returns `None` when there is no primary route or it yields no points.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn plan(&self, result: Option<&RouteResult>) -> Result<Option<ExportPlan>> {
        let Some(route) = result.and_then(RouteResult::primary) else {
            tracing::info!("Export requested without a route");
            return Ok(None);
        };

        let mut stats = ExportStats::default();
        let sampled = self.collect_points(route, &mut stats)?;
        let retained = {
            #[cfg(feature = "profiling")]
            profiling::scope!("export::plan::dedup");
            dedup::dedup_points(&sampled, self.config.dedup_tolerance)
        };
        stats.exported_points = retained.len();

        if retained.is_empty() {
            tracing::info!("Route has no exportable geometry ({} steps)", stats.steps);
            return Ok(None);
        }

        #[cfg(feature = "profiling")]
        profiling::scope!("export::plan::chunk");
        let coordinates: Vec<FormattedCoordinate> =
            retained.into_iter().map(FormattedCoordinate::from).collect();
        let chunks = chunk::chunk_coordinates(&coordinates, self.config.char_budget);

        Ok(Some(ExportPlan {
            coordinates,
            chunks,
            stats,
        }))
    }

    /// Run the full pipeline synchronously
    pub fn export(&self, result: Option<&RouteResult>) -> Result<ExportOutcome> {
        let Some(plan) = self.plan(result)? else {
            return Ok(ExportOutcome::NoRoute);
        };
        let archive = package::package(&plan.chunks, &self.config.archive_name)?;
        Ok(self.finish(archive, plan.stats))
    }

    /// Run the full pipeline, compressing the archive on tokio's blocking pool
    pub async fn export_async(&self, result: Option<&RouteResult>) -> Result<ExportOutcome> {
        let Some(plan) = self.plan(result)? else {
            return Ok(ExportOutcome::NoRoute);
        };
        let archive = package::package_async(plan.chunks, self.config.archive_name.clone()).await?;
        Ok(self.finish(archive, plan.stats))
    }

    fn finish(&self, archive: Archive, stats: ExportStats) -> ExportOutcome {
        tracing::info!(
            "Exported {} points from {} steps into {} part(s) ({} sharp turns, {} roundabouts)",
            stats.exported_points,
            stats.steps,
            archive.entries().len(),
            stats.sharp_turn_steps,
            stats.roundabout_steps
        );
        ExportOutcome::Exported { archive, stats }
    }
}
