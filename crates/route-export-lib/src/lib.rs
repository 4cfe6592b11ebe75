//! Route Export Library - Adaptive Resampling and Chunked Archiving of Driving Routes
//!
//! This library turns a computed driving route into a zip archive of plain
//! text coordinate lists. Sharp turns and roundabouts are sampled densely,
//! long straight stretches sparsely, near-identical points are dropped and
//! the result is split into parts that fit a character budget.
//!
//! # Architecture
//!
//! - **[`geodesy`]**: Headings, distances and interpolation on the sphere
//! - **[`classify`]**: Straight / sharp turn / roundabout decision per step
//! - **[`resample`]**: Per-step densification driven by the classification
//! - **[`dedup`]**: Removal of consecutive near-identical points
//! - **[`chunk`]**: Budget-bounded partition of the formatted coordinates
//! - **[`package`]**: Zip archive with one `route-part-<n>.txt` per chunk
//! - **[`RouteExporter`]**: Runs the stages above on the primary route
//! - **[`RoutingSession`]**: Two-marker routing flow feeding the exporter
//!
//! # Data Flow
//!
//! Route → (per step) resample(classify) → concatenated points → dedup →
//! chunk → package → [`Archive`]

pub mod chunk;
pub mod classify;
pub mod dedup;
mod export;
pub mod geodesy;
pub mod package;
pub mod polyline;
pub mod resample;
mod route;
mod session;

// Public API exports
pub use chunk::{Chunk, FormattedCoordinate};
pub use classify::{ClassifierConfig, PathShape};
pub use export::{Config, ExportOutcome, ExportPlan, ExportStats, NO_ROUTE_MESSAGE, RouteExporter};
pub use package::Archive;
pub use polyline::{EncodedPolylineDecoder, PolylineDecoder};
pub use route::{GeoPoint, Leg, Route, RouteResult, Step, StepGeometry};
pub use session::{
    MapDefaults, Marker, RequestId, RoutingSession, SessionEffect, SessionState, route_summary,
};

/// Error types for the export pipeline
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid encoded polyline at byte {position}: {reason}")]
    InvalidPolyline { position: usize, reason: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("GPX data contains no points")]
    EmptyGpx,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Background task failed: {0}")]
    TaskJoin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
