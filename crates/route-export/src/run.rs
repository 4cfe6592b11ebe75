//! Load the route, run the export and write the archive

use crate::settings::Settings;
use route_export_lib::{ExportError, ExportOutcome, Route, RouteExporter, RouteResult};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Invalid route file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AppError + '_ {
    move |source| AppError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Read the route named by the settings, if any
pub async fn load_route(settings: &Settings) -> Result<Option<RouteResult>, AppError> {
    if let Some(path) = &settings.route {
        let text = tokio::fs::read_to_string(path).await.map_err(io_error(path))?;
        let result: RouteResult = serde_json::from_str(&text)?;
        tracing::info!(
            "Loaded {} route(s) from {}",
            result.routes.len(),
            path.display()
        );
        return Ok(Some(result));
    }

    if let Some(path) = &settings.gpx {
        let bytes = tokio::fs::read(path).await.map_err(io_error(path))?;
        let gpx_data = gpx::read(std::io::Cursor::new(bytes)).map_err(ExportError::from)?;
        let route = Route::from_gpx(&gpx_data)?;
        tracing::info!("Loaded {} leg(s) from {}", route.legs.len(), path.display());
        return Ok(Some(route.into()));
    }

    Ok(None)
}

/// Run one export and write the archive when there is one
pub async fn run(settings: &Settings) -> Result<ExportOutcome, AppError> {
    let config = settings.export_config();
    config.validate()?;

    let result = load_route(settings).await?;
    let exporter = RouteExporter::new(config);
    let outcome = exporter.export_async(result.as_ref()).await?;

    if let Some(archive) = outcome.archive() {
        let path = settings.output_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error(parent))?;
        }
        tokio::fs::write(&path, archive.bytes())
            .await
            .map_err(io_error(&path))?;
        tracing::info!(
            "Wrote {} ({} bytes, {} parts)",
            path.display(),
            archive.bytes().len(),
            archive.entries().len()
        );
    }

    Ok(outcome)
}
