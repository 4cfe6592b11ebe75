use clap::Parser;
use route_export_lib::{ClassifierConfig, Config};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Export - Turn a driving route into a zip archive of coordinate lists
pub struct Settings {
    /// Routing service response (JSON) to export
    #[clap(short, long, value_name = "FILE", conflicts_with = "gpx")]
    pub route: Option<PathBuf>,

    /// GPX file to export instead of a routing response
    #[clap(short, long, value_name = "FILE")]
    pub gpx: Option<PathBuf>,

    /// Where to write the archive (default: ./route-export.zip)
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Base spacing between exported points, in meters
    #[clap(short, long, default_value = "100000")]
    pub spacing: f64,

    /// Maximum characters per archive entry
    #[clap(short, long, default_value = "9000")]
    pub budget: usize,

    /// Per-axis tolerance in degrees for merging consecutive points
    #[clap(long, default_value = "0.00001")]
    pub dedup_tolerance: f64,

    /// Densify straight steps too, not only turns and roundabouts
    #[clap(long, default_value = "true", action = clap::ArgAction::Set)]
    pub densify_straight: bool,

    /// Turn angle in degrees above which a step counts as a sharp turn
    #[clap(long, default_value = "30")]
    pub sharp_turn: f64,
}

impl Settings {
    /// Parse from the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Pipeline configuration described by these settings
    pub fn export_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            point_spacing: self.spacing,
            char_budget: self.budget,
            dedup_tolerance: self.dedup_tolerance,
            resample_straight: self.densify_straight,
            classifier: ClassifierConfig {
                sharp_turn_degrees: self.sharp_turn,
                ..ClassifierConfig::default()
            },
            archive_name: self
                .output
                .as_ref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or(defaults.archive_name),
        }
    }

    /// Path the archive is written to
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(route_export_lib::package::DEFAULT_ARCHIVE_NAME))
    }
}
