//! Reporter configuration.
//!
//! All options are supplied at construction; there is no CLI or environment
//! variable surface. Defaults match the conventional report layout.

use std::path::PathBuf;

/// Default output root directory
pub const DEFAULT_DESTINATION: &str = "e2eReport";

/// Default report file name, reserved for a rendering layer
pub const DEFAULT_REPORT_FILENAME: &str = "report.html";

/// Options recognized by the reporter
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Root directory all artifacts are written under
    pub dest: PathBuf,

    /// Report file name; carried in the configuration for rendering layers,
    /// not consumed by the reporter itself
    pub filename: String,

    /// When true, screenshots are captured only for failed specs; by
    /// default every completed spec that is not pending or disabled is
    /// captured
    pub capture_only_failed_specs: bool,

    /// When true, the destination root is purged before the first artifact
    /// of a run is written
    pub clean_destination: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            dest: PathBuf::from(DEFAULT_DESTINATION),
            filename: DEFAULT_REPORT_FILENAME.to_string(),
            capture_only_failed_specs: false,
            clean_destination: true,
        }
    }
}

impl ReporterConfig {
    /// Create a configuration with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output root directory
    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    /// Set the report file name
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Restrict screenshot capture to failed specs
    pub fn capture_only_failed_specs(mut self, only_failed: bool) -> Self {
        self.capture_only_failed_specs = only_failed;
        self
    }

    /// Set whether the destination root is purged before a run
    pub fn clean_destination(mut self, clean: bool) -> Self {
        self.clean_destination = clean;
        self
    }
}
