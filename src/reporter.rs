//! Lifecycle event handling.
//!
//! The runner delivers four events per suite/spec pair, in order:
//! suite started, spec started (per spec), spec done (per spec), suite
//! done. [`Reporter`] reacts to each by folding the event into the
//! registry, deriving timing and environment fields, and — on spec
//! completion — writing the JSON artifact and, policy permitting, a
//! screenshot.
//!
//! Every entry point is a failure boundary: reporting must never abort the
//! test run, so errors are caught, logged, and pushed onto a structured
//! diagnostics channel instead of being returned to the runner.

use std::path::PathBuf;

use base64::Engine;
use chrono::{DateTime, Utc};
use log::{debug, error};
use tokio::fs;

use crate::config::ReporterConfig;
use crate::driver::{Driver, DriverError};
use crate::records::{SpecEvent, SpecStatus, SuiteEvent, SuiteRecord};
use crate::registry::Registry;
use crate::storage::{self, sanitize_segment};

/// Result type for reporter internals
pub type ReporterResult<T> = Result<T, ReporterError>;

/// Errors caught at the lifecycle boundaries
#[derive(Debug)]
pub enum ReporterError {
    /// Directory creation, collision, or artifact write failure
    Io(std::io::Error),

    /// Capability or screenshot query failure
    Driver(DriverError),

    /// The driver's screenshot payload was not valid base64
    Screenshot(base64::DecodeError),

    /// Record serialization failure
    Serialization(serde_json::Error),

    /// Contract violation: a spec event arrived with no open suite
    NoActiveSuite {
        /// Id of the spec the runner delivered
        spec_id: String,
    },
}

impl std::fmt::Display for ReporterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReporterError::Io(err) => write!(f, "I/O error: {}", err),
            ReporterError::Driver(err) => write!(f, "Driver error: {}", err),
            ReporterError::Screenshot(err) => {
                write!(f, "Screenshot payload decode failed: {}", err)
            }
            ReporterError::Serialization(err) => write!(f, "Serialization error: {}", err),
            ReporterError::NoActiveSuite { spec_id } => {
                write!(f, "No suite is running for spec '{}'", spec_id)
            }
        }
    }
}

impl std::error::Error for ReporterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReporterError::Io(err) => Some(err),
            ReporterError::Driver(err) => Some(err),
            ReporterError::Screenshot(err) => Some(err),
            ReporterError::Serialization(err) => Some(err),
            ReporterError::NoActiveSuite { .. } => None,
        }
    }
}

impl From<std::io::Error> for ReporterError {
    fn from(err: std::io::Error) -> Self {
        ReporterError::Io(err)
    }
}

impl From<DriverError> for ReporterError {
    fn from(err: DriverError) -> Self {
        ReporterError::Driver(err)
    }
}

impl From<base64::DecodeError> for ReporterError {
    fn from(err: base64::DecodeError) -> Self {
        ReporterError::Screenshot(err)
    }
}

impl From<serde_json::Error> for ReporterError {
    fn from(err: serde_json::Error) -> Self {
        ReporterError::Serialization(err)
    }
}

/// Which entry point a diagnostic was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    SuiteStarted,
    SpecStarted,
    SpecDone,
    SuiteDone,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            LifecyclePhase::SuiteStarted => "suite started",
            LifecyclePhase::SpecStarted => "spec started",
            LifecyclePhase::SpecDone => "spec done",
            LifecyclePhase::SuiteDone => "suite done",
        };
        f.write_str(phase)
    }
}

/// One caught handler failure
#[derive(Debug)]
pub struct Diagnostic {
    /// Entry point the failure was caught in
    pub phase: LifecyclePhase,

    /// Id of the suite or spec being processed
    pub subject_id: String,

    /// What went wrong
    pub error: ReporterError,
}

/// The reporter: one instance per test run.
///
/// Holds all run state explicitly — registry, running-suite pointer,
/// diagnostics — so independent runs in one process stay isolated. Entry
/// points take `&mut self`; the borrow checker thereby enforces that no two
/// handler invocations overlap on one instance.
pub struct Reporter<D: Driver> {
    config: ReporterConfig,
    driver: D,
    registry: Registry,
    running_suite: Option<String>,
    destination_ready: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<D: Driver> Reporter<D> {
    /// Create a reporter over the given driver and configuration
    pub fn new(driver: D, config: ReporterConfig) -> Self {
        Self {
            config,
            driver,
            registry: Registry::new(),
            running_suite: None,
            destination_ready: false,
            diagnostics: Vec::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// The accumulated suite and spec records
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The driver handle
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Failures caught at the lifecycle boundaries so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The currently open suite, if any
    pub fn running_suite(&self) -> Option<&SuiteRecord> {
        self.running_suite
            .as_deref()
            .and_then(|id| self.registry.suite(id))
    }

    /// Handle a "suite started" event
    pub async fn suite_started(&mut self, suite: SuiteEvent) {
        if let Err(error) = self.on_suite_started(&suite) {
            self.report_failure(LifecyclePhase::SuiteStarted, &suite.id, error);
        }
    }

    /// Handle a "spec started" event
    pub async fn spec_started(&mut self, spec: SpecEvent) {
        if let Err(error) = self.on_spec_started(&spec) {
            self.report_failure(LifecyclePhase::SpecStarted, &spec.id, error);
        }
    }

    /// Handle a "spec done" event
    pub async fn spec_done(&mut self, spec: SpecEvent) {
        if let Err(error) = self.on_spec_done(&spec).await {
            self.report_failure(LifecyclePhase::SpecDone, &spec.id, error);
        }
    }

    /// Handle a "suite done" event
    pub async fn suite_done(&mut self, suite: SuiteEvent) {
        if let Err(error) = self.on_suite_done(&suite) {
            self.report_failure(LifecyclePhase::SuiteDone, &suite.id, error);
        }
    }

    fn on_suite_started(&mut self, event: &SuiteEvent) -> ReporterResult<()> {
        let suite = self.registry.upsert_suite(event);
        suite.specs = Vec::new();
        suite.utc_started = Some(Utc::now());
        self.running_suite = Some(event.id.clone());
        Ok(())
    }

    fn on_spec_started(&mut self, event: &SpecEvent) -> ReporterResult<()> {
        // Resolve the owning suite before touching the registry, so a spec
        // delivered outside any suite leaves no partial record behind.
        let suite_id = self
            .running_suite
            .clone()
            .ok_or_else(|| ReporterError::NoActiveSuite {
                spec_id: event.id.clone(),
            })?;
        let suite_description = self
            .registry
            .suite(&suite_id)
            .map(|suite| suite.description.clone())
            .ok_or_else(|| ReporterError::NoActiveSuite {
                spec_id: event.id.clone(),
            })?;

        let record = self.registry.upsert_spec(event);
        record.utc_started = Some(Utc::now());
        record.suite = Some(suite_description);

        if let Some(suite) = self.registry.suite_mut(&suite_id) {
            suite.specs.push(event.id.clone());
        }
        Ok(())
    }

    async fn on_spec_done(&mut self, event: &SpecEvent) -> ReporterResult<()> {
        let finished = Utc::now();
        let record = self.registry.upsert_spec(event);
        record.utc_finished = Some(finished);
        record.duration = record
            .utc_started
            .map(|started| duration_seconds(started, finished));

        let caps = self.driver.capabilities().await?;
        record.browser_name = Some(caps.browser_name.clone());
        record.browser_version = Some(caps.version.clone());
        record.platform = Some(caps.platform.clone());

        let suite = record
            .suite
            .clone()
            .ok_or_else(|| ReporterError::NoActiveSuite {
                spec_id: record.id.clone(),
            })?;
        let relative_dir =
            PathBuf::from(sanitize_segment(&suite)).join(sanitize_segment(&caps.browser_name));
        record.suite_directory = Some(relative_dir.to_string_lossy().into_owned());
        let json_name = format!("{}.json", sanitize_segment(&record.description));
        record.suite_file = Some(json_name.clone());
        let snapshot = record.clone();

        if !self.destination_ready {
            storage::prepare_destination(&self.config.dest, self.config.clean_destination)
                .await?;
            self.destination_ready = true;
        }
        let target_dir = self.config.dest.join(&relative_dir);
        storage::ensure_directory(&target_dir).await?;
        fs::write(
            target_dir.join(&json_name),
            serde_json::to_string_pretty(&snapshot)?,
        )
        .await?;
        debug!("wrote {} for spec '{}'", json_name, snapshot.id);

        if skip_screenshot(snapshot.status, self.config.capture_only_failed_specs) {
            record.screenshot_skipped = true;
            return Ok(());
        }

        let payload = self.driver.take_screenshot().await?;
        let image_bytes = base64::engine::general_purpose::STANDARD.decode(payload.as_bytes())?;
        let screen_name = format!("{}.png", sanitize_segment(&snapshot.description));
        record.screen_file = Some(screen_name.clone());
        fs::write(target_dir.join(&screen_name), image_bytes).await?;
        debug!("wrote {} for spec '{}'", screen_name, snapshot.id);
        Ok(())
    }

    fn on_suite_done(&mut self, event: &SuiteEvent) -> ReporterResult<()> {
        let finished = Utc::now();
        let suite = self.registry.upsert_suite(event);
        suite.utc_finished = Some(finished);
        suite.duration = suite
            .utc_started
            .map(|started| duration_seconds(started, finished));
        self.running_suite = None;
        Ok(())
    }

    fn report_failure(&mut self, phase: LifecyclePhase, subject_id: &str, error: ReporterError) {
        error!("reporting failed during {} for '{}': {}", phase, subject_id, error);
        self.diagnostics.push(Diagnostic {
            phase,
            subject_id: subject_id.to_string(),
            error,
        });
    }
}

/// Capture policy: pending and disabled specs are never screenshotted;
/// failed specs always are; everything else depends on the only-failed gate.
fn skip_screenshot(status: Option<SpecStatus>, only_failed: bool) -> bool {
    match status {
        Some(SpecStatus::Pending) | Some(SpecStatus::Disabled) => true,
        Some(SpecStatus::Failed) => false,
        Some(SpecStatus::Passed) | None => only_failed,
    }
}

fn duration_seconds(started: DateTime<Utc>, finished: DateTime<Utc>) -> f64 {
    (finished - started).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_policy_pending_and_disabled_always_skip() {
        for only_failed in [false, true] {
            assert!(skip_screenshot(Some(SpecStatus::Pending), only_failed));
            assert!(skip_screenshot(Some(SpecStatus::Disabled), only_failed));
        }
    }

    #[test]
    fn test_skip_policy_failed_never_skips() {
        assert!(!skip_screenshot(Some(SpecStatus::Failed), false));
        assert!(!skip_screenshot(Some(SpecStatus::Failed), true));
    }

    #[test]
    fn test_skip_policy_passed_depends_on_gate() {
        assert!(!skip_screenshot(Some(SpecStatus::Passed), false));
        assert!(skip_screenshot(Some(SpecStatus::Passed), true));
        // A spec without a reported status follows the same gate
        assert!(!skip_screenshot(None, false));
        assert!(skip_screenshot(None, true));
    }

    #[test]
    fn test_duration_seconds() {
        let started = Utc::now();
        let finished = started + chrono::Duration::milliseconds(1500);
        let duration = duration_seconds(started, finished);
        assert!((duration - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(LifecyclePhase::SpecDone.to_string(), "spec done");
        assert_eq!(LifecyclePhase::SuiteStarted.to_string(), "suite started");
    }
}
