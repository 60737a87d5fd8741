//! Spec Trail - durable artifacts for behavior-driven browser test runs.
//!
//! This crate provides:
//! - Lifecycle hooks for a BDD runner (suite/spec started and done)
//! - One pretty-printed JSON record per spec, under `dest/<suite>/<browser>/`
//! - Optional PNG screenshot evidence with a configurable capture policy
//! - An identity registry that merges repeated runner callbacks per suite/spec
//! - A structured diagnostics channel: reporting failures never abort the run
//!
//! # Example
//!
//! ```rust,no_run
//! use spec_trail::{
//!     Capabilities, MockDriver, Reporter, ReporterConfig, SpecEvent, SpecStatus, SuiteEvent,
//! };
//!
//! # async fn run() {
//! let driver = MockDriver::new(Capabilities::new("chrome", "1", "linux"));
//! let mut reporter = Reporter::new(driver, ReporterConfig::default());
//!
//! reporter.suite_started(SuiteEvent::new("s1", "Login")).await;
//! reporter.spec_started(SpecEvent::new("t1", "valid login")).await;
//! reporter
//!     .spec_done(SpecEvent::new("t1", "valid login").status(SpecStatus::Passed))
//!     .await;
//! reporter.suite_done(SuiteEvent::new("s1", "Login")).await;
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod records;
pub mod registry;
pub mod reporter;
pub mod storage;

// Re-export configuration
pub use config::{DEFAULT_DESTINATION, DEFAULT_REPORT_FILENAME, ReporterConfig};

// Re-export driver seam
pub use driver::{Capabilities, Driver, DriverError, DriverResult, MockDriver};

// Re-export record types
pub use records::{SpecEvent, SpecRecord, SpecStatus, SuiteEvent, SuiteRecord};

// Re-export registry
pub use registry::Registry;

// Re-export reporter types
pub use reporter::{Diagnostic, LifecyclePhase, Reporter, ReporterError, ReporterResult};

// Re-export storage helpers
pub use storage::{ensure_directory, prepare_destination, sanitize_segment};
