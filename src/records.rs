//! Types for suite and spec results.
//!
//! The runner delivers partial event payloads (`SuiteEvent`, `SpecEvent`);
//! the registry folds them into one accumulating record per identity
//! (`SuiteRecord`, `SpecRecord`). Spec records are what gets serialized to
//! disk, so their field names follow the JSON artifact schema (camelCase,
//! absent optionals omitted).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a spec, as reported by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
    Passed,
    Failed,
    Pending,
    Disabled,
}

impl SpecStatus {
    /// The runner's wire spelling of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecStatus::Passed => "passed",
            SpecStatus::Failed => "failed",
            SpecStatus::Pending => "pending",
            SpecStatus::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suite lifecycle event payload from the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteEvent {
    /// Opaque stable identifier assigned by the runner
    pub id: String,

    /// Display name of the suite
    pub description: String,
}

impl SuiteEvent {
    /// Create a suite event
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Spec lifecycle event payload from the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecEvent {
    /// Opaque stable identifier assigned by the runner
    pub id: String,

    /// Display name of the spec
    pub description: String,

    /// Terminal status; present on "spec done" events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpecStatus>,
}

impl SpecEvent {
    /// Create a spec event with no status
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Attach a status
    pub fn status(mut self, status: SpecStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Accumulated record for one suite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    /// Runner-assigned identity
    pub id: String,

    /// Display name of the suite
    pub description: String,

    /// Ids of the specs started while this suite was open, in start order
    #[serde(default)]
    pub specs: Vec<String>,

    /// When the suite was reported started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_started: Option<DateTime<Utc>>,

    /// When the suite was reported done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_finished: Option<DateTime<Utc>>,

    /// Wall-clock duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl SuiteRecord {
    /// Create a fresh record from a suite event
    pub fn from_event(event: &SuiteEvent) -> Self {
        Self {
            id: event.id.clone(),
            description: event.description.clone(),
            specs: Vec::new(),
            utc_started: None,
            utc_finished: None,
            duration: None,
        }
    }
}

/// Accumulated record for one spec; this is the JSON artifact shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRecord {
    /// Runner-assigned identity
    pub id: String,

    /// Display name of the spec
    pub description: String,

    /// Terminal status, once the runner has reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SpecStatus>,

    /// Description of the suite that was open when this spec started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,

    /// When the spec was reported started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_started: Option<DateTime<Utc>>,

    /// When the spec was reported done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_finished: Option<DateTime<Utc>>,

    /// Wall-clock duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Browser name from the driver capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_name: Option<String>,

    /// Browser version from the driver capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,

    /// Platform from the driver capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Storage subdirectory relative to the destination root,
    /// `<suite>/<browser>` after sanitization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_directory: Option<String>,

    /// File name of the JSON artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_file: Option<String>,

    /// File name of the screenshot, when one was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_file: Option<String>,

    /// True when the capture policy decided against a screenshot
    #[serde(default)]
    pub screenshot_skipped: bool,
}

impl SpecRecord {
    /// Create a fresh record from a spec event
    pub fn from_event(event: &SpecEvent) -> Self {
        Self {
            id: event.id.clone(),
            description: event.description.clone(),
            status: event.status,
            suite: None,
            utc_started: None,
            utc_finished: None,
            duration: None,
            browser_name: None,
            browser_version: None,
            platform: None,
            suite_directory: None,
            suite_file: None,
            screen_file: None,
            screenshot_skipped: false,
        }
    }
}
