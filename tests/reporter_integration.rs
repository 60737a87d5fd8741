//! Integration tests driving the reporter through the full lifecycle

use std::fs;
use std::path::Path;

use base64::Engine;
use pretty_assertions::assert_eq;

use spec_trail::{
    Capabilities, LifecyclePhase, MockDriver, Reporter, ReporterConfig, ReporterError, SpecEvent,
    SpecStatus, SuiteEvent,
};

fn chrome_driver() -> MockDriver {
    MockDriver::new(Capabilities::new("chrome", "1", "linux"))
}

async fn run_single_spec(reporter: &mut Reporter<MockDriver>, status: SpecStatus) {
    reporter.suite_started(SuiteEvent::new("s1", "Login")).await;
    reporter
        .spec_started(SpecEvent::new("t1", "valid login"))
        .await;
    reporter
        .spec_done(SpecEvent::new("t1", "valid login").status(status))
        .await;
    reporter.suite_done(SuiteEvent::new("s1", "Login")).await;
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("JSON artifact should exist");
    serde_json::from_str(&text).expect("artifact should be valid JSON")
}

#[tokio::test]
async fn test_passing_run_writes_json_and_screenshot() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let config = ReporterConfig::new().dest(&dest);
    let mut reporter = Reporter::new(chrome_driver(), config);

    run_single_spec(&mut reporter, SpecStatus::Passed).await;

    assert!(reporter.diagnostics().is_empty());

    let json_path = dest.join("Login").join("chrome").join("valid_login.json");
    let artifact = read_json(&json_path);
    assert_eq!(artifact["status"], "passed");
    assert_eq!(artifact["suite"], "Login");
    assert_eq!(artifact["browserName"], "chrome");
    assert_eq!(artifact["browserVersion"], "1");
    assert_eq!(artifact["platform"], "linux");
    assert_eq!(artifact["suiteDirectory"], "Login/chrome");
    assert_eq!(artifact["suiteFile"], "valid_login.json");
    assert!(artifact["duration"].is_number());
    assert!(artifact["utcStarted"].is_string());
    assert!(artifact["utcFinished"].is_string());

    // Default policy captures passing specs too
    let png_path = dest.join("Login").join("chrome").join("valid_login.png");
    let png = fs::read(&png_path).expect("screenshot should exist");
    assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    assert_eq!(reporter.driver().screenshots_taken(), 1);

    let record = reporter.registry().spec("t1").unwrap();
    assert_eq!(record.screen_file.as_deref(), Some("valid_login.png"));
    assert!(!record.screenshot_skipped);
}

#[tokio::test]
async fn test_only_failed_gate_skips_passing_spec() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let config = ReporterConfig::new()
        .dest(&dest)
        .capture_only_failed_specs(true);
    let mut reporter = Reporter::new(chrome_driver(), config);

    run_single_spec(&mut reporter, SpecStatus::Passed).await;

    let suite_dir = dest.join("Login").join("chrome");
    assert!(suite_dir.join("valid_login.json").exists());
    assert!(!suite_dir.join("valid_login.png").exists());
    assert_eq!(reporter.driver().screenshots_taken(), 0);

    let record = reporter.registry().spec("t1").unwrap();
    assert!(record.screenshot_skipped);
    assert_eq!(record.screen_file, None);
}

#[tokio::test]
async fn test_only_failed_gate_captures_failed_spec() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let config = ReporterConfig::new()
        .dest(&dest)
        .capture_only_failed_specs(true);
    let mut reporter = Reporter::new(chrome_driver(), config);

    run_single_spec(&mut reporter, SpecStatus::Failed).await;

    let suite_dir = dest.join("Login").join("chrome");
    assert!(suite_dir.join("valid_login.png").exists());
    assert_eq!(reporter.driver().screenshots_taken(), 1);
}

#[tokio::test]
async fn test_pending_spec_is_never_captured() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    // Gate wide open, pending still suppresses capture
    let config = ReporterConfig::new()
        .dest(&dest)
        .capture_only_failed_specs(false);
    let mut reporter = Reporter::new(chrome_driver(), config);

    run_single_spec(&mut reporter, SpecStatus::Pending).await;

    let suite_dir = dest.join("Login").join("chrome");
    assert!(suite_dir.join("valid_login.json").exists());
    assert!(!suite_dir.join("valid_login.png").exists());
    assert!(reporter.registry().spec("t1").unwrap().screenshot_skipped);
}

#[tokio::test]
async fn test_artifact_names_are_sanitized() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let mut reporter = Reporter::new(chrome_driver(), ReporterConfig::new().dest(&dest));

    reporter
        .suite_started(SuiteEvent::new("s1", "User: Login"))
        .await;
    reporter
        .spec_started(SpecEvent::new("t1", "weird/name:*?"))
        .await;
    reporter
        .spec_done(SpecEvent::new("t1", "weird/name:*?").status(SpecStatus::Passed))
        .await;
    reporter.suite_done(SuiteEvent::new("s1", "User: Login")).await;

    assert!(reporter.diagnostics().is_empty());
    let suite_dir = dest.join("User__Login").join("chrome");
    assert!(suite_dir.join("weird_name___.json").exists());
    assert!(suite_dir.join("weird_name___.png").exists());
}

#[tokio::test]
async fn test_spec_started_without_suite_is_reported() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let mut reporter = Reporter::new(chrome_driver(), ReporterConfig::new().dest(&dest));

    reporter
        .spec_started(SpecEvent::new("t1", "orphan spec"))
        .await;

    assert_eq!(reporter.diagnostics().len(), 1);
    let diagnostic = &reporter.diagnostics()[0];
    assert_eq!(diagnostic.phase, LifecyclePhase::SpecStarted);
    assert_eq!(diagnostic.subject_id, "t1");
    assert!(matches!(
        diagnostic.error,
        ReporterError::NoActiveSuite { .. }
    ));
    // The violating event left no partial record behind
    assert!(reporter.registry().specs().is_empty());

    // The run continues normally afterwards
    run_single_spec(&mut reporter, SpecStatus::Passed).await;
    assert_eq!(reporter.diagnostics().len(), 1);
    assert!(dest
        .join("Login")
        .join("chrome")
        .join("valid_login.json")
        .exists());
}

#[tokio::test]
async fn test_suite_done_clears_running_suite() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let mut reporter = Reporter::new(chrome_driver(), ReporterConfig::new().dest(&dest));

    run_single_spec(&mut reporter, SpecStatus::Passed).await;
    assert!(reporter.running_suite().is_none());

    reporter
        .spec_started(SpecEvent::new("t2", "late spec"))
        .await;

    assert_eq!(reporter.diagnostics().len(), 1);
    assert!(matches!(
        reporter.diagnostics()[0].error,
        ReporterError::NoActiveSuite { .. }
    ));
    // Registry still holds exactly the records from the completed suite
    assert_eq!(reporter.registry().suites().len(), 1);
    assert_eq!(reporter.registry().specs().len(), 1);
}

#[tokio::test]
async fn test_capabilities_failure_is_reported_and_run_continues() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let driver = chrome_driver().fail_capabilities(true);
    let mut reporter = Reporter::new(driver, ReporterConfig::new().dest(&dest));

    run_single_spec(&mut reporter, SpecStatus::Passed).await;

    assert_eq!(reporter.diagnostics().len(), 1);
    let diagnostic = &reporter.diagnostics()[0];
    assert_eq!(diagnostic.phase, LifecyclePhase::SpecDone);
    assert!(matches!(diagnostic.error, ReporterError::Driver(_)));

    // No artifact was written for the failing spec
    assert!(!dest.join("Login").exists());

    // The suite itself was still finalized
    let suite = reporter.registry().suite("s1").unwrap();
    assert!(suite.utc_finished.is_some());
    assert!(suite.duration.is_some());
}

#[tokio::test]
async fn test_screenshot_failure_leaves_json_in_place() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let driver = chrome_driver().fail_screenshots(true);
    let mut reporter = Reporter::new(driver, ReporterConfig::new().dest(&dest));

    run_single_spec(&mut reporter, SpecStatus::Failed).await;

    // JSON is written before the screenshot is attempted
    let suite_dir = dest.join("Login").join("chrome");
    assert!(suite_dir.join("valid_login.json").exists());
    assert!(!suite_dir.join("valid_login.png").exists());

    assert_eq!(reporter.diagnostics().len(), 1);
    assert!(matches!(
        reporter.diagnostics()[0].error,
        ReporterError::Driver(_)
    ));
}

#[tokio::test]
async fn test_clean_destination_purges_previous_run() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("stale.json"), b"{}").unwrap();

    let mut reporter = Reporter::new(
        chrome_driver(),
        ReporterConfig::new().dest(&dest).clean_destination(true),
    );
    run_single_spec(&mut reporter, SpecStatus::Passed).await;

    assert!(!dest.join("stale.json").exists());
    assert!(dest
        .join("Login")
        .join("chrome")
        .join("valid_login.json")
        .exists());
}

#[tokio::test]
async fn test_disabled_clean_destination_preserves_previous_run() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("stale.json"), b"{}").unwrap();

    let mut reporter = Reporter::new(
        chrome_driver(),
        ReporterConfig::new().dest(&dest).clean_destination(false),
    );
    run_single_spec(&mut reporter, SpecStatus::Passed).await;

    assert!(dest.join("stale.json").exists());
    assert!(dest
        .join("Login")
        .join("chrome")
        .join("valid_login.json")
        .exists());
}

#[tokio::test]
async fn test_repeated_suite_started_merges_into_one_record() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let mut reporter = Reporter::new(chrome_driver(), ReporterConfig::new().dest(&dest));

    reporter
        .suite_started(SuiteEvent::new("s1", "first description"))
        .await;
    reporter
        .suite_started(SuiteEvent::new("s1", "second description"))
        .await;

    assert_eq!(reporter.registry().suites().len(), 1);
    assert_eq!(
        reporter.registry().suites()[0].description,
        "second description"
    );
}

#[tokio::test]
async fn test_suite_tracks_children_and_timing() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("e2eReport");
    let mut reporter = Reporter::new(chrome_driver(), ReporterConfig::new().dest(&dest));

    reporter.suite_started(SuiteEvent::new("s1", "Login")).await;
    reporter
        .spec_started(SpecEvent::new("t1", "valid login"))
        .await;
    reporter
        .spec_done(SpecEvent::new("t1", "valid login").status(SpecStatus::Passed))
        .await;
    reporter
        .spec_started(SpecEvent::new("t2", "invalid login"))
        .await;
    reporter
        .spec_done(SpecEvent::new("t2", "invalid login").status(SpecStatus::Failed))
        .await;
    reporter.suite_done(SuiteEvent::new("s1", "Login")).await;

    let suite = reporter.registry().suite("s1").unwrap();
    assert_eq!(suite.specs, vec!["t1".to_string(), "t2".to_string()]);
    assert!(suite.utc_started.is_some());
    assert!(suite.utc_finished.is_some());
    assert!(suite.duration.unwrap() >= 0.0);

    let record = reporter.registry().spec("t1").unwrap();
    assert!(record.utc_started.unwrap() <= record.utc_finished.unwrap());
    assert!(record.duration.unwrap() >= 0.0);
}

#[tokio::test]
async fn test_screenshot_payload_decodes_to_png() {
    let mut driver = chrome_driver().size(32, 32).with_fill([200, 40, 40]);
    let payload = {
        use spec_trail::Driver;
        driver.take_screenshot().await.unwrap()
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);
}
