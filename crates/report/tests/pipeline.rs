//! End-to-end reporting pipeline tests
//!
//! Drive a `Reporter` the way the runner does and inspect what lands on disk.

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tempfile::TempDir;

use tourbook_report::render::RawReport;
use tourbook_report::sink::write_artifact;
use tourbook_report::{
    AttemptOutcome, FinalStatus, RawStatus, RenderOptions, ReportPaths, Reporter, RunListener,
    TestId, TextReportNaming,
};

fn generated() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 3)
        .unwrap()
}

#[test]
fn single_pass_summary() {
    let dir = TempDir::new().unwrap();
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let mut reporter =
        Reporter::new(ReportPaths::under(dir.path()), RenderOptions::default()).starting_at(start);

    reporter.on_test_end(
        &TestId::new("suite", "testA"),
        AttemptOutcome::new(RawStatus::Passed, 1200, 0),
    );
    reporter.finish(start + Duration::seconds(3), generated());

    let summary = reporter.summary();
    assert_eq!(
        (summary.total, summary.passed, summary.failed, summary.skipped, summary.flaky),
        (1, 1, 0, 0, 0)
    );
}

#[test]
fn retried_test_is_flaky_and_counted_once() {
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::under(dir.path());
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let mut reporter = Reporter::new(paths.clone(), RenderOptions::default()).starting_at(start);

    let id = TestId::new("suite", "testB");
    reporter.on_test_end(
        &id,
        AttemptOutcome::new(RawStatus::Failed, 500, 0).with_error("Error: nope", None),
    );
    reporter.on_test_end(
        &id,
        AttemptOutcome::new(RawStatus::Failed, 500, 1).with_error("Error: nope", None),
    );
    reporter.on_test_end(&id, AttemptOutcome::new(RawStatus::Passed, 400, 2));
    reporter.finish(start + Duration::seconds(2), generated());

    assert_eq!(reporter.summary().total, 1);
    assert_eq!(reporter.summary().flaky, 1);
    assert_eq!(reporter.results().record(&id).unwrap().status, FinalStatus::Flaky);

    let text = std::fs::read_to_string(paths.fixed_text_report()).unwrap();
    assert!(text.contains("Flaky: true\nRetries: 2\n"));
    assert!(!text.contains("Error:"));
}

#[test]
fn json_artifact_round_trips_summary() {
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::under(dir.path());
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let mut reporter = Reporter::new(paths.clone(), RenderOptions::default()).starting_at(start);

    reporter.on_test_end(
        &TestId::new("Search", "a"),
        AttemptOutcome::new(RawStatus::Passed, 10, 0),
    );
    reporter.on_test_end(
        &TestId::new("Search", "b"),
        AttemptOutcome::new(RawStatus::Interrupted, 10, 0),
    );
    reporter.on_test_end(
        &TestId::new("Booking", "c"),
        AttemptOutcome::new(RawStatus::Skipped, 0, 0),
    );
    reporter.finish(start + Duration::milliseconds(2500), generated());

    let json = std::fs::read_to_string(&paths.json_report).unwrap();
    let parsed: RawReport = serde_json::from_str(&json).unwrap();
    let summary = reporter.summary();

    assert_eq!(parsed.stats.total, summary.total);
    assert_eq!(parsed.stats.passed, summary.passed);
    assert_eq!(parsed.stats.failed, summary.failed);
    assert_eq!(parsed.stats.skipped, summary.skipped);
    assert_eq!(parsed.stats.flaky, summary.flaky);
    assert_eq!(parsed.stats.duration, 2500);
}

#[test]
fn write_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not/yet/there/report.html");
    assert!(!path.parent().unwrap().exists());

    write_artifact(&path, "<html></html>").unwrap();
    assert!(path.parent().unwrap().is_dir());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
}

#[test]
fn timestamped_text_report_is_used_when_configured() {
    let dir = TempDir::new().unwrap();
    let mut paths = ReportPaths::under(dir.path());
    paths.text_naming = TextReportNaming::Timestamped;

    let mut reporter = Reporter::new(paths.clone(), RenderOptions::default());
    reporter.on_test_end(&TestId::new("s", "t"), AttemptOutcome::new(RawStatus::Passed, 1, 0));
    reporter.finish(Utc::now(), generated());

    let expected = paths.logs_dir.join("txt").join("parsed-log_2026-03-01_10-00-03.txt");
    assert!(expected.exists());
    assert!(!paths.fixed_text_report().exists());
}
