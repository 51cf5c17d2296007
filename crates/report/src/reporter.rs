//! Run listener that aggregates results and writes the report artifacts

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::identifier::TestId;
use crate::paths::ReportPaths;
use crate::render::{
    HtmlRenderer, JsonRenderer, RenderOptions, ReportRenderer, ReportView, TextRenderer,
};
use crate::results::{AttemptOutcome, ResultsManager, Summary};
use crate::sink::{initialize_report_directories, ArtifactSink, FsSink};

/// Inbound lifecycle events from the test runner.
///
/// The runner delivers these one at a time even when tests run in parallel.
pub trait RunListener {
    fn on_test_begin(&mut self, _id: &TestId) {}

    fn on_test_end(&mut self, id: &TestId, outcome: AttemptOutcome);

    fn on_run_end(&mut self, ended_at: DateTime<Utc>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Text,
    Html,
    Json,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Text => "Text report",
            ArtifactKind::Html => "HTML report",
            ArtifactKind::Json => "Raw data",
        };
        f.write_str(name)
    }
}

/// What happened to one artifact at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub error: Option<String>,
}

impl ArtifactStatus {
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregates a run and writes text, HTML and JSON artifacts when it ends
pub struct Reporter<S: ArtifactSink = FsSink> {
    results: ResultsManager,
    paths: ReportPaths,
    options: RenderOptions,
    sink: S,
    artifacts: Vec<ArtifactStatus>,
}

impl Reporter<FsSink> {
    pub fn new(paths: ReportPaths, options: RenderOptions) -> Self {
        Self::with_sink(paths, options, FsSink)
    }
}

impl<S: ArtifactSink> Reporter<S> {
    /// Prepare output directories and clear the previous fixed-name text report,
    /// so a run that dies early cannot leave last run's report looking current.
    pub fn with_sink(paths: ReportPaths, options: RenderOptions, sink: S) -> Self {
        for result in initialize_report_directories(&sink, &paths) {
            if let Err(e) = result {
                error!("Error initializing report directory: {}", e);
            }
        }

        if let Err(e) = sink.delete_if_exists(&paths.fixed_text_report()) {
            warn!("Could not clear stale text report: {}", e);
        }

        Self {
            results: ResultsManager::new(),
            paths,
            options,
            sink,
            artifacts: Vec::new(),
        }
    }

    /// Count the run from `start` instead of construction time
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.results = ResultsManager::with_start(start);
        self
    }

    pub fn results(&self) -> &ResultsManager {
        &self.results
    }

    pub fn summary(&self) -> &Summary {
        self.results.summary()
    }

    /// Artifacts written by the last `finish`
    pub fn artifacts(&self) -> &[ArtifactStatus] {
        &self.artifacts
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finalize the results and write every artifact.
    ///
    /// A failed write is logged and recorded; the remaining artifacts are still
    /// written.
    pub fn finish(
        &mut self,
        ended_at: DateTime<Utc>,
        generated_at: NaiveDateTime,
    ) -> &[ArtifactStatus] {
        let summary = self.results.finalize_at(ended_at);
        info!(
            "Run finished: {} total, {} passed, {} failed, {} flaky, {} skipped ({}s)",
            summary.total,
            summary.passed,
            summary.failed,
            summary.flaky,
            summary.skipped,
            summary.duration_secs()
        );

        let view = ReportView::new(&self.results, generated_at);
        let text = TextRenderer::new(self.options);
        let outputs: [(ArtifactKind, PathBuf, &dyn ReportRenderer); 3] = [
            (ArtifactKind::Text, self.paths.text_report(generated_at), &text),
            (ArtifactKind::Html, self.paths.html_report.clone(), &HtmlRenderer),
            (ArtifactKind::Json, self.paths.json_report.clone(), &JsonRenderer),
        ];

        self.artifacts = outputs
            .into_iter()
            .map(|(kind, path, renderer)| {
                let content = renderer.render(&view);
                match self.sink.write_artifact(&path, &content) {
                    Ok(()) => {
                        info!("✅ {} generated at {}", kind, path.display());
                        ArtifactStatus { kind, path, error: None }
                    }
                    Err(e) => {
                        error!("❌ Error saving {} ({}): {}", kind, renderer.name(), e);
                        ArtifactStatus {
                            kind,
                            path,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        &self.artifacts
    }
}

impl<S: ArtifactSink> RunListener for Reporter<S> {
    fn on_test_end(&mut self, id: &TestId, outcome: AttemptOutcome) {
        self.results.record_attempt(id, outcome);
    }

    fn on_run_end(&mut self, ended_at: DateTime<Utc>) {
        self.finish(ended_at, Local::now().naive_local());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, ReportResult};
    use crate::status::RawStatus;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Sink that refuses HTML and remembers everything else
    #[derive(Default)]
    struct FlakySink {
        written: RefCell<Vec<PathBuf>>,
    }

    impl ArtifactSink for FlakySink {
        fn ensure_directory(&self, _path: &Path) -> ReportResult<()> {
            Ok(())
        }

        fn write_artifact(&self, path: &Path, _content: &str) -> ReportResult<()> {
            if path.extension().is_some_and(|e| e == "html") {
                return Err(ReportError::filesystem(
                    path,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                ));
            }
            self.written.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn delete_if_exists(&self, _path: &Path) -> ReportResult<()> {
            Ok(())
        }
    }

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 5)
            .unwrap()
    }

    #[test]
    fn test_failed_artifact_does_not_stop_others() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let mut reporter = Reporter::with_sink(
            ReportPaths::under(Path::new("/nowhere")),
            RenderOptions::default(),
            FlakySink::default(),
        )
        .starting_at(start);

        reporter.on_test_end(
            &TestId::new("suite", "testA"),
            AttemptOutcome::new(RawStatus::Passed, 1200, 0),
        );
        let statuses = reporter.finish(start + chrono::Duration::seconds(5), generated());

        assert_eq!(statuses.len(), 3);
        assert!(statuses[0].is_written());
        assert!(!statuses[1].is_written());
        assert!(statuses[2].is_written());
        assert_eq!(reporter.sink().written.borrow().len(), 2);
    }

    #[test]
    fn test_writes_all_artifacts_and_clears_stale_text() {
        let dir = TempDir::new().unwrap();
        let paths = ReportPaths::under(dir.path());
        crate::sink::write_artifact(&paths.fixed_text_report(), "previous run").unwrap();

        let mut reporter = Reporter::new(paths.clone(), RenderOptions::default());
        assert!(!paths.fixed_text_report().exists());
        assert!(paths.screenshots_dir.is_dir());

        reporter.on_test_begin(&TestId::new("suite", "testA"));
        reporter.on_test_end(
            &TestId::new("suite", "testA"),
            AttemptOutcome::new(RawStatus::Passed, 1200, 0),
        );
        reporter.on_run_end(Utc::now());

        assert!(reporter.artifacts().iter().all(ArtifactStatus::is_written));
        let text = std::fs::read_to_string(paths.fixed_text_report()).unwrap();
        assert!(text.contains("✅ testA"));
        assert!(paths.html_report.exists());
        assert!(paths.json_report.exists());
        assert_eq!(reporter.summary().total, 1);
        assert_eq!(reporter.summary().passed, 1);
    }
}
