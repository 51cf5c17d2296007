//! Replay of the runner's JSON reporter output
//!
//! Playwright's built-in `json` reporter writes every suite, spec and attempt
//! to `logs/test-report.json`. Walking that file and feeding each attempt to a
//! [`RunListener`] drives the same pipeline the in-process reporter hooks do.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::identifier::TestId;
use crate::reporter::RunListener;
use crate::results::AttemptOutcome;
use crate::status::RawStatus;

/// Top level of the runner's JSON report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerReport {
    #[serde(default)]
    pub suites: Vec<RunnerSuite>,
    #[serde(default)]
    pub stats: Option<RunnerStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerStats {
    pub start_time: DateTime<Utc>,
    /// Milliseconds, fractional
    pub duration: f64,
}

/// A file or `describe` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSuite {
    pub title: String,
    #[serde(default)]
    pub specs: Vec<RunnerSpec>,
    #[serde(default)]
    pub suites: Vec<RunnerSuite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSpec {
    pub title: String,
    #[serde(default)]
    pub tests: Vec<RunnerTest>,
}

/// One spec in one project; holds every attempt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerTest {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub results: Vec<RunnerResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerResult {
    pub status: RawStatus,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub error: Option<RunnerError>,
    #[serde(default)]
    pub attachments: Vec<RunnerAttachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerAttachment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl RunnerResult {
    /// Convert to the aggregator's attempt record
    pub fn to_outcome(&self) -> AttemptOutcome {
        let mut outcome = AttemptOutcome::new(
            self.status,
            self.duration.max(0.0).round() as u64,
            self.retry,
        );

        if let Some(error) = &self.error {
            outcome.error_message = Some(
                error
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            );
            outcome.error_stack = error.stack.clone();
        }

        outcome.screenshot_path = self
            .attachments
            .iter()
            .find(|a| a.content_type == "image/png")
            .and_then(|a| a.path.clone());

        outcome
    }
}

impl RunnerReport {
    pub fn from_json(json: &str) -> ReportResult<Self> {
        serde_json::from_str(json).map_err(ReportError::from)
    }

    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReportError::filesystem(path, e))?;
        Self::from_json(&content).map_err(|e| {
            ReportError::RunnerOutput(format!("{}: {}", path.display(), e))
        })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.stats.as_ref().map(|s| s.start_time)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.stats.as_ref().map(|s| {
            s.start_time + Duration::milliseconds(s.duration.max(0.0).round() as i64)
        })
    }

    /// Feed every attempt to `listener` in file order, then end the run.
    ///
    /// Returns the number of attempts delivered.
    pub fn replay<L: RunListener + ?Sized>(&self, listener: &mut L) -> usize {
        let mut attempts = 0;
        for suite in &self.suites {
            attempts += replay_suite(suite, listener);
        }

        info!("Replayed {} attempt(s) from runner output", attempts);
        listener.on_run_end(self.ended_at().unwrap_or_else(Utc::now));
        attempts
    }
}

fn replay_suite<L: RunListener + ?Sized>(suite: &RunnerSuite, listener: &mut L) -> usize {
    let mut attempts = 0;

    for spec in &suite.specs {
        let id = TestId::new(&suite.title, &spec.title);
        for test in &spec.tests {
            for result in &test.results {
                debug!("Replaying {} [{}] retry {}", id, test.project_name, result.retry);
                listener.on_test_begin(&id);
                listener.on_test_end(&id, result.to_outcome());
                attempts += 1;
            }
        }
    }

    for child in &suite.suites {
        attempts += replay_suite(child, listener);
    }

    attempts
}
