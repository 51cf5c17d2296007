//! Aggregation of per-attempt outcomes into per-test records and run summary

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::identifier::{CategoryIndex, TestId};
use crate::status::{classify, FinalStatus, RawStatus};

/// One execution attempt of a test, as delivered by the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub raw_status: RawStatus,
    pub duration_ms: u64,
    /// Zero-based retry counter
    pub attempt_index: u32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_stack: Option<String>,
    #[serde(default)]
    pub screenshot_path: Option<String>,
}

impl AttemptOutcome {
    pub fn new(raw_status: RawStatus, duration_ms: u64, attempt_index: u32) -> Self {
        Self {
            raw_status,
            duration_ms,
            attempt_index,
            error_message: None,
            error_stack: None,
            screenshot_path: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>, stack: Option<String>) -> Self {
        self.error_message = Some(message.into());
        self.error_stack = stack;
        self
    }

    pub fn with_screenshot(mut self, path: impl Into<String>) -> Self {
        self.screenshot_path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Final record of a logical test, built from its deciding attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: TestId,
    pub status: FinalStatus,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TestError>,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,
}

impl TestRecord {
    fn from_attempt(id: &TestId, outcome: AttemptOutcome) -> Self {
        let error = match (outcome.error_message, outcome.error_stack) {
            (Some(message), stack) => Some(TestError { message, stack }),
            (None, Some(stack)) => Some(TestError {
                message: "Unknown error".to_string(),
                stack: Some(stack),
            }),
            (None, None) => None,
        };

        Self {
            id: id.clone(),
            status: classify(outcome.raw_status, outcome.attempt_index),
            duration_ms: outcome.duration_ms,
            error,
            retry_count: outcome.attempt_index,
            screenshot_path: outcome.screenshot_path,
        }
    }
}

/// Run-level counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub flaky: usize,
    pub duration_ms: u64,
}

impl Summary {
    fn count(&mut self, status: FinalStatus) {
        *self.counter(status) += 1;
    }

    fn uncount(&mut self, status: FinalStatus) {
        let counter = self.counter(status);
        *counter = counter.saturating_sub(1);
    }

    fn counter(&mut self, status: FinalStatus) -> &mut usize {
        match status {
            FinalStatus::Passed => &mut self.passed,
            FinalStatus::Failed => &mut self.failed,
            FinalStatus::Skipped => &mut self.skipped,
            FinalStatus::Flaky => &mut self.flaky,
        }
    }

    /// Duration in seconds with two decimals, as shown in reports
    pub fn duration_secs(&self) -> String {
        format_secs(self.duration_ms)
    }
}

pub(crate) fn format_secs(ms: u64) -> String {
    format!("{:.2}", ms as f64 / 1000.0)
}

/// Owns all results of a single test run.
///
/// Mutated only from the runner's serialized test-end callbacks, so it takes
/// `&mut self` and needs no locking.
#[derive(Debug, Clone)]
pub struct ResultsManager {
    start_time: DateTime<Utc>,
    records: IndexMap<TestId, TestRecord>,
    categories: CategoryIndex,
    summary: Summary,
    ended: bool,
}

impl Default for ResultsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsManager {
    /// Start a run now
    pub fn new() -> Self {
        Self::with_start(Utc::now())
    }

    /// Start a run at a fixed instant
    pub fn with_start(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            records: IndexMap::new(),
            categories: CategoryIndex::new(),
            summary: Summary::default(),
            ended: false,
        }
    }

    /// Fold one attempt into the run.
    ///
    /// The newest attempt always replaces the stored record; `total` only
    /// moves the first time an identifier is seen.
    pub fn record_attempt(&mut self, id: &TestId, outcome: AttemptOutcome) -> &TestRecord {
        if id.as_str().is_empty() {
            warn!("Recording attempt with an empty test identifier");
        }

        let record = TestRecord::from_attempt(id, outcome);
        debug!(
            "Recorded {} attempt {} as {}",
            id, record.retry_count, record.status
        );

        match self.records.get(id) {
            Some(previous) => {
                let previous = previous.status;
                self.summary.uncount(previous);
            }
            None => self.summary.total += 1,
        }
        self.summary.count(record.status);
        self.categories.insert(id);

        self.records.insert(id.clone(), record);
        &self.records[id]
    }

    /// Close the run now
    pub fn finalize(&mut self) -> Summary {
        self.finalize_at(Utc::now())
    }

    /// Close the run at a fixed instant.
    ///
    /// Counters are rebuilt from the stored records rather than trusted.
    /// Calling this again only re-stamps the duration.
    pub fn finalize_at(&mut self, now: DateTime<Utc>) -> Summary {
        self.ended = true;

        let mut summary = Summary {
            total: self.records.len(),
            ..Summary::default()
        };
        for record in self.records.values() {
            summary.count(record.status);
        }
        summary.duration_ms = (now - self.start_time).num_milliseconds().max(0) as u64;

        if summary.total != self.summary.total {
            warn!(
                "Incremental total {} disagreed with {} recorded tests",
                self.summary.total, summary.total
            );
        }

        self.summary = summary;
        summary
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn records(&self) -> &IndexMap<TestId, TestRecord> {
        &self.records
    }

    pub fn record(&self, id: &TestId) -> Option<&TestRecord> {
        self.records.get(id)
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }
}
