//! Raw JSON data dump

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::render::{ReportRenderer, ReportView};
use crate::results::{Summary, TestError};
use crate::status::FinalStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub flaky: usize,
    /// Milliseconds
    pub duration: u64,
}

impl From<&Summary> for RawStats {
    fn from(summary: &Summary) -> Self {
        Self {
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            flaky: summary.flaky,
            duration: summary.duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSuiteEntry {
    pub id: String,
    pub category: String,
    pub title: String,
    pub status: FinalStatus,
    /// Milliseconds
    pub duration: u64,
    pub retry: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TestError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// Shape of the JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub stats: RawStats,
    pub suites: Vec<RawSuiteEntry>,
}

impl RawReport {
    pub fn from_view(view: &ReportView<'_>) -> Self {
        let suites = view
            .records
            .values()
            .map(|record| RawSuiteEntry {
                id: record.id.to_string(),
                category: record.id.category().to_string(),
                title: record.id.title().to_string(),
                status: record.status,
                duration: record.duration_ms,
                retry: record.retry_count,
                error: record.error.clone(),
                screenshot: record.screenshot_path.clone(),
            })
            .collect();

        Self {
            stats: RawStats::from(view.summary),
            suites,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, view: &ReportView<'_>) -> String {
        match serde_json::to_string_pretty(&RawReport::from_view(view)) {
            Ok(json) => json,
            Err(e) => {
                // Plain data with string keys; serialization cannot fail in practice
                error!("Failed to serialize raw report: {}", e);
                String::from("{}")
            }
        }
    }
}
