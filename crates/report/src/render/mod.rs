//! Report renderers
//!
//! Renderers are pure: the same view always produces the same bytes. The
//! "generated on" timestamp is part of the view rather than read from the clock.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::identifier::{CategoryIndex, TestId};
use crate::results::{ResultsManager, Summary, TestRecord};

pub mod html;
pub mod json;
pub mod text;

pub use html::HtmlRenderer;
pub use json::{JsonRenderer, RawReport};
pub use text::TextRenderer;

/// Timestamp format used in report headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything a renderer reads
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    pub summary: &'a Summary,
    pub records: &'a IndexMap<TestId, TestRecord>,
    pub categories: &'a CategoryIndex,
    pub generated_at: NaiveDateTime,
}

impl<'a> ReportView<'a> {
    pub fn new(results: &'a ResultsManager, generated_at: NaiveDateTime) -> Self {
        Self {
            summary: results.summary(),
            records: results.records(),
            categories: results.categories(),
            generated_at,
        }
    }

    pub fn generated_label(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Categories with the records of their tests, in first-seen order
    pub fn grouped(&self) -> impl Iterator<Item = (&'a str, Vec<&'a TestRecord>)> + 'a {
        let records = self.records;
        let categories: &'a CategoryIndex = self.categories;
        categories.iter().map(move |(category, ids)| {
            let tests = ids.iter().filter_map(|id| records.get(id)).collect();
            (category, tests)
        })
    }
}

/// Which sections of a report to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_details: bool,
    pub include_errors: bool,
    pub include_screenshots: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_details: true,
            include_errors: true,
            include_screenshots: true,
        }
    }
}

/// Turns a report view into an artifact body
pub trait ReportRenderer {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    fn render(&self, view: &ReportView<'_>) -> String;
}
