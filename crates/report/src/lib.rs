//! Tourbook report generation
//!
//! This crate turns the browser test runner's per-attempt results into run
//! reports:
//! - Classifies each attempt and folds retries into one record per test
//! - Detects flaky tests (passed only after a retry)
//! - Groups tests by their parent suite
//! - Renders plain-text, HTML and JSON artifacts and writes them to disk
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Runner (external collaborator)             │
//! │        on_test_begin / on_test_end / on_run_end             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reporter: RunListener                                      │
//! │    ├── ResultsManager                                       │
//! │    │     ├── classify(raw, attempt) -> FinalStatus          │
//! │    │     ├── records: TestId -> TestRecord                  │
//! │    │     └── categories: suite -> [TestId]                  │
//! │    ├── TextRenderer / HtmlRenderer / JsonRenderer           │
//! │    └── ArtifactSink (FsSink)                                │
//! │          ├── logs/txt/parsed-log.txt                        │
//! │          ├── html-report/index.html                         │
//! │          └── logs/json/test-report.json                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod clean;
pub mod error;
pub mod identifier;
pub mod paths;
pub mod playwright;
pub mod render;
pub mod reporter;
pub mod results;
pub mod sink;
pub mod status;

pub use error::{ReportError, ReportResult};
pub use identifier::{CategoryIndex, TestId};
pub use paths::{ReportPaths, TextReportNaming};
pub use render::{RenderOptions, ReportRenderer, ReportView};
pub use reporter::{ArtifactKind, ArtifactStatus, Reporter, RunListener};
pub use results::{AttemptOutcome, ResultsManager, Summary, TestRecord};
pub use status::{classify, FinalStatus, RawStatus};
