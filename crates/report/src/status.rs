//! Status classification
//!
//! The runner reports one raw status per execution attempt. Reports only ever
//! show the final status of a test, which folds the attempt index in so that a
//! pass after a retry is reported as flaky.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single execution attempt, as reported by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawStatus {
    Passed,
    Failed,
    Skipped,
    TimedOut,
    Interrupted,
    /// Anything the runner reports that we do not recognise
    #[serde(other)]
    Unknown,
}

impl RawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawStatus::Passed => "passed",
            RawStatus::Failed => "failed",
            RawStatus::Skipped => "skipped",
            RawStatus::TimedOut => "timedOut",
            RawStatus::Interrupted => "interrupted",
            RawStatus::Unknown => "unknown",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            RawStatus::Passed => "✅",
            RawStatus::Failed => "❌",
            RawStatus::Skipped => "⏩",
            RawStatus::TimedOut => "⏰",
            RawStatus::Interrupted => "⚠️",
            RawStatus::Unknown => "❓",
        }
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status a test is reported with once all of its attempts are in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalStatus {
    Passed,
    Failed,
    Skipped,
    Flaky,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Passed => "passed",
            FinalStatus::Failed => "failed",
            FinalStatus::Skipped => "skipped",
            FinalStatus::Flaky => "flaky",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            FinalStatus::Passed => "✅",
            FinalStatus::Failed => "❌",
            FinalStatus::Skipped => "⏩",
            FinalStatus::Flaky => "🔁",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an attempt outcome to the status the test is reported with.
///
/// A pass on any attempt after the first is flaky. Timeouts, interruptions
/// and unrecognised statuses count as failures.
pub fn classify(raw: RawStatus, attempt_index: u32) -> FinalStatus {
    match raw {
        RawStatus::Passed if attempt_index > 0 => FinalStatus::Flaky,
        RawStatus::Passed => FinalStatus::Passed,
        RawStatus::Skipped => FinalStatus::Skipped,
        RawStatus::Failed
        | RawStatus::TimedOut
        | RawStatus::Interrupted
        | RawStatus::Unknown => FinalStatus::Failed,
    }
}
