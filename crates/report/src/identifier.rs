//! Test identifiers and category grouping
//!
//! A test is keyed by `"<parent suite>:<title>"`. The same key is produced for
//! every retry of a test, which is what lets the aggregator fold attempts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the parent suite and the test title
pub const SEPARATOR: char = ':';

/// Title shown for keys that carry no separator
pub const UNKNOWN_TITLE: &str = "Unknown Test";

/// Composite key of a logical test
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Build the key for a test inside a parent suite
    pub fn new(suite: &str, title: &str) -> Self {
        TestId(format!("{}{}{}", suite, SEPARATOR, title))
    }

    /// Wrap a key that was produced elsewhere (e.g. read back from a report)
    pub fn from_key(key: impl Into<String>) -> Self {
        TestId(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category the test is grouped under: everything before the first separator,
    /// or the whole key if there is none
    pub fn category(&self) -> &str {
        match self.0.split_once(SEPARATOR) {
            Some((category, _)) => category,
            None => &self.0,
        }
    }

    /// Display title: everything after the first separator
    pub fn title(&self) -> &str {
        match self.0.split_once(SEPARATOR) {
            Some((_, title)) if !title.is_empty() => title,
            _ => UNKNOWN_TITLE,
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tests grouped by category, in the order categories and tests were first seen
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryIndex {
    categories: IndexMap<String, Vec<TestId>>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a test under its category. Returns `false` if it was already tracked.
    pub fn insert(&mut self, id: &TestId) -> bool {
        let tests = self
            .categories
            .entry(id.category().to_string())
            .or_default();

        if tests.contains(id) {
            return false;
        }
        tests.push(id.clone());
        true
    }

    /// Iterate categories with their tests
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TestId])> {
        self.categories
            .iter()
            .map(|(category, tests)| (category.as_str(), tests.as_slice()))
    }
}
