// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured result types
//!
//! These are the shapes reporting tools consume: elapsed times are in
//! minutes, counts are plain non-negative integers, names are opaque strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case_id::Product;
use crate::classify::EventState;

/// Possible test outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
}

impl TestOutcome {
    /// Outcome for a record state; `Other` has none
    #[must_use]
    pub fn from_state(state: EventState) -> Option<Self> {
        match state {
            EventState::Passed => Some(TestOutcome::Passed),
            EventState::Failed => Some(TestOutcome::Failed),
            EventState::Skipped => Some(TestOutcome::Skipped),
            EventState::Other => None,
        }
    }
}

/// One finished test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetail {
    /// Suite the test ran in
    pub suite: String,
    /// Test name
    pub name: String,
    /// Elapsed time in minutes
    pub elapsed_minutes: f64,
    /// Test outcome
    pub outcome: TestOutcome,
    /// Inline diagnostics, or harvested log context for failures without any
    pub error_log: String,
}

impl TestDetail {
    /// Check if the test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }

    /// Check if the test failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.outcome == TestOutcome::Failed
    }
}

/// Running tally for the suite currently being counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteCounters {
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped
    pub skipped: usize,
}

impl SuiteCounters {
    /// Count one outcome
    pub fn record(&mut self, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
            TestOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Sum of all counters
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Return the current values and reset to zero
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Snapshot taken when a suite finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    /// Suite name
    pub name: String,
    /// Elapsed time in minutes
    pub elapsed_minutes: f64,
    /// Completion status as reported by the suite marker
    pub status: String,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped
    pub skipped: usize,
    /// External case ID, when the suite name resolves
    pub case_id: Option<u32>,
}

/// A suite and its tests in arrival order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteOverview {
    /// Suite name
    pub name: String,
    /// Tests in the order they finished
    pub tests: Vec<TestDetail>,
}

/// Counts across the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Tests with an outcome
    pub total: usize,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped
    pub skipped: usize,
}

/// Structured result of a parsed log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedLog {
    /// Product the log was parsed for
    pub product: Product,
    /// When the run started: the first record timestamp, if any record had one
    pub run_timestamp: Option<DateTime<Utc>>,
    /// Wall time of the run in minutes
    pub total_elapsed_minutes: f64,
    /// Counts across all suites
    pub totals: Totals,
    /// Suites with their tests
    pub suites: Vec<SuiteOverview>,
    /// Per-suite snapshots
    pub summaries: Vec<SuiteSummary>,
    /// The log ended inside an unclosed record, which was dropped
    #[serde(default)]
    pub truncated: bool,
}

impl ProcessedLog {
    /// Check if no test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.totals.failed == 0
    }

    /// Get failing tests across all suites
    #[must_use]
    pub fn failing_tests(&self) -> Vec<&TestDetail> {
        self.suites
            .iter()
            .flat_map(|s| s.tests.iter())
            .filter(|t| t.failed())
            .collect()
    }

    /// Find a suite overview by name
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&SuiteOverview> {
        self.suites.iter().find(|s| s.name == name)
    }
}
