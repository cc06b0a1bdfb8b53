// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Suite aggregation
//!
//! Test events are counted against the suite that is currently open. A suite
//! marker closes it: the counters are snapshotted into a [`SuiteSummary`],
//! the buffered tests become that suite's [`SuiteOverview`], and counting
//! starts over for the next suite.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::case_id::{self, Product};
use crate::classify::{RawEvent, RecordRole, nanos_to_minutes};
use crate::context;
use crate::error::ParseError;
use crate::result::{
    ProcessedLog, SuiteCounters, SuiteOverview, SuiteSummary, TestDetail, TestOutcome, Totals,
};

/// Suite name for tests still open when the log ends
pub const UNTERMINATED_SUITE: &str = "unterminated";

/// Status recorded for [`UNTERMINATED_SUITE`]
pub const INCOMPLETE_STATUS: &str = "incomplete";

/// A test waiting for its suite marker
#[derive(Debug, Clone)]
struct PendingTest {
    event: RawEvent,
    outcome: TestOutcome,
}

/// Builds a [`ProcessedLog`] from finalized events of one parse
#[derive(Debug)]
pub struct Aggregator<'a> {
    full_log: &'a str,
    product: Product,
    counters: SuiteCounters,
    pending: Vec<PendingTest>,
    suites: Vec<SuiteOverview>,
    summaries: Vec<SuiteSummary>,
    totals: Totals,
    events_seen: usize,
    test_nanos: u64,
    first_timestamp: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<'a> Aggregator<'a> {
    /// New aggregation over `full_log`, the sanitized corpus used for
    /// failure context lookups
    #[must_use]
    pub fn new(full_log: &'a str, product: Product) -> Self {
        Self {
            full_log,
            product,
            counters: SuiteCounters::default(),
            pending: Vec::new(),
            suites: Vec::new(),
            summaries: Vec::new(),
            totals: Totals::default(),
            events_seen: 0,
            test_nanos: 0,
            first_timestamp: None,
            last_timestamp: None,
        }
    }

    /// Feed the next finalized event
    pub fn push(&mut self, event: RawEvent) {
        self.events_seen += 1;
        if let Some(ts) = event.timestamp {
            self.first_timestamp.get_or_insert(ts);
            self.last_timestamp = Some(ts);
        }

        match event.role {
            RecordRole::Test => {
                let Some(outcome) = TestOutcome::from_state(event.state) else {
                    debug!(name = %event.name, "test record without outcome ignored");
                    return;
                };
                self.counters.record(outcome);
                self.test_nanos = self.test_nanos.saturating_add(event.elapsed_nanos);
                self.pending.push(PendingTest { event, outcome });
            }
            RecordRole::Suite => {
                let nanos = match event.elapsed_nanos {
                    0 => self.pending_nanos(),
                    n => n,
                };
                self.snapshot(event.name, nanos, event.state.as_str().to_string(), true);
            }
        }
    }

    /// Finish aggregation
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NoEvents` if no event was pushed.
    pub fn finish(mut self) -> Result<ProcessedLog, ParseError> {
        if self.events_seen == 0 {
            return Err(ParseError::NoEvents {
                bytes: self.full_log.len(),
            });
        }

        if !self.pending.is_empty() {
            warn!(
                tests = self.pending.len(),
                "log ended before the last suite finished"
            );
            let nanos = self.pending_nanos();
            self.snapshot(
                UNTERMINATED_SUITE.to_string(),
                nanos,
                INCOMPLETE_STATUS.to_string(),
                false,
            );
        }

        let total_elapsed_minutes = match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => {
                (last - first).num_milliseconds().max(0) as f64 / 60_000.0
            }
            _ => nanos_to_minutes(self.test_nanos),
        };

        Ok(ProcessedLog {
            product: self.product,
            run_timestamp: self.first_timestamp,
            total_elapsed_minutes,
            totals: self.totals,
            suites: self.suites,
            summaries: self.summaries,
            truncated: false,
        })
    }

    fn pending_nanos(&self) -> u64 {
        self.pending
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.event.elapsed_nanos))
    }

    fn snapshot(&mut self, suite: String, nanos: u64, status: String, resolve_case: bool) {
        let counters = self.counters.take();
        let tests: Vec<TestDetail> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|p| self.detail(&suite, p))
            .collect();

        self.totals.total += counters.total();
        self.totals.passed += counters.passed;
        self.totals.failed += counters.failed;
        self.totals.skipped += counters.skipped;

        let case_id = if resolve_case {
            case_id::resolve(&suite, self.product)
                .inspect_err(|err| warn!(%err, "reporting without case id"))
                .ok()
        } else {
            None
        };

        debug!(
            suite = %suite,
            passed = counters.passed,
            failed = counters.failed,
            skipped = counters.skipped,
            "suite finished"
        );

        self.summaries.push(SuiteSummary {
            name: suite.clone(),
            elapsed_minutes: nanos_to_minutes(nanos),
            status,
            passed: counters.passed,
            failed: counters.failed,
            skipped: counters.skipped,
            case_id,
        });
        self.suites.push(SuiteOverview { name: suite, tests });
    }

    fn detail(&self, suite: &str, pending: PendingTest) -> TestDetail {
        let PendingTest { event, outcome } = pending;
        let error_log = if outcome == TestOutcome::Failed {
            self.error_log(suite, &event)
        } else {
            String::new()
        };
        TestDetail {
            suite: suite.to_string(),
            elapsed_minutes: event.elapsed_minutes(),
            name: event.name,
            outcome,
            error_log,
        }
    }

    /// Inline diagnostics first; log context only when there are none
    fn error_log(&self, suite: &str, event: &RawEvent) -> String {
        let inline = event.diagnostic_text.trim();
        if !inline.is_empty() {
            return inline.to_string();
        }
        let by_test = context::extract(self.full_log, &event.name);
        if !by_test.is_empty() {
            return by_test;
        }
        context::extract(self.full_log, suite)
    }
}

/// Aggregate a complete sequence of finalized events
///
/// # Errors
///
/// Returns `ParseError::NoEvents` if `events` is empty.
pub fn aggregate<I>(events: I, full_log: &str, product: Product) -> Result<ProcessedLog, ParseError>
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut aggregator = Aggregator::new(full_log, product);
    for event in events {
        aggregator.push(event);
    }
    aggregator.finish()
}
