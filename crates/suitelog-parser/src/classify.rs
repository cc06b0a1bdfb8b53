// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event classification
//!
//! Test runs print plenty of JSON that has nothing to do with test results
//! (kubectl output, cloud API responses). A parsed object only becomes a
//! [`RawEvent`] when its `type` names a known product marker and its `state`
//! is one of the recognized values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::case_id::Product;

/// Reported state of a test or suite record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
    /// Anything else the framework reports (pending, interrupted, ...)
    Other,
}

impl EventState {
    /// Lower-case name as it appears in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventState::Passed => "passed",
            EventState::Failed => "failed",
            EventState::Skipped => "skipped",
            EventState::Other => "other",
        }
    }
}

/// What a recognized record stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRole {
    /// A single test finished (`"<product> test"`)
    Test,
    /// A suite finished (`"<product> suite"`)
    Suite,
}

/// A recognized record, possibly still collecting diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Reported state
    pub state: EventState,
    /// Test name, or suite name for suite markers
    pub name: String,
    /// The record's `type` discriminator as written
    pub kind: String,
    /// Product decoded from `kind`
    pub product: Product,
    /// Role decoded from `kind`
    pub role: RecordRole,
    /// Elapsed time in nanoseconds
    pub elapsed_nanos: u64,
    /// Wall-clock time of the record, when present
    pub timestamp: Option<DateTime<Utc>>,
    /// Text that followed the record while it was open and failed
    pub diagnostic_text: String,
}

impl RawEvent {
    /// Whether trailing text should be folded into this event
    #[must_use]
    pub fn collects_diagnostics(&self) -> bool {
        self.state == EventState::Failed
    }

    /// Append folded text; ignored unless the event failed
    pub fn append_diagnostic(&mut self, text: &str) {
        if self.collects_diagnostics() {
            self.diagnostic_text.push_str(text);
        }
    }

    /// Elapsed time in minutes
    #[must_use]
    pub fn elapsed_minutes(&self) -> f64 {
        nanos_to_minutes(self.elapsed_nanos)
    }
}

/// Convert nanoseconds to minutes
#[must_use]
pub fn nanos_to_minutes(nanos: u64) -> f64 {
    nanos as f64 / 60_000_000_000.0
}

/// JSON shape of a candidate record
#[derive(Debug, Deserialize)]
struct WireRecord {
    state: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    time: Option<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Decide which parsed JSON objects are test events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    product: Option<Product>,
}

impl Classifier {
    /// Accept markers of every supported product
    #[must_use]
    pub fn any_product() -> Self {
        Self { product: None }
    }

    /// Accept only markers of `product`
    #[must_use]
    pub fn for_product(product: Product) -> Self {
        Self {
            product: Some(product),
        }
    }

    /// Turn `value` into a [`RawEvent`], or `None` if it is incidental JSON
    #[must_use]
    pub fn classify(&self, value: Value) -> Option<RawEvent> {
        let record: WireRecord = serde_json::from_value(value).ok()?;
        let (product, role) = self.parse_kind(&record.kind)?;
        let state = parse_state(&record.state)?;

        Some(RawEvent {
            state,
            name: record.name,
            kind: record.kind,
            product,
            role,
            elapsed_nanos: record.time.map_or(0, |t| t.max(0.0) as u64),
            timestamp: record.timestamp,
            diagnostic_text: String::new(),
        })
    }

    fn parse_kind(&self, kind: &str) -> Option<(Product, RecordRole)> {
        let kind = kind.trim().to_ascii_lowercase();
        let (product, role) = kind.split_once(' ')?;
        let product = Product::ALL
            .into_iter()
            .find(|p| p.as_str() == product)?;
        if self.product.is_some_and(|wanted| wanted != product) {
            return None;
        }
        let role = match role.trim() {
            "test" => RecordRole::Test,
            "suite" => RecordRole::Suite,
            _ => return None,
        };
        Some((product, role))
    }
}

fn parse_state(state: &str) -> Option<EventState> {
    match state.trim().to_ascii_lowercase().as_str() {
        "passed" => Some(EventState::Passed),
        "failed" => Some(EventState::Failed),
        "skipped" => Some(EventState::Skipped),
        "other" => Some(EventState::Other),
        _ => None,
    }
}
