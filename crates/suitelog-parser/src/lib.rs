// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! suitelog-parser: structured results from raw test-run logs
//!
//! A k3s/rke2 test run prints colored console output with single-line JSON
//! test records mixed in. This crate strips the escape codes, finds the
//! records (even when a read boundary splits one), attaches trailing console
//! text to failed tests, and groups everything into suites.
//!
//! # Example
//!
//! ```
//! use suitelog_parser::{LogSession, Product, parse_log};
//!
//! let output = concat!(
//!     r#"{"state":"passed","name":"nodes ready","type":"k3s test","time":1000000}"#, "\n",
//!     r#"{"state":"passed","name":"validatecluster","type":"k3s suite","time":0}"#, "\n",
//! );
//!
//! // Parse a complete log
//! let log = parse_log(output, Product::K3s).unwrap();
//! assert_eq!(log.totals.passed, 1);
//!
//! // Or feed it in chunks as it is read
//! let mut session = LogSession::new(Product::K3s);
//! for chunk in [&output[..30], &output[30..]] {
//!     session.push(chunk);
//! }
//! assert_eq!(session.finish().unwrap().totals, log.totals);
//! ```

pub mod aggregate;
pub mod case_id;
pub mod classify;
pub mod context;
pub mod error;
pub mod result;
pub mod sanitize;
pub mod scanner;
pub mod session;

pub use aggregate::{Aggregator, aggregate};
pub use case_id::{Product, resolve};
pub use classify::{Classifier, EventState, RawEvent, RecordRole};
pub use error::{CaseIdError, ParseError};
pub use result::{
    ProcessedLog, SuiteCounters, SuiteOverview, SuiteSummary, TestDetail, TestOutcome, Totals,
};
pub use scanner::{ParserState, RecordScanner, ScanOutput, scan};
pub use session::{LogSession, parse_chunks, parse_log};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::case_id::Product;
    pub use crate::error::ParseError;
    pub use crate::result::{ProcessedLog, SuiteSummary, TestDetail, TestOutcome};
    pub use crate::session::{LogSession, parse_log};
}
