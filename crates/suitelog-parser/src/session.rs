// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parsing sessions
//!
//! A [`LogSession`] ties the scanner and the aggregator together for one log
//! source. Feeding a corpus in one piece or in any number of chunks produces
//! the same [`ProcessedLog`].

use tracing::debug;

use crate::aggregate::aggregate;
use crate::case_id::Product;
use crate::classify::{Classifier, RawEvent};
use crate::error::ParseError;
use crate::result::ProcessedLog;
use crate::sanitize::sanitize;
use crate::scanner::RecordScanner;

/// One parse of one log source
#[derive(Debug, Clone)]
pub struct LogSession {
    product: Product,
    scanner: RecordScanner,
    events: Vec<RawEvent>,
    raw: String,
}

impl LogSession {
    /// New session accepting only `product`'s records
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self::with_classifier(product, Classifier::for_product(product))
    }

    /// New session with a custom classifier
    #[must_use]
    pub fn with_classifier(product: Product, classifier: Classifier) -> Self {
        Self {
            product,
            scanner: RecordScanner::new(classifier),
            events: Vec::new(),
            raw: String::new(),
        }
    }

    /// Feed the next chunk of raw log text
    pub fn push(&mut self, chunk: &str) {
        self.raw.push_str(chunk);
        let events = self.scanner.push(chunk);
        self.events.extend(events);
    }

    /// Events finalized so far
    #[must_use]
    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    /// Whether the input so far ends inside an unclosed record
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        !self.scanner.state().carry().is_empty()
    }

    /// Finish the session and aggregate
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NoEvents` if the log held no recognized records.
    pub fn finish(self) -> Result<ProcessedLog, ParseError> {
        let Self {
            product,
            scanner,
            mut events,
            raw,
        } = self;

        let drained = scanner.finish();
        events.extend(drained.last);
        debug!(
            events = events.len(),
            truncated = !drained.leftover.is_empty(),
            %product,
            "scan complete"
        );

        let full_log = sanitize(&raw);
        let mut log = aggregate(events, &full_log, product)?;
        log.truncated = !drained.leftover.is_empty();
        Ok(log)
    }
}

/// Parse a complete corpus
///
/// # Errors
///
/// Returns `ParseError::NoEvents` if the corpus held no recognized records.
pub fn parse_log(corpus: &str, product: Product) -> Result<ProcessedLog, ParseError> {
    let mut session = LogSession::new(product);
    session.push(corpus);
    session.finish()
}

/// Parse a corpus delivered in chunks
///
/// # Errors
///
/// Returns `ParseError::NoEvents` if the chunks held no recognized records.
pub fn parse_chunks<I, S>(chunks: I, product: Product) -> Result<ProcessedLog, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut session = LogSession::new(product);
    for chunk in chunks {
        session.push(chunk.as_ref());
    }
    session.finish()
}
