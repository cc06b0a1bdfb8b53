// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reading a log source into a parsing session

use std::io::Read;

use thiserror::Error;
use tracing::{debug, info, warn};

use suitelog_parser::{LogSession, ParseError, ProcessedLog, Product};

/// Errors while reading and parsing a log source
#[derive(Debug, Error)]
pub enum RunError {
    /// Error reading the log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The log could not be turned into a result
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Read `reader` to the end and parse it
///
/// With `chunk_size == 0` the whole log is read first and parsed in one call;
/// otherwise it is fed to the session `chunk_size` bytes at a time. Invalid
/// UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns `RunError::Io` on read failure and `RunError::Parse` when the log
/// holds no test records.
pub fn process<R: Read>(
    mut reader: R,
    product: Product,
    chunk_size: usize,
) -> Result<ProcessedLog, RunError> {
    let mut session = LogSession::new(product);

    if chunk_size == 0 {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!(bytes = bytes.len(), "read log in one piece");
        session.push(&String::from_utf8_lossy(&bytes));
    } else {
        let mut decoder = Utf8Chunks::default();
        let mut buf = vec![0u8; chunk_size];
        let mut chunks = 0usize;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            chunks += 1;
            session.push(&decoder.decode(&buf[..n]));
        }
        session.push(&decoder.flush());
        debug!(chunks, "read log in chunks");
    }

    let log = session.finish()?;
    if log.truncated {
        warn!("log ends inside an unfinished record; the trailing record was dropped");
    }
    info!(
        suites = log.summaries.len(),
        passed = log.totals.passed,
        failed = log.totals.failed,
        skipped = log.totals.skipped,
        "log processed"
    );
    Ok(log)
}

/// Decodes UTF-8 across read boundaries
///
/// A multi-byte character split by a read is held until the next read.
#[derive(Debug, Default)]
struct Utf8Chunks {
    partial: Vec<u8>,
}

impl Utf8Chunks {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.partial.extend_from_slice(bytes);
        let keep_from = match std::str::from_utf8(&self.partial) {
            Ok(_) => self.partial.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => incomplete_suffix_start(&self.partial),
        };
        let rest = self.partial.split_off(keep_from);
        let text = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial = rest;
        text
    }

    fn flush(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        text
    }
}

/// Start of a trailing incomplete sequence, or `bytes.len()` if there is none
fn incomplete_suffix_start(bytes: &[u8]) -> usize {
    let tail_from = bytes.len().saturating_sub(3);
    (tail_from..bytes.len())
        .find(|&i| {
            let lead = bytes[i];
            let needed = match lead {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => return false,
            };
            bytes.len() - i < needed
        })
        .unwrap_or(bytes.len())
}
