// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Failure context windows
//!
//! When a failed record carries no inline diagnostics, the surrounding console
//! output usually does. This module pulls a short window of lines after every
//! line that mentions the test or suite.

/// Lines kept after each mention line
pub const TRAILING_LINES: usize = 5;

/// Collect context windows for `name` from `full_log`
///
/// Every line containing `name` (case-insensitive) contributes itself plus
/// the next [`TRAILING_LINES`] lines, each terminated by `\n`. Windows are
/// emitted in log order and may overlap. Returns an empty string when nothing
/// matches or `name` is empty.
#[must_use]
pub fn extract(full_log: &str, name: &str) -> String {
    let needle = name.to_lowercase();
    if needle.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = full_log.lines().collect();
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains(&needle) {
            continue;
        }
        let end = (idx + 1 + TRAILING_LINES).min(lines.len());
        for window_line in &lines[idx..end] {
            out.push_str(window_line);
            out.push('\n');
        }
    }
    out
}
