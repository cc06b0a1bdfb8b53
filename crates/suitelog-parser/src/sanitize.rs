// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Terminal escape stripping
//!
//! Console output from test runs is colorized; the escape sequences have to go
//! before any brace scanning so they cannot split or pad a JSON record.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences ending in `m` (SGR colors) or `K` (erase in line)
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\x1b\[[0-9;?]*[mK]") {
    Ok(regex) => regex,
    Err(err) => panic!("ANSI pattern must compile: {err}"),
});

/// Remove ANSI color and erase-line sequences from `chunk`
///
/// Returns the input borrowed when there is nothing to strip. Removal is
/// repeated until no sequence remains, so nested fragments such as
/// `"\x1b\x1b[0m[0m"` do not reassemble into a new sequence and
/// `sanitize(sanitize(x)) == sanitize(x)` holds for any input.
#[must_use]
pub fn sanitize(chunk: &str) -> Cow<'_, str> {
    let mut out = ANSI_ESCAPE.replace_all(chunk, "");
    while ANSI_ESCAPE.is_match(&out) {
        out = Cow::Owned(ANSI_ESCAPE.replace_all(&out, "").into_owned());
    }
    out
}

/// Split off a trailing escape sequence that may continue in the next chunk
///
/// `text` should already be sanitized. The tail is the longest suffix made
/// only of `ESC`, `[` and parameter bytes, starting at its first `ESC`; no
/// sequence can start before it and still complete later, so sanitizing
/// `complete` now and `tail + next` later matches sanitizing the whole text.
#[must_use]
pub fn split_incomplete_escape(text: &str) -> (&str, &str) {
    let run_start = text
        .bytes()
        .rposition(|b| !matches!(b, 0x1b | b'[' | b'0'..=b'9' | b';' | b'?'))
        .map_or(0, |idx| idx + 1);
    match text[run_start..].find('\x1b') {
        Some(offset) => text.split_at(run_start + offset),
        None => (text, ""),
    }
}
