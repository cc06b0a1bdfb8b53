// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Incremental record scanner
//!
//! Test logs arrive in chunks that can split a JSON record anywhere. The
//! scanner finds balanced `{...}` spans in the text, hands parsed spans to the
//! [`Classifier`], and keeps an incomplete trailing span as carry for the next
//! call. Everything that is not a recognized record is plain text, which is
//! folded into the open event's diagnostics when that event failed.
//!
//! Braces are matched in one pass with a stack of open braces, so every byte
//! is visited once no matter how many stray braces a line holds.
//!
//! The state between calls lives in a [`ParserState`] owned by the caller:
//!
//! ```
//! use suitelog_parser::classify::Classifier;
//! use suitelog_parser::scanner::{self, ParserState};
//!
//! let classifier = Classifier::any_product();
//! let first = scanner::scan(&classifier, ParserState::new(), r#"{"state":"passed","na"#);
//! assert!(first.events.is_empty());
//!
//! let second = scanner::scan(&classifier, first.state, r#"me":"T1","type":"k3s test"}"#);
//! let drained = scanner::finish(second.state);
//! assert_eq!(drained.last.map(|e| e.name).as_deref(), Some("T1"));
//! assert!(drained.leftover.is_empty());
//! ```

use serde_json::Value;
use tracing::{debug, trace};

use crate::classify::{Classifier, RawEvent};
use crate::sanitize::{sanitize, split_incomplete_escape};

/// A closed `{...}` span and the closed spans directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClosedSpan {
    start: usize,
    end: usize,
    children: Vec<usize>,
}

/// An opening brace whose partner has not been seen yet
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenBrace {
    offset: usize,
    children: Vec<usize>,
}

/// Outcome of advancing the matcher over more input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    /// The outermost brace closed; the span is at this index of `closed`
    Closed(usize),
    /// A newline at this offset was reached with braces still open
    Abandoned(usize),
    /// Input ran out with braces still open
    Incomplete,
}

/// Brace matching for one candidate span, resumable across chunks
///
/// Closed inner spans are kept as a flat tree (`closed` plus child indices)
/// so a malformed outer span can still give up the records nested in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BraceMatcher {
    open: Vec<OpenBrace>,
    closed: Vec<ClosedSpan>,
    in_string: bool,
    escaped: bool,
}

impl BraceMatcher {
    fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    fn push_open(&mut self, offset: usize) {
        self.open.push(OpenBrace {
            offset,
            children: Vec::new(),
        });
    }

    /// Walk `buf` from byte offset `from` until the outermost brace closes
    ///
    /// Records are single-line, so a newline before the closing brace means
    /// the open braces were console text. Braces inside string literals do
    /// not count.
    fn advance(&mut self, buf: &str, from: usize) -> Advance {
        for (offset, byte) in buf.as_bytes()[from..].iter().enumerate() {
            let at = from + offset;
            if *byte == b'\n' {
                return Advance::Abandoned(at);
            }
            if self.in_string {
                match byte {
                    _ if self.escaped => self.escaped = false,
                    b'\\' => self.escaped = true,
                    b'"' => self.in_string = false,
                    _ => {}
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' => self.push_open(at),
                b'}' => {
                    let Some(brace) = self.open.pop() else {
                        continue;
                    };
                    let index = self.closed.len();
                    self.closed.push(ClosedSpan {
                        start: brace.offset,
                        end: at + 1,
                        children: brace.children,
                    });
                    match self.open.last_mut() {
                        Some(parent) => parent.children.push(index),
                        None => return Advance::Closed(index),
                    }
                }
                _ => {}
            }
        }
        Advance::Incomplete
    }

    /// Hand back the matched spans and start over
    fn reset(&mut self) -> (Vec<ClosedSpan>, Vec<OpenBrace>) {
        self.in_string = false;
        self.escaped = false;
        (
            std::mem::take(&mut self.closed),
            std::mem::take(&mut self.open),
        )
    }

    /// Shift every offset down after the buffer lost its first `by` bytes
    fn rebase(&mut self, by: usize) {
        if by == 0 {
            return;
        }
        for brace in &mut self.open {
            brace.offset -= by;
        }
        for span in &mut self.closed {
            span.start -= by;
            span.end -= by;
        }
    }
}

/// Scanner phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the next `{` at or after the cursor
    SearchingForOpen,
    /// Matching braces, next byte at `pos`
    ScanningBalanced { pos: usize },
    /// The outermost span at this index of the matcher's spans is closed
    Emit { span: usize },
    /// The line ended at `newline` before the open braces balanced
    Abandon { newline: usize },
}

/// Pieces of a span still to be handed out, in input order
#[derive(Debug, Clone, Copy)]
enum Piece {
    Text(usize, usize),
    Span(usize),
}

/// Receives text and candidate records in input order
struct Emitter<'c> {
    classifier: &'c Classifier,
    open: Option<RawEvent>,
    events: Vec<RawEvent>,
}

impl Emitter<'_> {
    fn text(&mut self, text: &str) {
        fold(&mut self.open, text);
    }

    /// Parse and classify `span`; false if it is not valid JSON
    fn record(&mut self, span: &str) -> bool {
        let value = match serde_json::from_str::<Value>(span) {
            Ok(value) => value,
            Err(err) => {
                trace!(error = %err, "malformed fragment treated as text");
                return false;
            }
        };
        match self.classifier.classify(value) {
            Some(event) => {
                if let Some(done) = self.open.replace(event) {
                    debug!(name = %done.name, state = done.state.as_str(), "event finalized");
                    self.events.push(done);
                }
            }
            None => self.text(span),
        }
        true
    }

    /// Hand out `buf[from..to]`, trying the given closed spans as records
    ///
    /// A span that does not parse is text, except for the spans inside it,
    /// which are tried in turn.
    fn resolve(
        &mut self,
        buf: &str,
        closed: &[ClosedSpan],
        from: usize,
        spans: &[usize],
        to: usize,
    ) {
        let mut pieces = Vec::new();
        push_pieces(&mut pieces, closed, from, spans, to);
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(start, end) => self.text(&buf[start..end]),
                Piece::Span(index) => {
                    let span = &closed[index];
                    if !self.record(&buf[span.start..span.end]) {
                        push_pieces(&mut pieces, closed, span.start, &span.children, span.end);
                    }
                }
            }
        }
    }
}

/// Queue `from..to` split around `spans`; pieces pop off the end in order
fn push_pieces(
    pieces: &mut Vec<Piece>,
    closed: &[ClosedSpan],
    from: usize,
    spans: &[usize],
    to: usize,
) {
    let mut end = to;
    for &index in spans.iter().rev() {
        pieces.push(Piece::Text(closed[index].end, end));
        pieces.push(Piece::Span(index));
        end = closed[index].start;
    }
    pieces.push(Piece::Text(from, end));
}

/// Carry-over between successive [`scan`] calls of one parsing session
///
/// A state belongs to exactly one log source. Start every parse with a fresh
/// [`ParserState::new`] and thread the returned state into the next call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    carry: String,
    matcher: BraceMatcher,
    escape_tail: String,
    open: Option<RawEvent>,
}

impl ParserState {
    /// Fresh state with no carry and no open event
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconsumed text: an incomplete span starting at `{`, or empty
    #[must_use]
    pub fn carry(&self) -> &str {
        &self.carry
    }

    /// The most recent recognized event, not yet emitted
    #[must_use]
    pub fn open_event(&self) -> Option<&RawEvent> {
        self.open.as_ref()
    }
}

/// Result of one [`scan`] call
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    /// Events finalized by this chunk, in input order
    pub events: Vec<RawEvent>,
    /// State to pass to the next call
    pub state: ParserState,
}

/// Result of [`finish`]
#[derive(Debug, Clone, PartialEq)]
pub struct Drained {
    /// The event that was still open at end of input
    pub last: Option<RawEvent>,
    /// Incomplete span left over; non-empty means truncated input
    pub leftover: String,
}

/// Scan one chunk of raw log text
///
/// The chunk is sanitized, appended to the carry, and scanned. Returns the
/// events finalized so far; the most recent recognized event stays open in
/// the returned state because trailing text may still belong to it.
#[must_use]
pub fn scan(classifier: &Classifier, state: ParserState, chunk: &str) -> ScanOutput {
    if chunk.is_empty() {
        return ScanOutput {
            events: Vec::new(),
            state,
        };
    }

    let ParserState {
        carry,
        mut matcher,
        mut escape_tail,
        open,
    } = state;

    // An escape sequence cut by the chunk boundary is held back until it completes
    escape_tail.push_str(chunk);
    let cleaned = sanitize(&escape_tail);
    let (body, tail) = split_incomplete_escape(&cleaned);

    let resume_at = carry.len();
    let mut buf = carry;
    buf.push_str(body);
    let escape_tail = tail.to_string();

    let mut emitter = Emitter {
        classifier,
        open,
        events: Vec::new(),
    };
    // Start of the text not yet handed out; the carry starts at its first brace
    let mut cursor = 0;
    let mut phase = if matcher.is_open() {
        Phase::ScanningBalanced { pos: resume_at }
    } else {
        Phase::SearchingForOpen
    };

    loop {
        phase = match phase {
            Phase::SearchingForOpen => match buf[cursor..].find('{') {
                Some(rel) => {
                    let start = cursor + rel;
                    emitter.text(&buf[cursor..start]);
                    cursor = start;
                    matcher.push_open(start);
                    Phase::ScanningBalanced { pos: start + 1 }
                }
                None => {
                    emitter.text(&buf[cursor..]);
                    cursor = buf.len();
                    break;
                }
            },
            Phase::ScanningBalanced { pos } => match matcher.advance(&buf, pos) {
                Advance::Closed(span) => Phase::Emit { span },
                Advance::Abandoned(newline) => Phase::Abandon { newline },
                Advance::Incomplete => break,
            },
            Phase::Emit { span } => {
                let (closed, _) = matcher.reset();
                let end = closed[span].end;
                emitter.resolve(&buf, &closed, cursor, &[span], end);
                cursor = end;
                Phase::SearchingForOpen
            }
            Phase::Abandon { newline } => {
                let (closed, open) = matcher.reset();
                let spans: Vec<usize> = open
                    .iter()
                    .flat_map(|brace| brace.children.iter().copied())
                    .collect();
                emitter.resolve(&buf, &closed, cursor, &spans, newline);
                cursor = newline;
                Phase::SearchingForOpen
            }
        };
    }

    buf.drain(..cursor);
    matcher.rebase(cursor);
    ScanOutput {
        events: emitter.events,
        state: ParserState {
            carry: buf,
            matcher,
            escape_tail,
            open: emitter.open,
        },
    }
}

/// End a session: emit the open event and report any leftover carry
#[must_use]
pub fn finish(mut state: ParserState) -> Drained {
    fold(&mut state.open, &state.escape_tail);
    if !state.carry.is_empty() {
        debug!(
            bytes = state.carry.len(),
            "log ended inside an unclosed record; dropping leftover text"
        );
    }
    Drained {
        last: state.open,
        leftover: state.carry,
    }
}

fn fold(open: &mut Option<RawEvent>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(event) = open.as_mut() {
        event.append_diagnostic(text);
    }
}

/// A scanning session that owns its classifier and state
#[derive(Debug, Clone, Default)]
pub struct RecordScanner {
    classifier: Classifier,
    state: ParserState,
}

impl RecordScanner {
    /// New session using `classifier`
    #[must_use]
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            state: ParserState::new(),
        }
    }

    /// Scan the next chunk, returning events finalized by it
    pub fn push(&mut self, chunk: &str) -> Vec<RawEvent> {
        let state = std::mem::take(&mut self.state);
        let output = scan(&self.classifier, state, chunk);
        self.state = output.state;
        output.events
    }

    /// Current carry-over state
    #[must_use]
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// End the session
    #[must_use]
    pub fn finish(self) -> Drained {
        finish(self.state)
    }
}

/// Scan a complete corpus in one call and return every event
///
/// The second value is the leftover carry (see [`Drained::leftover`]).
#[must_use]
pub fn scan_all(classifier: &Classifier, corpus: &str) -> (Vec<RawEvent>, String) {
    let mut scanner = RecordScanner::new(*classifier);
    let mut events = scanner.push(corpus);
    let drained = scanner.finish();
    events.extend(drained.last);
    (events, drained.leftover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::EventState;
    use similar_asserts::assert_eq;

    const T1: &str = r#"{"state":"passed","name":"T1","type":"k3s test","time":1000000}"#;
    const T2: &str = r#"{"state":"failed","name":"T2","type":"k3s test","time":2000000}"#;

    fn names(events: &[RawEvent]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    fn scan_chunks(chunks: &[&str]) -> (Vec<RawEvent>, String) {
        let mut scanner = RecordScanner::new(Classifier::any_product());
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(scanner.push(chunk));
        }
        let drained = scanner.finish();
        events.extend(drained.last);
        (events, drained.leftover)
    }

    #[test]
    fn test_split_inside_second_record() {
        let corpus = format!("{T1}\nok\n{T2}");
        let split = corpus.len() - 20;
        let (events, leftover) = scan_chunks(&[&corpus[..split], &corpus[split..]]);

        assert_eq!(names(&events), vec!["T1", "T2"]);
        assert_eq!(events[0].state, EventState::Passed);
        assert_eq!(events[1].state, EventState::Failed);
        assert!(events[0].elapsed_minutes() < 0.001);
        assert_eq!(events[1].diagnostic_text, "");
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_open_event_is_held_until_next_record() {
        let classifier = Classifier::any_product();
        let out = scan(&classifier, ParserState::new(), T1);
        assert!(out.events.is_empty());
        assert_eq!(out.state.open_event().map(|e| e.name.as_str()), Some("T1"));

        let out = scan(&classifier, out.state, T2);
        assert_eq!(names(&out.events), vec!["T1"]);
    }

    #[test]
    fn test_empty_chunk_keeps_state() {
        let classifier = Classifier::any_product();
        let out = scan(&classifier, ParserState::new(), r#"{"state":"pass"#);
        let before = out.state.clone();
        let out = scan(&classifier, out.state, "");
        assert!(out.events.is_empty());
        assert_eq!(out.state, before);
    }

    #[test]
    fn test_partial_record_is_carried_whole() {
        let partial = r#"{"state":"passed","name":"T1","ty"#;
        let out = scan(&Classifier::any_product(), ParserState::new(), partial);
        assert!(out.events.is_empty());
        assert_eq!(out.state.carry(), partial);
        assert!(out.state.open_event().is_none());
    }

    #[test]
    fn test_trailing_text_goes_to_failed_event() {
        let corpus = format!("{T2}\npanic: boom\n  at main.go:12\n{T1}");
        let (events, _) = scan_chunks(&[&corpus]);
        assert_eq!(events[0].diagnostic_text, "\npanic: boom\n  at main.go:12\n");
        assert_eq!(events[1].diagnostic_text, "");
    }

    #[test]
    fn test_text_after_passed_event_is_dropped() {
        let corpus = format!("{T1}\nnoise\n");
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(events[0].diagnostic_text, "");
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_irrelevant_json_is_folded_as_text() {
        let corpus = format!("{T2}\n{{\"kind\":\"Pod\",\"spec\":{{\"x\":1}}}}\n");
        let (events, _) = scan_chunks(&[&corpus]);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].diagnostic_text,
            "\n{\"kind\":\"Pod\",\"spec\":{\"x\":1}}\n"
        );
    }

    #[test]
    fn test_malformed_span_does_not_hide_inner_record() {
        let corpus = format!("{{ junk {T1} }}");
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(names(&events), vec!["T1"]);
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_unclosed_brace_on_console_line_is_text() {
        let corpus = format!("{T2}\nmap[string]interface{{ truncated\n{T1}");
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(names(&events), vec!["T2", "T1"]);
        assert_eq!(
            events[0].diagnostic_text,
            "\nmap[string]interface{ truncated\n"
        );
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_braces_inside_strings() {
        let record = r#"{"state":"passed","name":"weird } name {","type":"k3s test"}"#;
        let (events, _) = scan_chunks(&[record]);
        assert_eq!(names(&events), vec!["weird } name {"]);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let record = r#"{"state":"passed","name":"say \"}\" ok","type":"k3s test"}"#;
        let (events, _) = scan_chunks(&[record]);
        assert_eq!(names(&events), vec![r#"say "}" ok"#]);
    }

    #[test]
    fn test_ansi_codes_are_stripped_before_scanning() {
        let colored = "\x1b[32m{\"state\":\"passed\",\"name\":\"T1\",\x1b[0m\"type\":\"k3s test\"}";
        let (events, _) = scan_chunks(&[colored]);
        assert_eq!(names(&events), vec!["T1"]);
    }

    #[test]
    fn test_truncated_corpus_reports_leftover() {
        let corpus = format!("{T1}\n{{\"state\":\"failed\",\"na");
        let (events, leftover) = scan_all(&Classifier::any_product(), &corpus);
        assert_eq!(names(&events), vec!["T1"]);
        assert_eq!(leftover, "{\"state\":\"failed\",\"na");
    }

    #[test]
    fn test_every_split_point_gives_same_events() {
        let corpus = format!(
            "\x1b[1mstart\x1b[0m\n{T1}\nok\n{T2}\nError: {{ oops\n  details\n{{\"a\":{{\"b\":2}}}}\n{T1}\ntail"
        );
        let (expected, expected_left) = scan_chunks(&[&corpus]);
        assert_eq!(expected.len(), 3);

        for split in 1..corpus.len() {
            if !corpus.is_char_boundary(split) {
                continue;
            }
            let (events, leftover) = scan_chunks(&[&corpus[..split], &corpus[split..]]);
            assert_eq!(events, expected, "split at {split}");
            assert_eq!(leftover, expected_left, "split at {split}");
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let corpus = format!("{T2}\nfailure detail\n{T1}\n");
        let (expected, _) = scan_chunks(&[&corpus]);
        let pieces: Vec<String> = corpus.chars().map(String::from).collect();
        let refs: Vec<&str> = pieces.iter().map(String::as_str).collect();
        let (events, leftover) = scan_chunks(&refs);
        assert_eq!(events, expected);
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_long_run_of_open_braces_is_text() {
        let braces = "{".repeat(200_000);
        let corpus = format!("{T2}\n{braces}\n{T1}\n");
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(names(&events), vec!["T2", "T1"]);
        assert_eq!(events[0].diagnostic_text, format!("\n{braces}\n"));
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_deeply_nested_malformed_span() {
        let depth = 50_000;
        let corpus = format!("{T2}\n{}{}\n", "{".repeat(depth), "}".repeat(depth));
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(names(&events), vec!["T2"]);
        assert_eq!(events[0].diagnostic_text.len(), 2 * depth + 2);
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_record_inside_unclosed_console_line() {
        let corpus = format!("{T2}\nwaiting {{ {T1} still open\nnext\n");
        let (events, leftover) = scan_chunks(&[&corpus]);
        assert_eq!(names(&events), vec!["T2", "T1"]);
        assert_eq!(events[0].diagnostic_text, "\nwaiting { ");
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_nested_record_in_malformed_span_across_chunks() {
        let corpus = format!("{T2}\n{{ bad {{ {T1} }} }}\n");
        let (expected, _) = scan_chunks(&[&corpus]);
        assert_eq!(names(&expected), vec!["T2", "T1"]);
        assert_eq!(expected[0].diagnostic_text, "\n{ bad { ");

        for split in 1..corpus.len() {
            let (events, leftover) = scan_chunks(&[&corpus[..split], &corpus[split..]]);
            assert_eq!(events, expected, "split at {split}");
            assert!(leftover.is_empty(), "split at {split}");
        }
    }

    #[test]
    fn test_carry_offsets_survive_later_chunks() {
        let classifier = Classifier::any_product();
        let out = scan(&classifier, ParserState::new(), "text before {\"a\":{\"b\":1},");
        assert_eq!(out.state.carry(), "{\"a\":{\"b\":1},");
        let out = scan(&classifier, out.state, &format!(" oops {T1} }}\n"));
        assert!(out.events.is_empty());
        let drained = finish(out.state);
        assert_eq!(drained.last.map(|e| e.name).as_deref(), Some("T1"));
        assert!(drained.leftover.is_empty());
    }
}
