// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the incremental record scanner
//!
//! Feeds arbitrary text in arbitrary chunk sizes and checks the events match
//! a single-chunk scan of the same text.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use suitelog_parser::classify::Classifier;
use suitelog_parser::scanner::{RecordScanner, scan_all};

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    chunk_sizes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let classifier = Classifier::any_product();
    let (expected, expected_left) = scan_all(&classifier, &input.text);

    let mut scanner = RecordScanner::new(classifier);
    let mut events = Vec::new();
    let mut rest = input.text.as_str();
    for size in input.chunk_sizes.iter().map(|s| usize::from(*s).max(1)) {
        if rest.is_empty() {
            break;
        }
        let mut cut = size.min(rest.len());
        while !rest.is_char_boundary(cut) {
            cut += 1;
        }
        let (head, tail) = rest.split_at(cut);
        events.extend(scanner.push(head));
        rest = tail;
    }
    events.extend(scanner.push(rest));
    let drained = scanner.finish();
    events.extend(drained.last);

    assert_eq!(events, expected);
    assert_eq!(drained.leftover, expected_left);
});
