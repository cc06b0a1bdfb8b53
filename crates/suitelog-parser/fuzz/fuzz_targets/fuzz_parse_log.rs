// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for one-shot log parsing
//!
//! `parse_log` should never panic on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;

use suitelog_parser::{Product, parse_log};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for product in Product::ALL {
            let _ = parse_log(input, product);
        }
    }
});
