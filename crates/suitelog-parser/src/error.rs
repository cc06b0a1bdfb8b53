// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for suitelog-parser

use thiserror::Error;

use crate::case_id::Product;

/// Errors surfaced to callers of the log parser
///
/// Per-fragment anomalies (malformed or irrelevant JSON) never show up here;
/// they are folded into the text stream instead.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The corpus contained no recognized test events
    #[error("no test events found in log ({bytes} bytes scanned)")]
    NoEvents {
        /// Size of the scanned corpus
        bytes: usize,
    },

    /// Product discriminator is not one of the supported products
    #[error("unknown product '{value}' (expected one of: k3s, rke2)")]
    UnknownProduct {
        /// The rejected value
        value: String,
    },
}

/// A suite name with no entry in the product's case-ID table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseIdError {
    /// No keyword matched the normalized suite name
    #[error("no case id for suite '{suite}' ({product})")]
    NotFound {
        /// Suite name as given
        suite: String,
        /// Product whose table was searched
        product: Product,
    },
}
