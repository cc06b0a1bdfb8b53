// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Suite name to external case-ID mapping
//!
//! Each product carries a hand-maintained keyword table. A suite name is
//! normalized and matched by substring against the keywords in table order;
//! the first hit wins. Several keywords are substrings of others (`upgrade`
//! vs `upgrademanual`), so the more specific entries must come first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CaseIdError, ParseError};

/// Kubernetes distribution the test run targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Lightweight Kubernetes
    #[default]
    K3s,
    /// Rancher Kubernetes Engine 2
    Rke2,
}

impl Product {
    /// All supported products
    pub const ALL: [Product; 2] = [Product::K3s, Product::Rke2];

    /// Lower-case product identifier as it appears in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Product::K3s => "k3s",
            Product::Rke2 => "rke2",
        }
    }

    fn case_table(self) -> &'static [(&'static str, u32)] {
        match self {
            Product::K3s => K3S_CASES,
            Product::Rke2 => RKE2_CASES,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "k3s" => Ok(Product::K3s),
            "rke2" => Ok(Product::Rke2),
            _ => Err(ParseError::UnknownProduct {
                value: s.to_string(),
            }),
        }
    }
}

const K3S_CASES: &[(&str, u32)] = &[
    ("upgrademanual", 201),
    ("upgradesuc", 202),
    ("upgradenode", 203),
    ("dualstack", 204),
    ("clusterreset", 205),
    ("restartservice", 206),
    ("secretsencryption", 207),
    ("certrotate", 208),
    ("killall", 209),
    ("rebootinstances", 210),
    ("deployrancher", 211),
    ("selinux", 212),
    ("airgap", 213),
    ("createcluster", 214),
    ("validatecluster", 215),
    ("upgrade", 216),
];

const RKE2_CASES: &[(&str, u32)] = &[
    ("upgrademanual", 301),
    ("upgradesuc", 302),
    ("upgradenode", 303),
    ("dualstack", 304),
    ("clusterreset", 305),
    ("restartservice", 306),
    ("secretsencryption", 307),
    ("certrotate", 308),
    ("killall", 309),
    ("rebootinstances", 310),
    ("deployrancher", 311),
    ("selinux", 312),
    ("airgap", 313),
    ("windows", 314),
    ("createcluster", 315),
    ("validatecluster", 316),
    ("upgrade", 317),
];

/// Lower-case `name` and drop separator characters
#[must_use]
pub fn normalize_suite_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '.' | '/'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve the external case ID for `suite` under `product`
///
/// # Errors
///
/// Returns `CaseIdError::NotFound` when no keyword of the product table is
/// contained in the normalized suite name. Callers treat this as a warning.
pub fn resolve(suite: &str, product: Product) -> Result<u32, CaseIdError> {
    let normalized = normalize_suite_name(suite);
    product
        .case_table()
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|&(_, id)| id)
        .ok_or_else(|| CaseIdError::NotFound {
            suite: suite.to_string(),
            product,
        })
}
