//! suitelog library
//!
//! This module exports the command's configuration, input handling and
//! rendering for use in integration tests and as a library.

pub mod config;
pub mod report;
pub mod run;
