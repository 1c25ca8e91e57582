// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # steprec-observability
//!
//! Unified logging setup for the steprec crates.
//!
//! Every crate logs through `tracing` macros; this crate owns the subscriber. It
//! provides per-crate debug flags (`--debug-steprec-augment`, `STEPREC_DEBUG=all`)
//! and console output, plus rotating per-run log folders behind the `file-logging`
//! feature.
//!
//! ## Features
//! - `file-logging`: File-based log rotation with retention (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known steprec crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "steprec",
    "steprec-structures",
    "steprec-config",
    "steprec-augment",
    "steprec-patches",
];

/// Converts a crate name to the module path prefix `tracing` uses as event target.
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
