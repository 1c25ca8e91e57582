// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-steprec-augment`, `--debug-steprec-patches`, etc.
//! to raise the log level of individual crates.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

const DEBUG_ENV: &str = "STEPREC_DEBUG";

/// Per-crate debug flags
///
/// # Example
/// ```rust
/// use steprec_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-steprec-augment".to_string()]);
/// assert!(flags.is_enabled("steprec-augment"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }
        flags
    }

    /// Parse a comma separated crate list, `all` enabling every known crate.
    pub fn from_list(list: &str) -> Self {
        let mut flags = CrateDebugFlags::default();
        flags.extend_from_list(list);
        flags
    }

    fn extend_from_list(&mut self, list: &str) {
        for crate_name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            if crate_name == "all" {
                self.enable_all();
            } else {
                self.enabled_crates.insert(crate_name.to_string());
            }
        }
    }

    fn enable_all(&mut self) {
        self.enabled_crates
            .extend(KNOWN_CRATES.iter().map(|name| name.to_string()));
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Returns a filter string that can be used with `EnvFilter`.
    /// Format: "steprec_augment=debug,steprec_patches=debug,info", with the final
    /// directive being `default_level`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .chain(std::iter::once(default_level.to_lowercase()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse debug flags from the process arguments and the `STEPREC_DEBUG` environment
/// variable (comma-separated crate names, or `all`).
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var(DEBUG_ENV) {
        flags.extend_from_list(&env_var);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {env}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {env}=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", "),
        env = DEBUG_ENV
    )
}
