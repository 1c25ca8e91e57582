// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for everything not raised by a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Base directory for per-run log folders; file logging is off when absent.
    /// Only honoured with the `file-logging` feature.
    pub log_dir: Option<PathBuf>,

    /// Delete run folders older than this many days
    pub retention_days: u64,

    /// Keep at most this many run folders
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Compact,
}
