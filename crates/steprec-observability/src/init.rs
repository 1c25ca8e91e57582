// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for steprec
//!
//! Console output is always installed. With the `file-logging` feature and a
//! configured `log_dir`, every run additionally gets a timestamped folder with one
//! JSON log per crate plus a combined log, and old run folders are pruned.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging initialization result. Keep it alive for the lifetime of the program;
/// dropping it flushes and closes file writers.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// The run folder logs are written to, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Builds the `EnvFilter` for the given flags, with `config.level` as the default.
///
/// # Errors
///
/// Returns an error if the level or a crate name produces an invalid directive
pub fn build_env_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter '{}'", filter))
}

/// Initialize logging
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `config` - Level, console format and (with `file-logging`) log folder settings
///
/// # Errors
///
/// Fails on an invalid filter, when the log folder cannot be created, or when a
/// global subscriber is already installed
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(build_env_filter(debug_flags, config)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(build_env_filter(debug_flags, config)?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = match &config.log_dir {
        Some(base) => {
            let (file_layers, guards, run_folder) = file_logging::build_file_layers(debug_flags, config, base)?;
            layers.extend(file_layers);
            (guards, Some(run_folder))
        }
        None => (Vec::new(), None),
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Initialize console logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

/// Initialize console logging plus per-run log files under `base_log_dir`,
/// overriding any `log_dir` in `config`.
#[cfg(feature = "file-logging")]
pub fn init_file_logging(
    debug_flags: &CrateDebugFlags,
    config: &LoggingConfig,
    base_log_dir: impl Into<PathBuf>,
) -> Result<LoggingGuard> {
    let config = LoggingConfig {
        log_dir: Some(base_log_dir.into()),
        ..config.clone()
    };
    init_logging(debug_flags, &config)
}

#[cfg(feature = "file-logging")]
mod file_logging {
    use super::*;
    use chrono::{NaiveDateTime, Utc};
    use tracing_appender::rolling;

    const RUN_PREFIX: &str = "run_";
    const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Creates the run folder layout:
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── steprec-augment.log
    ///       ├── steprec-patches.log
    ///       └── steprec.log (combined)
    /// ```
    pub(super) fn build_file_layers(
        debug_flags: &CrateDebugFlags,
        config: &LoggingConfig,
        base_log_dir: &Path,
    ) -> Result<(Vec<BoxedLayer>, Vec<tracing_appender::non_blocking::WorkerGuard>, PathBuf)> {
        let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(base_log_dir, config.retention_days, config.retention_runs)?;

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guards = Vec::new();

        for crate_name in crate::KNOWN_CRATES {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling::daily(&run_folder, format!("{}.log", crate_name)));
            guards.push(guard);
            let crate_filter = EnvFilter::try_new(format!("{}=debug,off", crate::crate_target(crate_name)))
                .with_context(|| format!("Invalid log filter for {}", crate_name))?;
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(crate_filter)
                    .boxed(),
            );
        }

        let (combined_writer, combined_guard) =
            tracing_appender::non_blocking(rolling::daily(&run_folder, "steprec.log"));
        guards.push(combined_guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(combined_writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_env_filter(debug_flags, config)?)
                .boxed(),
        );

        Ok((layers, guards, run_folder))
    }

    /// Clean up old run folders: first everything older than `retention_days`, then
    /// the oldest folders beyond `retention_runs`.
    pub(super) fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }
        let cutoff = (Utc::now() - chrono::Duration::days(retention_days as i64)).naive_utc();

        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let parsed = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(RUN_PREFIX))
                .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok());
            if let Some(started) = parsed {
                runs.push((path, started));
            }
        }
        runs.sort_by_key(|(_, started)| *started);

        let (expired, kept): (Vec<_>, Vec<_>) = runs.into_iter().partition(|(_, started)| *started < cutoff);
        let surplus = kept.len().saturating_sub(retention_runs);
        for (path, _) in expired.iter().chain(kept.iter().take(surplus)) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cleanup_keeps_most_recent_runs() {
            let dir = tempfile::tempdir().unwrap();
            let now = Utc::now();
            for days_ago in 0..5 {
                let stamp = (now - chrono::Duration::days(days_ago)).format(RUN_TIMESTAMP_FORMAT);
                std::fs::create_dir_all(dir.path().join(format!("{}{}", RUN_PREFIX, stamp))).unwrap();
            }
            std::fs::create_dir_all(dir.path().join("not_a_run")).unwrap();

            cleanup_old_logs(dir.path(), 3, 2).unwrap();

            let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
            assert_eq!(remaining.len(), 3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_from_flags() {
        let flags = CrateDebugFlags::from_list("steprec-augment");
        assert!(build_env_filter(&flags, &LoggingConfig::with_level("warn")).is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let flags = CrateDebugFlags::default();
        assert!(build_env_filter(&flags, &LoggingConfig::with_level("steprec=loud")).is_err());
    }
}
