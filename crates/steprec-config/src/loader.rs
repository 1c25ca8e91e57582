// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The merged result is validated before it is returned.

use crate::{validate_config, ConfigError, ConfigResult, SteprecConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "steprec_configuration.toml";
const CONFIG_PATH_ENV: &str = "STEPREC_CONFIG_PATH";
const PARENT_SEARCH_DEPTH: usize = 5;

/// Find the steprec configuration file
///
/// Search order:
/// 1. `STEPREC_CONFIG_PATH` environment variable
/// 2. Current working directory: `./steprec_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..PARENT_SEARCH_DEPTH {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "steprec configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete, validated `SteprecConfig` with all overrides applied
///
/// # Errors
///
/// Returns error if the config file is not found, contains invalid TOML or unknown
/// stage keys, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SteprecConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SteprecConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Parse and validate configuration from a TOML string, without overrides.
pub fn load_config_from_str(content: &str) -> ConfigResult<SteprecConfig> {
    let config: SteprecConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `STEPREC_AUG_SEED` -> `augmentation.seed`
/// - `STEPREC_INPUT_SIZE` -> `augmentation.input_size`
/// - `STEPREC_REPLICAS` -> `run.replicas`
/// - `STEPREC_OUTPUT_DIR` -> `run.output_dir`
/// - `STEPREC_LOG_LEVEL` -> `system.log_level`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a numeric variable does not parse
pub fn apply_environment_overrides(config: &mut SteprecConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("STEPREC_AUG_SEED") {
        config.augmentation.seed = Some(parse_value("STEPREC_AUG_SEED", &value)?);
    }
    if let Ok(value) = env::var("STEPREC_INPUT_SIZE") {
        config.augmentation.input_size = Some(parse_value("STEPREC_INPUT_SIZE", &value)?);
    }
    if let Ok(value) = env::var("STEPREC_REPLICAS") {
        config.run.replicas = parse_value("STEPREC_REPLICAS", &value)?;
    }
    if let Ok(value) = env::var("STEPREC_OUTPUT_DIR") {
        config.run.output_dir = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("STEPREC_LOG_LEVEL") {
        config.system.log_level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"seed": "7", "replicas": "3"}`)
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a value does not parse
pub fn apply_cli_overrides(config: &mut SteprecConfig, cli_args: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("seed") {
        config.augmentation.seed = Some(parse_value("seed", value)?);
    }
    if let Some(value) = cli_args.get("input_size") {
        config.augmentation.input_size = Some(parse_value("input_size", value)?);
    }
    if let Some(value) = cli_args.get("replicas") {
        config.run.replicas = parse_value("replicas", value)?;
    }
    if let Some(value) = cli_args.get("output_dir") {
        config.run.output_dir = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("overwrite") {
        config.run.overwrite = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!("{} = '{}' could not be parsed", name, value))
    })
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}
