// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # steprec Configuration System
//!
//! Type-safe configuration loader for the augmentation pipeline, the augmentation
//! run planner and the patch extractor, with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//! - Fail-fast validation (unknown stage keys, missing worker parameters and out of
//!   range values are all rejected before any frame is processed)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use steprec_config::{load_config, SteprecConfig};
//!
//! // Load configuration with automatic file discovery and overrides
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("Replicas: {}", config.run.replicas);
//! println!("Seed: {:?}", config.augmentation.seed);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config, load_config_from_str};
pub use types::*;
pub use validation::{validate_augmentation, validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
