// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module checks that configuration values are consistent and within valid
//! ranges, so a malformed pipeline is rejected before any frame is processed.

use crate::{
    AugmentationConfig, ConfigError, ConfigResult, DriftSpec, FactorSpec, GateSpec, ScalarOrVector, StageConfigs,
    SteprecConfig,
};

/// Smallest accepted salt and pepper ratio; one in `ratio` pixels is hit per pass
const MIN_SALT_PEPPER_RATIO: f64 = 1.0;
const HUE_LIMIT: f64 = 0.5;
const POSTERIZE_MAX_BITS: f64 = 8.0;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidBounds { field: String, min: f64, max: f64 },
    DimensionMismatch { field: String, expected: usize, found: usize },
    OutOfRange { field: String, value: f64, reason: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds { field, min, max } => {
                write!(f, "{}: min {} is greater than max {}", field, min, max)
            }
            Self::DimensionMismatch { field, expected, found } => {
                write!(f, "{}: expected {} values, found {}", field, expected, found)
            }
            Self::OutOfRange { field, value, reason } => {
                write!(f, "{} = {} is out of range: {}", field, value, reason)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Drift bounds (min <= max, finite, non-negative steps, consistent dimensions)
/// - Gate probabilities within [0, 1]
/// - Worker specific ranges (hue, posterize bits, salt and pepper ratio)
/// - Positive sizes (thumbnail bound, patch shape, replica count)
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SteprecConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_augmentation_section(&config.augmentation, &mut errors);
    validate_sizes(config, &mut errors);

    into_result(errors)
}

/// Validate only the augmentation section
///
/// Runs the same stage and thumbnail checks as [`validate_config`], for
/// pipelines built from an `AugmentationConfig` that never went through a loader.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_augmentation(config: &AugmentationConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    validate_augmentation_section(config, &mut errors);
    into_result(errors)
}

fn into_result(errors: Vec<ConfigValidationError>) -> ConfigResult<()> {
    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_augmentation_section(config: &AugmentationConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.input_size == Some(0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "augmentation.input_size".to_string(),
            reason: "thumbnail bound must be greater than 0".to_string(),
        });
    }
    validate_stages(&config.stages, errors);
}

fn validate_stages(stages: &StageConfigs, errors: &mut Vec<ConfigValidationError>) {
    let flip = stages.flip_or_standard();
    validate_gate("stages.flip.enabled", flip.enabled.as_ref(), errors);
    validate_optional_factor("stages.flip.blend", flip.blend.as_ref(), errors);

    let perspective = stages.perspective_or_standard();
    validate_gate("stages.perspective.enabled", perspective.enabled.as_ref(), errors);
    validate_optional_factor("stages.perspective.blend", perspective.blend.as_ref(), errors);
    validate_drift("stages.perspective.distortion", &perspective.distortion, errors);

    let color = stages.color_or_standard();
    validate_gate("stages.color.enabled", color.enabled.as_ref(), errors);
    validate_optional_factor("stages.color.blend", color.blend.as_ref(), errors);
    for (name, factor) in [
        ("brightness", &color.brightness),
        ("contrast", &color.contrast),
        ("gamma", &color.gamma),
        ("saturation", &color.saturation),
        ("sharpness", &color.sharpness),
        ("solarize", &color.solarize),
    ] {
        let field = format!("stages.color.{}", name);
        validate_optional_factor(&field, factor.as_ref(), errors);
        if let Some(factor) = factor {
            validate_factor_range(&field, factor, 0.0, f64::INFINITY, "must not be negative", errors);
        }
    }
    if let Some(hue) = &color.hue {
        validate_factor("stages.color.hue", hue, errors);
        validate_factor_range("stages.color.hue", hue, -HUE_LIMIT, HUE_LIMIT, "hue shift must lie in [-0.5, 0.5]", errors);
    }
    if let Some(posterize) = &color.posterize {
        validate_factor("stages.color.posterize", posterize, errors);
        validate_factor_range("stages.color.posterize", posterize, 0.0, POSTERIZE_MAX_BITS, "bit count must lie in [0, 8]", errors);
    }

    let salt_pepper = stages.salt_pepper_or_standard();
    validate_gate("stages.salt_pepper.enabled", salt_pepper.enabled.as_ref(), errors);
    validate_optional_factor("stages.salt_pepper.blend", salt_pepper.blend.as_ref(), errors);
    validate_factor("stages.salt_pepper.ratio", &salt_pepper.ratio, errors);
    validate_factor_range(
        "stages.salt_pepper.ratio",
        &salt_pepper.ratio,
        MIN_SALT_PEPPER_RATIO,
        f64::INFINITY,
        "ratio must be at least 1",
        errors,
    );

    let mask = stages.mask_or_standard();
    validate_gate("stages.mask.enabled", mask.enabled.as_ref(), errors);
    validate_optional_factor("stages.mask.blend", mask.blend.as_ref(), errors);
    validate_drift("stages.mask.patch_size", &mask.patch_size, errors);
    validate_drift("stages.mask.center", &mask.center, errors);
    if mask.center.resolved_size() != 2 {
        errors.push(ConfigValidationError::DimensionMismatch {
            field: "stages.mask.center".to_string(),
            expected: 2,
            found: mask.center.resolved_size(),
        });
    }
}

fn validate_sizes(config: &SteprecConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.run.replicas == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "run.replicas".to_string(),
            reason: "at least one replica is required".to_string(),
        });
    }
    if let Some([height, width]) = config.patches.patch_shape {
        if height == 0 || width == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "patches.patch_shape".to_string(),
                reason: format!("patch shape ({}, {}) must be non-zero", height, width),
            });
        }
    }
}

fn validate_gate(field: &str, gate: Option<&GateSpec>, errors: &mut Vec<ConfigValidationError>) {
    if let Some(GateSpec::Probability(p)) = gate {
        if !(0.0..=1.0).contains(p) {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value: *p,
                reason: "probability must lie in [0, 1]".to_string(),
            });
        }
    }
}

fn validate_optional_factor(field: &str, factor: Option<&FactorSpec>, errors: &mut Vec<ConfigValidationError>) {
    if let Some(factor) = factor {
        validate_factor(field, factor, errors);
    }
}

fn validate_factor(field: &str, factor: &FactorSpec, errors: &mut Vec<ConfigValidationError>) {
    match factor {
        FactorSpec::Fixed(value) => {
            if !value.is_finite() {
                errors.push(ConfigValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("fixed value {} is not finite", value),
                });
            }
        }
        FactorSpec::Uniform { min, max } => {
            if !min.is_finite() || !max.is_finite() || min > max {
                errors.push(ConfigValidationError::InvalidBounds {
                    field: field.to_string(),
                    min: *min,
                    max: *max,
                });
            }
        }
        FactorSpec::Drift(spec) => validate_drift(field, spec, errors),
    }
}

fn validate_factor_range(
    field: &str,
    factor: &FactorSpec,
    lower: f64,
    upper: f64,
    reason: &str,
    errors: &mut Vec<ConfigValidationError>,
) {
    let (low, high) = factor.value_range();
    for value in [low, high] {
        if value < lower || value > upper {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value,
                reason: reason.to_string(),
            });
            return;
        }
    }
}

fn validate_drift(field: &str, spec: &DriftSpec, errors: &mut Vec<ConfigValidationError>) {
    let size = spec.resolved_size();
    if size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: "drift size must be greater than 0".to_string(),
        });
        return;
    }

    let mut dimensions_ok = true;
    let mut check_dimensions = |name: &str, values: &ScalarOrVector| {
        if let Some(found) = values.dimensions() {
            if found != size {
                errors.push(ConfigValidationError::DimensionMismatch {
                    field: format!("{}.{}", field, name),
                    expected: size,
                    found,
                });
                dimensions_ok = false;
            }
        }
    };
    check_dimensions("min", &spec.min);
    check_dimensions("max", &spec.max);
    check_dimensions("step", &spec.step);
    if let Some(init) = &spec.init {
        check_dimensions("init", init);
    }
    if !dimensions_ok {
        return;
    }

    let mins = spec.min.broadcast(size);
    let maxs = spec.max.broadcast(size);
    for (min, max) in mins.iter().zip(maxs.iter()) {
        if !min.is_finite() || !max.is_finite() || min > max {
            errors.push(ConfigValidationError::InvalidBounds {
                field: field.to_string(),
                min: *min,
                max: *max,
            });
            return;
        }
    }
    for step in spec.step.broadcast(size) {
        if !step.is_finite() || step < 0.0 {
            errors.push(ConfigValidationError::OutOfRange {
                field: format!("{}.step", field),
                value: step,
                reason: "step must be finite and non-negative".to_string(),
            });
            return;
        }
    }
    if let Some(init) = &spec.init {
        for ((value, min), max) in init.broadcast(size).iter().zip(&mins).zip(&maxs) {
            if value < min || value > max {
                errors.push(ConfigValidationError::OutOfRange {
                    field: format!("{}.init", field),
                    value: *value,
                    reason: format!("initial value must lie in [{}, {}]", min, max),
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorStageConfig, MaskStageConfig, PerspectiveStageConfig, SaltPepperStageConfig};

    #[test]
    fn test_standard_stages_are_valid() {
        assert!(validate_config(&SteprecConfig::default()).is_ok());
    }

    #[test]
    fn test_inverted_drift_bounds_rejected() {
        let mut config = SteprecConfig::default();
        config.augmentation.stages.perspective = Some(PerspectiveStageConfig {
            enabled: None,
            blend: None,
            distortion: DriftSpec::scalar(0.9, 0.1, 0.025).with_size(8),
        });
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("stages.perspective.distortion"));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut config = SteprecConfig::default();
        let mut mask = MaskStageConfig::standard();
        mask.center.max = ScalarOrVector::Vector(vec![224.0, 224.0, 224.0]);
        config.augmentation.stages.mask = Some(mask);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_probability_and_ratio_ranges() {
        let mut config = SteprecConfig::default();
        let mut salt = SaltPepperStageConfig::standard();
        salt.enabled = Some(GateSpec::Probability(1.5));
        salt.ratio = FactorSpec::Fixed(0.5);
        config.augmentation.stages.salt_pepper = Some(salt);
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("stages.salt_pepper.enabled"));
        assert!(err.contains("stages.salt_pepper.ratio"));
    }

    #[test]
    fn test_hue_outside_half_turn_rejected() {
        let mut config = SteprecConfig::default();
        let mut color = ColorStageConfig::standard();
        color.hue = Some(FactorSpec::Uniform { min: -0.7, max: 0.1 });
        config.augmentation.stages.color = Some(color);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = SteprecConfig::default();
        config.augmentation.input_size = Some(0);
        config.run.replicas = 0;
        config.patches.patch_shape = Some([0, 10]);
        let err = validate_config(&config).unwrap_err().to_string();
        assert_eq!(err.matches("  - ").count(), 3);
    }

    #[test]
    fn test_augmentation_section_validated_alone() {
        let mut config = SteprecConfig::default();
        config.run.replicas = 0;
        assert!(validate_augmentation(&config.augmentation).is_ok());

        let mut color = ColorStageConfig::standard();
        color.posterize = Some(FactorSpec::Fixed(12.0));
        config.augmentation.stages.color = Some(color);
        let err = validate_augmentation(&config.augmentation).unwrap_err().to_string();
        assert!(err.contains("stages.color.posterize"));
    }
}
