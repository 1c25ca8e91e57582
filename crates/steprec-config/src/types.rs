// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `steprec_configuration.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SteprecConfig {
    pub system: SystemConfig,
    pub augmentation: AugmentationConfig,
    pub run: RunConfig,
    pub patches: PatchConfig,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub debug_crates: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

//region Value Generators

/// A bound or step that is either shared by every dimension or given per dimension.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScalarOrVector {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl ScalarOrVector {
    /// Number of explicit dimensions, `None` for a scalar.
    pub fn dimensions(&self) -> Option<usize> {
        match self {
            ScalarOrVector::Scalar(_) => None,
            ScalarOrVector::Vector(values) => Some(values.len()),
        }
    }

    /// Expands to `size` values, repeating a scalar.
    pub fn broadcast(&self, size: usize) -> Vec<f64> {
        match self {
            ScalarOrVector::Scalar(value) => vec![*value; size],
            ScalarOrVector::Vector(values) => values.clone(),
        }
    }
}

impl From<f64> for ScalarOrVector {
    fn from(value: f64) -> Self {
        ScalarOrVector::Scalar(value)
    }
}

/// Parameters of a bounded random walk with reflection at the bounds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriftSpec {
    pub min: ScalarOrVector,
    pub max: ScalarOrVector,
    pub step: ScalarOrVector,
    /// Starting value; a uniform draw within the bounds when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<ScalarOrVector>,
    /// Number of dimensions; inferred from vector bounds, 1 otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl DriftSpec {
    pub fn scalar(min: f64, max: f64, step: f64) -> Self {
        DriftSpec {
            min: min.into(),
            max: max.into(),
            step: step.into(),
            init: None,
            size: None,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// The dimension count: the explicit `size`, otherwise the length of the first
    /// vector valued parameter, otherwise 1.
    pub fn resolved_size(&self) -> usize {
        self.size
            .or_else(|| self.min.dimensions())
            .or_else(|| self.max.dimensions())
            .or_else(|| self.step.dimensions())
            .unwrap_or(1)
    }
}

/// How a single scalar factor is produced on every call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSpec {
    /// Always the same value
    Fixed(f64),
    /// Independent uniform draws in [min, max)
    Uniform { min: f64, max: f64 },
    /// A temporally correlated random walk
    Drift(DriftSpec),
}

impl FactorSpec {
    pub fn drift(min: f64, max: f64, step: f64) -> Self {
        FactorSpec::Drift(DriftSpec::scalar(min, max, step))
    }

    /// Smallest and largest value this factor can produce.
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            FactorSpec::Fixed(value) => (*value, *value),
            FactorSpec::Uniform { min, max } => (*min, *max),
            FactorSpec::Drift(spec) => {
                let size = spec.resolved_size();
                let lower = spec.min.broadcast(size).into_iter().fold(f64::INFINITY, f64::min);
                let upper = spec.max.broadcast(size).into_iter().fold(f64::NEG_INFINITY, f64::max);
                (lower, upper)
            }
        }
    }
}

//endregion

//region Gates

/// Named gate policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKeyword {
    /// Always apply
    Always,
    /// Never apply
    Never,
    /// Flip a fair coin once when the pipeline is built; the outcome holds for the
    /// whole run
    Coin,
}

/// When a stage applies: `true`/`false`, a probability, or a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GateSpec {
    Flag(bool),
    Probability(f64),
    Keyword(GateKeyword),
}

//endregion

//region Augmentation

/// Augmentation pipeline configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Master seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Frames are shrunk to fit in an `input_size` square when set
    pub input_size: Option<u32>,
    /// Emit batches in BGR order
    pub reverse_channels: bool,
    pub stages: StageConfigs,
}

/// Per stage configuration. Absent stages use their standard parameters; unknown
/// stage keys are rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfigs {
    pub flip: Option<FlipStageConfig>,
    pub perspective: Option<PerspectiveStageConfig>,
    pub color: Option<ColorStageConfig>,
    pub salt_pepper: Option<SaltPepperStageConfig>,
    pub mask: Option<MaskStageConfig>,
}

impl StageConfigs {
    pub fn flip_or_standard(&self) -> FlipStageConfig {
        self.flip.clone().unwrap_or_else(FlipStageConfig::standard)
    }

    pub fn perspective_or_standard(&self) -> PerspectiveStageConfig {
        self.perspective.clone().unwrap_or_else(PerspectiveStageConfig::standard)
    }

    pub fn color_or_standard(&self) -> ColorStageConfig {
        self.color.clone().unwrap_or_else(ColorStageConfig::standard)
    }

    pub fn salt_pepper_or_standard(&self) -> SaltPepperStageConfig {
        self.salt_pepper.clone().unwrap_or_else(SaltPepperStageConfig::standard)
    }

    pub fn mask_or_standard(&self) -> MaskStageConfig {
        self.mask.clone().unwrap_or_else(MaskStageConfig::standard)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlipStageConfig {
    #[serde(default)]
    pub enabled: Option<GateSpec>,
    #[serde(default)]
    pub blend: Option<FactorSpec>,
}

impl FlipStageConfig {
    pub fn standard() -> Self {
        Self {
            enabled: Some(GateSpec::Keyword(GateKeyword::Coin)),
            blend: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PerspectiveStageConfig {
    #[serde(default)]
    pub enabled: Option<GateSpec>,
    #[serde(default)]
    pub blend: Option<FactorSpec>,
    /// 8 dimensional drift of the four corner offsets
    pub distortion: DriftSpec,
}

impl PerspectiveStageConfig {
    pub fn standard() -> Self {
        Self {
            enabled: None,
            blend: None,
            distortion: DriftSpec::scalar(0.0, 0.9, 0.025).with_size(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ColorStageConfig {
    #[serde(default)]
    pub enabled: Option<GateSpec>,
    #[serde(default)]
    pub blend: Option<FactorSpec>,
    #[serde(default)]
    pub brightness: Option<FactorSpec>,
    #[serde(default)]
    pub contrast: Option<FactorSpec>,
    #[serde(default)]
    pub gamma: Option<FactorSpec>,
    #[serde(default)]
    pub hue: Option<FactorSpec>,
    #[serde(default)]
    pub saturation: Option<FactorSpec>,
    #[serde(default)]
    pub sharpness: Option<FactorSpec>,
    #[serde(default)]
    pub posterize: Option<FactorSpec>,
    #[serde(default)]
    pub solarize: Option<FactorSpec>,
}

impl ColorStageConfig {
    pub fn standard() -> Self {
        Self {
            enabled: None,
            blend: None,
            brightness: Some(FactorSpec::drift(0.7, 1.5, 0.05)),
            contrast: Some(FactorSpec::drift(0.5, 1.5, 0.05)),
            gamma: Some(FactorSpec::drift(0.5, 2.0, 0.05)),
            hue: Some(FactorSpec::drift(-0.05, 0.05, 0.001)),
            saturation: Some(FactorSpec::drift(0.5, 1.5, 0.05)),
            sharpness: Some(FactorSpec::drift(0.5, 1.5, 0.05)),
            posterize: None,
            solarize: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SaltPepperStageConfig {
    #[serde(default)]
    pub enabled: Option<GateSpec>,
    #[serde(default)]
    pub blend: Option<FactorSpec>,
    /// One in `ratio` pixels becomes salt, and one in `ratio` pepper
    pub ratio: FactorSpec,
}

impl SaltPepperStageConfig {
    pub fn standard() -> Self {
        Self {
            enabled: None,
            blend: None,
            ratio: FactorSpec::drift(900.0, 1000.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaskStageConfig {
    #[serde(default)]
    pub enabled: Option<GateSpec>,
    #[serde(default)]
    pub blend: Option<FactorSpec>,
    /// Index into the (h/5, h/4, h/3) size ladder
    pub patch_size: DriftSpec,
    /// (row, column) of the mask center
    pub center: DriftSpec,
}

impl MaskStageConfig {
    pub fn standard() -> Self {
        Self {
            enabled: Some(GateSpec::Keyword(GateKeyword::Coin)),
            blend: None,
            patch_size: DriftSpec::scalar(0.0, 3.0, 1.0),
            center: DriftSpec::scalar(0.0, 224.0, 1.0).with_size(2),
        }
    }
}

//endregion

//region Run

/// Augmentation run configuration (replicas of one source)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of independent augmented outputs per source
    pub replicas: usize,
    /// Directory the outputs are written into; next to the source when absent
    pub output_dir: Option<PathBuf>,
    /// Regenerate outputs that already exist
    pub overwrite: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            replicas: 1,
            output_dir: Some(PathBuf::from("augmentations")),
            overwrite: false,
        }
    }
}

//endregion

//region Patches

/// Patch extraction configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Target (height, width); boxes are aspect corrected to it when set
    pub patch_shape: Option<[usize; 2]>,
    /// Prepend the full frame to the extracted patches before encoding
    pub include_frame: bool,
    /// Seed for the noise patches substituted for failed extractions
    pub noise_seed: Option<u64>,
}

//endregion
