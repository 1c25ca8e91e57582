// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The fixed augmentation stage sequence.
//!
//! Frames pass, in order, through: an optional thumbnail, flip, perspective, color,
//! salt and pepper noise, patch mask, and finally stacking into a batch. Every stage
//! is always present; disabled ones simply have a closed gate.

use steprec_config::{validate_augmentation, AugmentationConfig, FactorSpec, StageConfigs};
use steprec_structures::{FrameBatch, FrameError, FrameGroup, ImageFrame};
use tracing::info;

use crate::drift::{DriftProcess, Factor, SeedSequence};
use crate::gated::{Gate, GatedGroupTransform};
use crate::workers::{
    ColorAlterSettings, ColorAlterWorker, PatchMaskWorker, PerspectiveWorker, SaltPepperWorker, StackWorker,
    ThumbnailWorker, TransformWorker,
};

#[derive(Debug, Clone)]
pub struct AugmentationPipeline {
    thumbnail: Option<ThumbnailWorker>,
    stages: Vec<GatedGroupTransform>,
    stack: StackWorker,
}

impl AugmentationPipeline {
    /// The default augmentation setup: flip and mask each decided by a coin tossed
    /// now, perspective, color and salt and pepper always on, posterize and solarize
    /// off.
    pub fn standard(input_size: Option<u32>, seed: u64) -> Result<AugmentationPipeline, FrameError> {
        let config = AugmentationConfig {
            input_size,
            ..AugmentationConfig::default()
        };
        AugmentationPipeline::from_config(&config, seed)
    }

    /// Builds every stage from `config`. Stages missing from the configuration use
    /// their standard parameters. All randomness derives from `seed`.
    ///
    /// The configuration is validated first, so out of range worker parameters fail
    /// here rather than on the first frame.
    pub fn from_config(config: &AugmentationConfig, seed: u64) -> Result<AugmentationPipeline, FrameError> {
        validate_augmentation(config).map_err(|e| FrameError::BadParameters(e.to_string()))?;
        let mut seeds = SeedSequence::new(seed);
        let thumbnail = config.input_size.map(ThumbnailWorker::square).transpose()?;
        let stages = build_stages(&config.stages, &mut seeds)?;

        let pipeline = AugmentationPipeline {
            thumbnail,
            stages,
            stack: StackWorker::from_reverse_channels(config.reverse_channels),
        };
        info!(
            "Built augmentation pipeline (seed {}, input size {:?}): {}",
            seed,
            config.input_size,
            pipeline.describe()
        );
        Ok(pipeline)
    }

    pub fn stages(&self) -> &[GatedGroupTransform] {
        &self.stages
    }

    /// Runs every gated stage over the group, without stacking.
    pub fn transform_group(&mut self, group: FrameGroup) -> Result<FrameGroup, FrameError> {
        let mut group = match &self.thumbnail {
            Some(thumbnail) => group.try_map(|frame| thumbnail.apply(&frame))?,
            None => group,
        };
        for stage in self.stages.iter_mut() {
            group = stage.apply(group)?;
        }
        Ok(group)
    }

    pub fn apply(&mut self, group: FrameGroup) -> Result<FrameBatch, FrameError> {
        let group = self.transform_group(group)?;
        self.stack.stack(&group)
    }

    /// Augments a single frame as a group of one.
    pub fn apply_frame(&mut self, frame: ImageFrame) -> Result<FrameBatch, FrameError> {
        self.apply(FrameGroup::from_frame(frame))
    }

    fn describe(&self) -> String {
        self.stages
            .iter()
            .map(|stage| format!("{}[{:?}]", stage.worker().name(), stage.gate()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

fn build_stages(stages: &StageConfigs, seeds: &mut SeedSequence) -> Result<Vec<GatedGroupTransform>, FrameError> {
    let flip = stages.flip_or_standard();
    let perspective = stages.perspective_or_standard();
    let color = stages.color_or_standard();
    let salt_pepper = stages.salt_pepper_or_standard();
    let mask = stages.mask_or_standard();

    let flip_worker = TransformWorker::HorizontalFlip;

    let distortion = DriftProcess::new(&perspective.distortion, seeds.next_seed())?;
    let perspective_worker = TransformWorker::Perspective(PerspectiveWorker::new(distortion)?);

    let color_worker = TransformWorker::ColorAlter(ColorAlterWorker::new(ColorAlterSettings::from_config(&color, seeds)?));

    let ratio = Factor::from_spec(&salt_pepper.ratio, seeds)?;
    let salt_pepper_worker = TransformWorker::SaltPepper(SaltPepperWorker::new(ratio, seeds.next_seed()));

    let mut mask_size = DriftProcess::new(&mask.patch_size, seeds.next_seed())?;
    let mut mask_center = DriftProcess::new(&mask.center, seeds.next_seed())?;
    let mask_worker = TransformWorker::PatchMask(PatchMaskWorker::from_drifts(&mut mask_size, &mut mask_center)?);

    Ok(vec![
        gated_stage(flip_worker, flip.enabled.as_ref(), flip.blend.as_ref(), seeds)?,
        gated_stage(perspective_worker, perspective.enabled.as_ref(), perspective.blend.as_ref(), seeds)?,
        gated_stage(color_worker, color.enabled.as_ref(), color.blend.as_ref(), seeds)?,
        gated_stage(salt_pepper_worker, salt_pepper.enabled.as_ref(), salt_pepper.blend.as_ref(), seeds)?,
        gated_stage(mask_worker, mask.enabled.as_ref(), mask.blend.as_ref(), seeds)?,
    ])
}

fn gated_stage(
    worker: TransformWorker,
    enabled: Option<&steprec_config::GateSpec>,
    blend: Option<&FactorSpec>,
    seeds: &mut SeedSequence,
) -> Result<GatedGroupTransform, FrameError> {
    let gate = Gate::from_spec(enabled, Gate::Always, &mut seeds.next_rng())?;
    let blend = blend.map(|spec| Factor::from_spec(spec, seeds)).transpose()?;
    Ok(GatedGroupTransform::new(worker, gate, blend, seeds.next_seed()))
}
