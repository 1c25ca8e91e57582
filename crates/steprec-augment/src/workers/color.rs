// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use steprec_config::{ColorStageConfig, FactorSpec};
use steprec_structures::{FrameError, ImageFrame};

use crate::drift::{Factor, SeedSequence};

/// The photometric adjustments, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorAdjustmentKind {
    Brightness,
    Contrast,
    Gamma,
    Hue,
    Saturation,
    Sharpness,
    Posterize,
    Solarize,
}

impl ColorAdjustmentKind {
    pub const ORDERED: [ColorAdjustmentKind; 8] = [
        ColorAdjustmentKind::Brightness,
        ColorAdjustmentKind::Contrast,
        ColorAdjustmentKind::Gamma,
        ColorAdjustmentKind::Hue,
        ColorAdjustmentKind::Saturation,
        ColorAdjustmentKind::Sharpness,
        ColorAdjustmentKind::Posterize,
        ColorAdjustmentKind::Solarize,
    ];

    /// Applies this adjustment with the drawn `value` in place.
    ///
    /// Posterize keeps the top `trunc(value)` bits; solarize inverts intensities at
    /// or above `255 * value`.
    pub fn apply(self, frame: &mut ImageFrame, value: f64) -> Result<(), FrameError> {
        match self {
            ColorAdjustmentKind::Brightness => frame.adjust_brightness(value),
            ColorAdjustmentKind::Contrast => frame.adjust_contrast(value),
            ColorAdjustmentKind::Gamma => frame.adjust_gamma(value),
            ColorAdjustmentKind::Hue => frame.adjust_hue(value),
            ColorAdjustmentKind::Saturation => frame.adjust_saturation(value),
            ColorAdjustmentKind::Sharpness => frame.adjust_sharpness(value),
            ColorAdjustmentKind::Posterize => {
                let bits = value.trunc();
                if !(0.0..=8.0).contains(&bits) {
                    return Err(FrameError::BadParameters(format!(
                        "Posterize needs between 0 and 8 bits, got {}",
                        value
                    )));
                }
                frame.posterize(bits as u8)
            }
            ColorAdjustmentKind::Solarize => {
                frame.solarize(255.0 * value);
                Ok(())
            }
        }
    }
}

/// Whether an adjustment runs, and with which generator.
#[derive(Debug, Clone)]
pub enum Adjustment {
    Enabled(Factor),
    Disabled,
}

impl From<Option<Factor>> for Adjustment {
    fn from(factor: Option<Factor>) -> Self {
        match factor {
            Some(factor) => Adjustment::Enabled(factor),
            None => Adjustment::Disabled,
        }
    }
}

/// Optional generators for each adjustment. `None` disables it.
#[derive(Debug, Clone, Default)]
pub struct ColorAlterSettings {
    pub brightness: Option<Factor>,
    pub contrast: Option<Factor>,
    pub gamma: Option<Factor>,
    pub hue: Option<Factor>,
    pub saturation: Option<Factor>,
    pub sharpness: Option<Factor>,
    pub posterize: Option<Factor>,
    pub solarize: Option<Factor>,
}

impl ColorAlterSettings {
    /// Builds the generators of a color stage, one child seed per adjustment slot.
    pub fn from_config(config: &ColorStageConfig, seeds: &mut SeedSequence) -> Result<Self, FrameError> {
        let mut build = |spec: &Option<FactorSpec>| -> Result<Option<Factor>, FrameError> {
            let factor_seed = seeds.next_seed();
            spec.as_ref()
                .map(|spec| Factor::from_spec(spec, &mut SeedSequence::new(factor_seed)))
                .transpose()
        };
        Ok(ColorAlterSettings {
            brightness: build(&config.brightness)?,
            contrast: build(&config.contrast)?,
            gamma: build(&config.gamma)?,
            hue: build(&config.hue)?,
            saturation: build(&config.saturation)?,
            sharpness: build(&config.sharpness)?,
            posterize: build(&config.posterize)?,
            solarize: build(&config.solarize)?,
        })
    }
}

/// Runs the enabled photometric adjustments in declared order, drawing a fresh
/// value for each on every frame.
#[derive(Debug, Clone)]
pub struct ColorAlterWorker {
    adjustments: Vec<(ColorAdjustmentKind, Adjustment)>,
}

impl ColorAlterWorker {
    pub fn new(settings: ColorAlterSettings) -> Self {
        let ColorAlterSettings {
            brightness,
            contrast,
            gamma,
            hue,
            saturation,
            sharpness,
            posterize,
            solarize,
        } = settings;
        let slots = [brightness, contrast, gamma, hue, saturation, sharpness, posterize, solarize];
        let adjustments = ColorAdjustmentKind::ORDERED
            .into_iter()
            .zip(slots)
            .map(|(kind, factor)| (kind, Adjustment::from(factor)))
            .collect();
        ColorAlterWorker { adjustments }
    }

    /// The adjustments that will run, in order.
    pub fn enabled_kinds(&self) -> Vec<ColorAdjustmentKind> {
        self.adjustments
            .iter()
            .filter(|(_, adjustment)| matches!(adjustment, Adjustment::Enabled(_)))
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn apply(&mut self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        let mut output = frame.clone();
        for (kind, adjustment) in self.adjustments.iter_mut() {
            if let Adjustment::Enabled(factor) = adjustment {
                let value = factor.next_value();
                kind.apply(&mut output, value)?;
            }
        }
        Ok(output)
    }
}
