// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! A worker wrapped with a group level gate and an optional blend.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_config::{GateKeyword, GateSpec};
use steprec_structures::{FrameError, FrameGroup, ImageFrame};
use tracing::debug;

use crate::drift::Factor;
use crate::workers::TransformWorker;

/// Decides whether a stage applies to a frame group.
#[derive(Debug, Clone)]
pub enum Gate {
    Always,
    /// Applies when a uniform draw falls below the probability
    Probability(f64),
    /// Draws the probability itself on every call
    Computed(Factor),
}

impl Gate {
    /// Resolves a configured gate. `default` is used when the stage leaves it unset;
    /// a coin is tossed here, once, using `rng`.
    pub fn from_spec(spec: Option<&GateSpec>, default: Gate, rng: &mut StdRng) -> Result<Gate, FrameError> {
        let spec = match spec {
            Some(spec) => spec,
            None => return Ok(default),
        };
        match spec {
            GateSpec::Flag(true) | GateSpec::Keyword(GateKeyword::Always) => Ok(Gate::Always),
            GateSpec::Flag(false) | GateSpec::Keyword(GateKeyword::Never) => Ok(Gate::Probability(0.0)),
            GateSpec::Keyword(GateKeyword::Coin) => Ok(Gate::coin(rng)),
            GateSpec::Probability(probability) => {
                if !(0.0..=1.0).contains(probability) {
                    return Err(FrameError::BadParameters(format!(
                        "Gate probability must be within [0, 1], got {}",
                        probability
                    )));
                }
                Ok(Gate::Probability(*probability))
            }
        }
    }

    /// A fair coin tossed now: the stage is then either always or never applied.
    pub fn coin(rng: &mut StdRng) -> Gate {
        if rng.gen::<bool>() {
            Gate::Always
        } else {
            Gate::Probability(0.0)
        }
    }

    fn is_open(&mut self, rng: &mut StdRng) -> bool {
        let probability = match self {
            Gate::Always => return true,
            Gate::Probability(probability) => *probability,
            Gate::Computed(factor) => factor.next_value(),
        };
        rng.gen::<f64>() < probability
    }
}

/// One pipeline stage: a worker applied to all frames of a group, or to none.
///
/// The gate is drawn once per group, so frames that belong together are treated
/// alike. With a blend generator the worker output is mixed back into the input
/// with a ratio drawn per frame.
#[derive(Debug, Clone)]
pub struct GatedGroupTransform {
    worker: TransformWorker,
    gate: Gate,
    blend: Option<Factor>,
    rng: StdRng,
}

impl GatedGroupTransform {
    pub fn new(worker: TransformWorker, gate: Gate, blend: Option<Factor>, seed: u64) -> Self {
        GatedGroupTransform {
            worker,
            gate,
            blend,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn worker(&self) -> &TransformWorker {
        &self.worker
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn apply(&mut self, group: FrameGroup) -> Result<FrameGroup, FrameError> {
        if !self.gate.is_open(&mut self.rng) {
            debug!("Stage '{}' skipped for a group of {}", self.worker.name(), group.len());
            return Ok(group);
        }
        debug!("Stage '{}' applied to a group of {}", self.worker.name(), group.len());

        let worker = &mut self.worker;
        let blend = &mut self.blend;
        group.try_map(|frame| {
            let transformed = worker.apply(&frame)?;
            match blend.as_mut() {
                Some(ratio) => blend_frames(&frame, &transformed, ratio.next_value()),
                None => Ok(transformed),
            }
        })
    }
}

/// `original * (1 - ratio) + transformed * ratio`. A worker that changed the
/// resolution leaves nothing to blend against, so its output is kept as is.
fn blend_frames(original: &ImageFrame, transformed: &ImageFrame, ratio: f64) -> Result<ImageFrame, FrameError> {
    if original.get_internal_data().dim() != transformed.get_internal_data().dim() {
        return Ok(transformed.clone());
    }
    original.blend(transformed, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_is_decided_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let gate = Gate::from_spec(Some(&GateSpec::Keyword(GateKeyword::Coin)), Gate::Always, &mut rng).unwrap();
        assert!(matches!(gate, Gate::Always | Gate::Probability(_)));
        if let Gate::Probability(probability) = gate {
            assert_eq!(probability, 0.0);
        }
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Gate::from_spec(Some(&GateSpec::Probability(1.5)), Gate::Always, &mut rng).is_err());
        assert!(matches!(
            Gate::from_spec(None, Gate::Probability(0.3), &mut rng),
            Ok(Gate::Probability(p)) if p == 0.3
        ));
    }
}
