// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stateful value generators.
//!
//! A [`DriftProcess`] is a bounded random walk: every call perturbs the previous
//! value and reflects it back into `[min, max]`, so consecutive frames receive
//! smoothly correlated parameters. [`Factor`] wraps the three scalar generators a
//! worker can be configured with, and [`SeedSequence`] hands every generator its own
//! child seed so a single master seed reproduces a whole pipeline.

use ndarray::{Array1, ArrayView1, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_config::{DriftSpec, FactorSpec, ScalarOrVector};
use steprec_structures::FrameError;

//region SeedSequence

/// Deterministic source of child seeds, consumed in construction order.
#[derive(Debug, Clone)]
pub struct SeedSequence {
    rng: StdRng,
}

impl SeedSequence {
    pub fn new(master_seed: u64) -> Self {
        SeedSequence {
            rng: StdRng::seed_from_u64(master_seed),
        }
    }

    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// A fresh generator seeded from the next child seed.
    pub fn next_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.next_seed())
    }
}

//endregion

//region DriftProcess

/// Bounded random walk with reflection at the bounds.
///
/// Every dimension is updated as `last + step * (u - 0.5)` with `u ~ U[0, 1)`, then
/// folded back into `[min, max]` by reflecting at whichever bound it crossed. The
/// reflection repeats until the value is inside, so the bounds hold for any step.
#[derive(Debug, Clone)]
pub struct DriftProcess {
    min: Array1<f64>,
    max: Array1<f64>,
    step: Array1<f64>,
    last: Array1<f64>,
    rng: StdRng,
}

impl DriftProcess {
    /// Builds a process from its configuration. Without an explicit `init` the
    /// starting value is a uniform draw in `[min, max]` from the process's own RNG.
    pub fn new(spec: &DriftSpec, seed: u64) -> Result<DriftProcess, FrameError> {
        let size = spec.resolved_size();
        if size == 0 {
            return Err(FrameError::BadParameters("Drift process needs at least one dimension".into()));
        }
        let min = broadcast_parameter("min", &spec.min, size)?;
        let max = broadcast_parameter("max", &spec.max, size)?;
        let step = broadcast_parameter("step", &spec.step, size)?;

        for index in 0..size {
            if min[index] > max[index] {
                return Err(FrameError::BadParameters(format!(
                    "Drift min {} is above max {} in dimension {}",
                    min[index], max[index], index
                )));
            }
            if step[index] < 0.0 {
                return Err(FrameError::BadParameters(format!(
                    "Drift step must not be negative, got {} in dimension {}",
                    step[index], index
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let last = match &spec.init {
            Some(init) => {
                let init = broadcast_parameter("init", init, size)?;
                let out_of_bounds = init
                    .iter()
                    .zip(min.iter().zip(max.iter()))
                    .any(|(value, (lower, upper))| value < lower || value > upper);
                if out_of_bounds {
                    return Err(FrameError::BadParameters(format!(
                        "Drift init {} lies outside [{}, {}]",
                        init, min, max
                    )));
                }
                init
            }
            None => Array1::from_shape_fn(size, |index| rng.gen::<f64>() * (max[index] - min[index]) + min[index]),
        };

        Ok(DriftProcess { min, max, step, last, rng })
    }

    /// Single dimensional process.
    pub fn scalar(min: f64, max: f64, step: f64, seed: u64) -> Result<DriftProcess, FrameError> {
        DriftProcess::new(&DriftSpec::scalar(min, max, step), seed)
    }

    pub fn dimensions(&self) -> usize {
        self.last.len()
    }

    /// The most recently produced value (the starting value before the first call).
    pub fn current(&self) -> ArrayView1<'_, f64> {
        self.last.view()
    }

    pub fn next(&mut self) -> Array1<f64> {
        let rng = &mut self.rng;
        let perturbation = Array1::from_shape_fn(self.last.len(), |_| rng.gen::<f64>() - 0.5);
        Zip::from(&mut self.last)
            .and(&perturbation)
            .and(&self.step)
            .and(&self.min)
            .and(&self.max)
            .for_each(|value, &offset, &step, &lower, &upper| {
                *value = reflect_into(*value + step * offset, lower, upper);
            });
        self.last.clone()
    }

    /// Advances the process and returns its first dimension.
    pub fn next_scalar(&mut self) -> f64 {
        self.next()[0]
    }
}

/// Folds `value` into `[lower, upper]` by mirroring at the bounds as often as needed.
fn reflect_into(value: f64, lower: f64, upper: f64) -> f64 {
    let width = upper - lower;
    if width <= 0.0 {
        return lower;
    }
    if (lower..=upper).contains(&value) {
        return value;
    }
    let folded = (value - lower).rem_euclid(2.0 * width);
    let reflected = if folded <= width { folded } else { 2.0 * width - folded };
    (lower + reflected).clamp(lower, upper)
}

fn broadcast_parameter(name: &str, value: &ScalarOrVector, size: usize) -> Result<Array1<f64>, FrameError> {
    if let Some(dimensions) = value.dimensions() {
        if dimensions != size {
            return Err(FrameError::BadParameters(format!(
                "Drift {} has {} values but the process has {} dimensions",
                name, dimensions, size
            )));
        }
    }
    let values = Array1::from(value.broadcast(size));
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FrameError::BadParameters(format!("Drift {} must be finite, got {}", name, values)));
    }
    Ok(values)
}

//endregion

//region Factor

/// Scalar value generator backing a single worker parameter.
#[derive(Debug, Clone)]
pub enum Factor {
    Fixed(f64),
    Uniform { min: f64, max: f64, rng: StdRng },
    Drift(DriftProcess),
}

impl Factor {
    /// Builds the generator described by `spec`. One child seed is consumed whatever
    /// the kind, so adding or removing randomness in one factor does not reshuffle
    /// the seeds of the factors built after it.
    pub fn from_spec(spec: &FactorSpec, seeds: &mut SeedSequence) -> Result<Factor, FrameError> {
        let seed = seeds.next_seed();
        match spec {
            FactorSpec::Fixed(value) => Factor::fixed(*value),
            FactorSpec::Uniform { min, max } => Factor::uniform(*min, *max, seed),
            FactorSpec::Drift(drift) => Ok(Factor::Drift(DriftProcess::new(drift, seed)?)),
        }
    }

    pub fn fixed(value: f64) -> Result<Factor, FrameError> {
        if !value.is_finite() {
            return Err(FrameError::BadParameters(format!("Fixed factor must be finite, got {}", value)));
        }
        Ok(Factor::Fixed(value))
    }

    pub fn uniform(min: f64, max: f64, seed: u64) -> Result<Factor, FrameError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(FrameError::BadParameters(format!(
                "Uniform factor needs finite min <= max, got [{}, {})",
                min, max
            )));
        }
        Ok(Factor::Uniform {
            min,
            max,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn next_value(&mut self) -> f64 {
        match self {
            Factor::Fixed(value) => *value,
            Factor::Uniform { min, max, rng } => *min + (*max - *min) * rng.gen::<f64>(),
            Factor::Drift(process) => process.next_scalar(),
        }
    }
}

//endregion

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_stays_in_bounds() {
        assert!((reflect_into(1.2, 0.0, 1.0) - 0.8).abs() < 1e-12);
        assert!((reflect_into(-0.25, 0.0, 1.0) - 0.25).abs() < 1e-12);
        assert!((reflect_into(3.5, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(reflect_into(7.0, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_vector_length_must_match_size() {
        let mut spec = DriftSpec::scalar(0.0, 1.0, 0.1).with_size(3);
        spec.min = ScalarOrVector::Vector(vec![0.0, 0.0]);
        assert!(matches!(DriftProcess::new(&spec, 1), Err(FrameError::BadParameters(_))));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(DriftProcess::scalar(2.0, 1.0, 0.1, 1).is_err());
        assert!(DriftProcess::scalar(0.0, 1.0, -0.1, 1).is_err());
        assert!(DriftProcess::scalar(0.0, f64::INFINITY, 0.1, 1).is_err());
    }

    #[test]
    fn test_explicit_init_is_starting_point() {
        let mut spec = DriftSpec::scalar(0.0, 10.0, 0.0);
        spec.init = Some(ScalarOrVector::Scalar(4.0));
        let mut process = DriftProcess::new(&spec, 3).unwrap();
        assert_eq!(process.current()[0], 4.0);
        assert_eq!(process.next_scalar(), 4.0);
    }

    #[test]
    fn test_seed_sequence_is_deterministic() {
        let mut first = SeedSequence::new(42);
        let mut second = SeedSequence::new(42);
        let a: Vec<u64> = (0..4).map(|_| first.next_seed()).collect();
        let b: Vec<u64> = (0..4).map(|_| second.next_seed()).collect();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn test_uniform_factor_range() {
        let mut factor = Factor::uniform(-1.0, 1.0, 9).unwrap();
        for _ in 0..200 {
            let value = factor.next_value();
            assert!((-1.0..1.0).contains(&value));
        }
    }
}
