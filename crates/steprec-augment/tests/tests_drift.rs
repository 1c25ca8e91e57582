//! Tests for the bounded random walk and the projective solver
//!
//! Property style checks draw their parameters from a seeded generator so failures
//! are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_augment::drift::{DriftProcess, Factor, SeedSequence};
use steprec_augment::homography::{solve_perspective_coefficients, REFERENCE_CORNERS};
use steprec_config::{DriftSpec, FactorSpec, ScalarOrVector};
use steprec_structures::processing::IDENTITY_PERSPECTIVE;
use steprec_structures::FrameError;

#[cfg(test)]
mod test_drift_process {
    use super::*;

    //region Helper Functions

    fn random_spec(rng: &mut StdRng) -> DriftSpec {
        let min = rng.gen_range(-500.0..500.0);
        let max = min + rng.gen_range(0.0..100.0);
        let step = rng.gen_range(0.0..50.0);
        let mut spec = DriftSpec::scalar(min, max, step).with_size(rng.gen_range(1..6));
        if rng.gen::<bool>() {
            spec.init = Some(ScalarOrVector::Scalar(rng.gen_range(min..=max)));
        }
        spec
    }

    fn assert_within(values: &ndarray::Array1<f64>, min: f64, max: f64) {
        for value in values.iter() {
            assert!(
                (min..=max).contains(value),
                "{} escaped [{}, {}]",
                value,
                min,
                max
            );
        }
    }

    //endregion

    #[test]
    fn test_values_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for case in 0..200 {
            let spec = random_spec(&mut rng);
            let (min, max) = FactorSpec::Drift(spec.clone()).value_range();
            let mut process = DriftProcess::new(&spec, case).unwrap();
            for _ in 0..200 {
                assert_within(&process.next(), min, max);
            }
        }
    }

    #[test]
    fn test_huge_steps_never_escape() {
        let mut process = DriftProcess::scalar(0.0, 1.0, 1e6, 99).unwrap();
        for _ in 0..10_000 {
            let value = process.next_scalar();
            assert!((0.0..=1.0).contains(&value), "{} escaped [0, 1]", value);
        }
    }

    #[test]
    fn test_per_dimension_bounds() {
        let spec = DriftSpec {
            min: ScalarOrVector::Vector(vec![0.0, 100.0]),
            max: ScalarOrVector::Vector(vec![1.0, 224.0]),
            step: ScalarOrVector::Scalar(30.0),
            init: None,
            size: None,
        };
        let mut process = DriftProcess::new(&spec, 4).unwrap();
        assert_eq!(process.dimensions(), 2);
        for _ in 0..1000 {
            let value = process.next();
            assert!((0.0..=1.0).contains(&value[0]));
            assert!((100.0..=224.0).contains(&value[1]));
        }
    }

    #[test]
    fn test_successive_values_are_correlated() {
        let mut process = DriftProcess::scalar(0.0, 1000.0, 2.0, 8).unwrap();
        let mut previous = process.next_scalar();
        for _ in 0..500 {
            let value = process.next_scalar();
            assert!((value - previous).abs() <= 1.0 + 1e-9);
            previous = value;
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut first = DriftProcess::scalar(0.5, 2.0, 0.05, 21).unwrap();
        let mut second = DriftProcess::scalar(0.5, 2.0, 0.05, 21).unwrap();
        for _ in 0..50 {
            assert_eq!(first.next_scalar(), second.next_scalar());
        }
    }

    #[test]
    fn test_factor_from_spec() {
        let mut seeds = SeedSequence::new(1);
        let mut fixed = Factor::from_spec(&FactorSpec::Fixed(0.25), &mut seeds).unwrap();
        assert_eq!(fixed.next_value(), 0.25);

        let mut drift = Factor::from_spec(&FactorSpec::drift(900.0, 1000.0, 10.0), &mut seeds).unwrap();
        assert!((900.0..=1000.0).contains(&drift.next_value()));

        let bad = Factor::from_spec(&FactorSpec::Uniform { min: 2.0, max: 1.0 }, &mut seeds);
        assert!(matches!(bad, Err(FrameError::BadParameters(_))));
    }
}

#[cfg(test)]
mod test_homography {
    use super::*;

    #[test]
    fn test_unit_square_to_itself_is_identity() {
        let coefficients = solve_perspective_coefficients(&REFERENCE_CORNERS, &REFERENCE_CORNERS).unwrap();
        for (value, expected) in coefficients.iter().zip(IDENTITY_PERSPECTIVE.iter()) {
            assert!((value - expected).abs() < 1e-9, "{:?}", coefficients);
        }
    }

    #[test]
    fn test_repeated_points_are_degenerate() {
        let collapsed = [[0.5, 0.5]; 4];
        let result = solve_perspective_coefficients(&collapsed, &REFERENCE_CORNERS);
        assert!(matches!(result, Err(FrameError::DegenerateGeometry(_))));
    }
}
