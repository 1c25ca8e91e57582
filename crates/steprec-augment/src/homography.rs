// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projective coefficients from four point correspondences.

use ndarray::{Array1, Array2};
use steprec_structures::descriptors::ImageXYResolution;
use steprec_structures::processing::PerspectiveCoefficients;
use steprec_structures::FrameError;

/// A quadrilateral as four (x, y) corners.
pub type Quad = [[f64; 2]; 4];

/// The unit square, clockwise from the top-left corner.
pub const REFERENCE_CORNERS: Quad = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

const SYSTEM_SIZE: usize = 8;
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Solves for the coefficients mapping every `source[i]` onto `destination[i]`.
///
/// Each correspondence `(p1, p2)` contributes the rows
/// `[p1x, p1y, 1, 0, 0, 0, -p2x*p1x, -p2x*p1y]` and
/// `[0, 0, 0, p1x, p1y, 1, -p2y*p1x, -p2y*p1y]`; the result is the least squares
/// solution `(AᵗA)⁻¹ Aᵗ b` with `b` the flattened destination points.
///
/// # Errors
///
/// `FrameError::DegenerateGeometry` when the correspondences do not determine a
/// projective map (repeated or collinear points make `AᵗA` singular).
pub fn solve_perspective_coefficients(source: &Quad, destination: &Quad) -> Result<PerspectiveCoefficients, FrameError> {
    let mut system = Array2::<f64>::zeros((SYSTEM_SIZE, SYSTEM_SIZE));
    let mut targets = Array1::<f64>::zeros(SYSTEM_SIZE);
    for (index, (p1, p2)) in source.iter().zip(destination.iter()).enumerate() {
        let [x, y] = *p1;
        let [u, v] = *p2;
        let row = 2 * index;
        system.row_mut(row).assign(&Array1::from(vec![x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]));
        system.row_mut(row + 1).assign(&Array1::from(vec![0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]));
        targets[row] = u;
        targets[row + 1] = v;
    }

    let normal = system.t().dot(&system);
    let projected = system.t().dot(&targets);

    // Pixel coordinates put the diagonal of AᵗA across many orders of magnitude;
    // inverting D AᵗA D with unit diagonal keeps the pivot test scale free.
    let mut scale = Array1::<f64>::zeros(SYSTEM_SIZE);
    for index in 0..SYSTEM_SIZE {
        let diagonal = normal[[index, index]];
        if diagonal <= 0.0 || !diagonal.is_finite() {
            return Err(degenerate(source, destination));
        }
        scale[index] = diagonal.sqrt().recip();
    }
    let equilibrated = Array2::from_shape_fn((SYSTEM_SIZE, SYSTEM_SIZE), |(r, c)| normal[[r, c]] * scale[r] * scale[c]);
    let inverse = invert(equilibrated).ok_or_else(|| degenerate(source, destination))?;

    let scaled_targets = &projected * &scale;
    let solution = inverse.dot(&scaled_targets) * &scale;

    let mut coefficients = [0.0; SYSTEM_SIZE];
    for (slot, value) in coefficients.iter_mut().zip(solution.iter()) {
        if !value.is_finite() {
            return Err(degenerate(source, destination));
        }
        *slot = *value;
    }
    Ok(coefficients)
}

/// Scales both normalized quads by the frame size, then solves `quad -> reference`.
pub fn perspective_coefficients_for_frame(
    resolution: &ImageXYResolution,
    quad: &Quad,
    reference: &Quad,
) -> Result<PerspectiveCoefficients, FrameError> {
    let (width, height) = resolution.as_f64_scale();
    let scale = |points: &Quad| points.map(|[x, y]| [x * width, y * height]);
    solve_perspective_coefficients(&scale(quad), &scale(reference))
}

/// Gauss-Jordan inversion with partial pivoting. `None` for a singular matrix.
fn invert(mut matrix: Array2<f64>) -> Option<Array2<f64>> {
    let size = matrix.nrows();
    let mut inverse = Array2::<f64>::eye(size);

    for column in 0..size {
        let pivot_row = (column..size).max_by(|&a, &b| {
            matrix[[a, column]]
                .abs()
                .total_cmp(&matrix[[b, column]].abs())
        })?;
        if matrix[[pivot_row, column]].abs() < PIVOT_TOLERANCE {
            return None;
        }
        if pivot_row != column {
            for other in 0..size {
                matrix.swap([pivot_row, other], [column, other]);
                inverse.swap([pivot_row, other], [column, other]);
            }
        }

        let pivot = matrix[[column, column]];
        matrix.row_mut(column).mapv_inplace(|v| v / pivot);
        inverse.row_mut(column).mapv_inplace(|v| v / pivot);

        let pivot_matrix_row = matrix.row(column).to_owned();
        let pivot_inverse_row = inverse.row(column).to_owned();
        for row in 0..size {
            if row == column {
                continue;
            }
            let factor = matrix[[row, column]];
            if factor == 0.0 {
                continue;
            }
            matrix.row_mut(row).scaled_add(-factor, &pivot_matrix_row);
            inverse.row_mut(row).scaled_add(-factor, &pivot_inverse_row);
        }
    }
    Some(inverse)
}

fn degenerate(source: &Quad, destination: &Quad) -> FrameError {
    FrameError::DegenerateGeometry(format!(
        "No projective map takes {:?} onto {:?}",
        source, destination
    ))
}
