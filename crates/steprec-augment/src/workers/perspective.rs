// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::Array1;
use steprec_structures::{FrameError, ImageFrame};

use crate::drift::DriftProcess;
use crate::homography::{perspective_coefficients_for_frame, Quad, REFERENCE_CORNERS};

const OFFSET_DIMENSIONS: usize = 8;

/// Random perspective distortion with drifting corner offsets.
///
/// Each call draws 8 offsets, normalizes them to unit length and pushes every corner
/// of the unit square outward along its diagonal (`T + o * (2T - 1)`). The frame is
/// then resampled so that its corners land on that quadrilateral.
#[derive(Debug, Clone)]
pub struct PerspectiveWorker {
    distortion: DriftProcess,
}

impl PerspectiveWorker {
    pub fn new(distortion: DriftProcess) -> Result<Self, FrameError> {
        if distortion.dimensions() != OFFSET_DIMENSIONS {
            return Err(FrameError::BadParameters(format!(
                "Perspective distortion needs {} dimensions, got {}",
                OFFSET_DIMENSIONS,
                distortion.dimensions()
            )));
        }
        Ok(PerspectiveWorker { distortion })
    }

    pub fn apply(&mut self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        let quad = distorted_quad(&self.distortion.next());
        let coefficients = perspective_coefficients_for_frame(&frame.get_xy_resolution(), &quad, &REFERENCE_CORNERS)?;
        Ok(frame.warp_perspective(&coefficients))
    }
}

/// Moves the reference corners by the unit-normalized `offsets`. A zero vector
/// leaves the corners where they are.
pub(crate) fn distorted_quad(offsets: &Array1<f64>) -> Quad {
    let norm = offsets.dot(offsets).sqrt();
    let mut quad = REFERENCE_CORNERS;
    if norm == 0.0 || !norm.is_finite() {
        return quad;
    }
    for (corner, point) in quad.iter_mut().enumerate() {
        for (axis, coordinate) in point.iter_mut().enumerate() {
            let offset = offsets[corner * 2 + axis] / norm;
            *coordinate += offset * (2.0 * *coordinate - 1.0);
        }
    }
    quad
}
