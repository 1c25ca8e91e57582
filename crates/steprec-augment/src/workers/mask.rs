// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use steprec_structures::{FrameError, ImageFrame};

use crate::drift::DriftProcess;

/// Divisors of the frame height giving the three mask sizes (h/5, h/4, h/3).
const SIZE_LADDER_DIVISORS: [usize; 3] = [5, 4, 3];

/// Blacks out a square block. Size and position are drawn once, when the worker is
/// built, so the same block is hidden in every frame of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchMaskWorker {
    size_index: usize,
    center_row: i64,
    center_column: i64,
}

impl PatchMaskWorker {
    /// `size_index` is clamped into the ladder.
    pub fn new(size_index: usize, center_row: i64, center_column: i64) -> Self {
        PatchMaskWorker {
            size_index: size_index.min(SIZE_LADDER_DIVISORS.len() - 1),
            center_row,
            center_column,
        }
    }

    /// Draws the size index and the (row, column) center once from their processes.
    pub fn from_drifts(size: &mut DriftProcess, center: &mut DriftProcess) -> Result<Self, FrameError> {
        if center.dimensions() != 2 {
            return Err(FrameError::BadParameters(format!(
                "Mask center needs 2 dimensions, got {}",
                center.dimensions()
            )));
        }
        let index = size.next_scalar().trunc().max(0.0) as usize;
        let position = center.next();
        Ok(PatchMaskWorker::new(index, position[0].trunc() as i64, position[1].trunc() as i64))
    }

    pub fn size_index(&self) -> usize {
        self.size_index
    }

    pub fn center(&self) -> (i64, i64) {
        (self.center_row, self.center_column)
    }

    pub fn apply(&mut self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        let height = frame.get_xy_resolution().height as usize;
        let half = (height / SIZE_LADDER_DIVISORS[self.size_index] / 2) as i64;
        let mut output = frame.clone();
        output.zero_region(span(self.center_row, half), span(self.center_column, half));
        Ok(output)
    }
}

/// `max(0, center - half) .. center + half`; the frame clamps the far end.
fn span(center: i64, half: i64) -> std::ops::Range<usize> {
    let start = (center - half).max(0) as usize;
    let end = (center + half).max(0) as usize;
    start..end
}
