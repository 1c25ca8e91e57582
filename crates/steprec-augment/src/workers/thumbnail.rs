// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use steprec_structures::descriptors::ImageXYResolution;
use steprec_structures::{FrameError, ImageFrame};

/// Shrinks frames to fit in a bounding box, keeping their aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailWorker {
    bounds: ImageXYResolution,
}

impl ThumbnailWorker {
    pub fn new(bounds: ImageXYResolution) -> Self {
        ThumbnailWorker { bounds }
    }

    /// A square `size x size` bound.
    pub fn square(size: u32) -> Result<Self, FrameError> {
        Ok(ThumbnailWorker::new(ImageXYResolution::new(size, size)?))
    }

    pub fn bounds(&self) -> ImageXYResolution {
        self.bounds
    }

    pub fn apply(&self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        frame.resize_to_fit(&self.bounds)
    }
}
