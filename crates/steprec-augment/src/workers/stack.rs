// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::{s, Axis};
use steprec_structures::descriptors::ChannelOrder;
use steprec_structures::{FrameBatch, FrameError, FrameGroup, ImageFrame};

/// Stacks a frame group into one (N, H, W, 3) batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackWorker {
    channel_order: ChannelOrder,
}

impl StackWorker {
    pub fn new(channel_order: ChannelOrder) -> Self {
        StackWorker { channel_order }
    }

    /// `reverse_channels` selects BGR output.
    pub fn from_reverse_channels(reverse_channels: bool) -> Self {
        StackWorker::new(if reverse_channels { ChannelOrder::BGR } else { ChannelOrder::RGB })
    }

    /// Grayscale frames are promoted to RGB. Every frame must share one resolution.
    pub fn stack(&self, group: &FrameGroup) -> Result<FrameBatch, FrameError> {
        let frames: Vec<ImageFrame> = group.iter().map(ImageFrame::to_rgb).collect();
        let resolution = frames
            .first()
            .ok_or_else(|| FrameError::InternalError("Frame group is empty".into()))?
            .get_xy_resolution();
        if let Some(mismatch) = frames.iter().find(|frame| frame.get_xy_resolution() != resolution) {
            return Err(FrameError::BadParameters(format!(
                "Cannot stack frames of resolution {} and {}",
                resolution,
                mismatch.get_xy_resolution()
            )));
        }

        let views: Vec<_> = frames.iter().map(ImageFrame::get_pixels_view).collect();
        let stacked = ndarray::stack(Axis(0), &views)
            .map_err(|e| FrameError::InternalError(format!("Failed to stack frames: {}", e)))?;
        let data = match self.channel_order {
            ChannelOrder::RGB => stacked,
            ChannelOrder::BGR => stacked.slice(s![.., .., .., ..;-1]).to_owned(),
        };
        FrameBatch::new(data, self.channel_order)
    }
}
