// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Small value types describing frames and patches.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::FrameError;

//region ColorChannelLayout

/// Represents the color channel format of a frame.
///
/// Frames coming out of video decoders are either single channel (grayscale) or
/// three channel (red, green, blue). Anything else is rejected at construction.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, Serialize, Deserialize)]
pub enum ColorChannelLayout {
    GrayScale = 1,
    RGB = 3,
}

impl Display for ColorChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColorChannelLayout::GrayScale => write!(f, "ChannelLayout(GrayScale)"),
            ColorChannelLayout::RGB => write!(f, "ChannelLayout(RedGreenBlue)"),
        }
    }
}

impl TryFrom<usize> for ColorChannelLayout {
    type Error = FrameError;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ColorChannelLayout::GrayScale),
            3 => Ok(ColorChannelLayout::RGB),
            _ => Err(FrameError::BadParameters(format!(
                "No Channel Layout has {} channels! Acceptable values are 1,3!",
                value
            ))),
        }
    }
}

impl TryFrom<image::ColorType> for ColorChannelLayout {
    type Error = FrameError;
    fn try_from(value: image::ColorType) -> Result<Self, Self::Error> {
        match value {
            image::ColorType::L8 => Ok(ColorChannelLayout::GrayScale),
            image::ColorType::Rgb8 => Ok(ColorChannelLayout::RGB),
            _ => Err(FrameError::BadParameters(format!(
                "Unsupported image color {:?}! Only L8 and Rgb8 frames are accepted",
                value
            ))),
        }
    }
}

impl From<ColorChannelLayout> for usize {
    fn from(value: ColorChannelLayout) -> usize {
        value as usize
    }
}

//endregion

//region ChannelOrder

/// Channel ordering of a stacked batch.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelOrder {
    RGB,
    /// Reversed channel order, as expected by OpenCV style consumers
    BGR,
}

impl Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChannelOrder::RGB => write!(f, "ChannelOrder(RGB)"),
            ChannelOrder::BGR => write!(f, "ChannelOrder(BGR)"),
        }
    }
}

//endregion

//region ImageXYResolution

/// Width and height of a frame in pixels. Both are always non-zero.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, Serialize, Deserialize)]
pub struct ImageXYResolution {
    pub width: u32,
    pub height: u32,
}

impl ImageXYResolution {
    pub fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::BadParameters(format!(
                "Resolution must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(ImageXYResolution { width, height })
    }

    /// Returns the resolution as (width, height) floats, the scale used to map
    /// normalized quadrilaterals onto pixel coordinates.
    pub fn as_f64_scale(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

impl Display for ImageXYResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "<{}, {}>", self.width, self.height)
    }
}

//endregion

//region PatchShape

/// Target (height, width) of an extracted patch.
///
/// Only the aspect ratio is used to correct bounding boxes; the shape itself is
/// also the size of the noise patch substituted when an extraction fails.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, Serialize, Deserialize)]
pub struct PatchShape {
    pub height: usize,
    pub width: usize,
}

impl PatchShape {
    pub fn new(height: usize, width: usize) -> Result<Self, FrameError> {
        if height == 0 || width == 0 {
            return Err(FrameError::BadParameters(format!(
                "Patch shape must be non-zero, got ({}, {})",
                height, width
            )));
        }
        Ok(PatchShape { height, width })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Display for PatchShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "PatchShape({}, {})", self.height, self.width)
    }
}

//endregion
