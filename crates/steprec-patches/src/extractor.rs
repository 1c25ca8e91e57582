// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cropping boxes out of frames.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use steprec_config::PatchConfig;
use steprec_structures::descriptors::{ColorChannelLayout, ImageXYResolution, PatchShape};
use steprec_structures::{BoundingBox, FrameError, ImageFrame};
use tracing::{info, warn};

/// Crops `bbox` out of `frame`.
///
/// With a `patch_shape` the box width is first adjusted (around its center) to the
/// shape's aspect ratio; the height is kept. The corners are truncated to integers
/// and clipped to the frame, the lower right one to `(width - 1, height - 1)`.
/// Returns `None` when nothing is left after clipping.
pub fn extract_image_patch(frame: &ImageFrame, bbox: &BoundingBox, patch_shape: Option<&PatchShape>) -> Option<ImageFrame> {
    let bbox = match patch_shape {
        Some(shape) => bbox.aspect_corrected(shape),
        None => *bbox,
    };
    let corners = bbox.to_corner_points().clipped_to(&frame.get_xy_resolution());
    if corners.is_empty() {
        return None;
    }
    frame
        .crop(corners.x1 as usize, corners.y1 as usize, corners.x2 as usize, corners.y2 as usize)
        .ok()
}

/// Reads the optional `(height, width)` patch shape of a patch configuration.
pub fn configured_patch_shape(config: &PatchConfig) -> Result<Option<PatchShape>, FrameError> {
    config
        .patch_shape
        .map(|[height, width]| PatchShape::new(height, width))
        .transpose()
}

/// Extracts patches for lists of boxes, replacing failed extractions with noise so
/// the output always has one patch per box.
#[derive(Debug, Clone)]
pub struct PatchExtractor {
    rng: StdRng,
}

impl PatchExtractor {
    /// `seed` drives the noise patches.
    pub fn new(seed: u64) -> Self {
        PatchExtractor {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uses the configured noise seed, or one from OS entropy.
    pub fn from_config(config: &PatchConfig) -> Self {
        let seed = match config.noise_seed {
            Some(seed) => seed,
            None => {
                let seed = StdRng::from_entropy().gen();
                info!("No patch noise seed configured, using {}", seed);
                seed
            }
        };
        PatchExtractor::new(seed)
    }

    pub fn extract(&self, frame: &ImageFrame, bbox: &BoundingBox, patch_shape: Option<&PatchShape>) -> Option<ImageFrame> {
        extract_image_patch(frame, bbox, patch_shape)
    }

    /// One patch per box, in order. Boxes that cannot be extracted are logged and
    /// replaced by a noise patch of `patch_shape`, or of the frame's shape without one.
    pub fn extract_many(&mut self, frame: &ImageFrame, boxes: &[BoundingBox], patch_shape: Option<&PatchShape>) -> Vec<ImageFrame> {
        let extracted: Vec<Option<ImageFrame>> = boxes
            .par_iter()
            .map(|bbox| extract_image_patch(frame, bbox, patch_shape))
            .collect();

        extracted
            .into_iter()
            .zip(boxes)
            .map(|(patch, bbox)| match patch {
                Some(patch) => patch,
                None => {
                    warn!("Failed to extract image patch: {}", bbox);
                    self.noise_patch(frame, patch_shape)
                }
            })
            .collect()
    }

    fn noise_patch(&mut self, frame: &ImageFrame, patch_shape: Option<&PatchShape>) -> ImageFrame {
        let (layout, resolution) = match patch_shape {
            Some(shape) => (
                ColorChannelLayout::RGB,
                ImageXYResolution {
                    width: shape.width as u32,
                    height: shape.height as u32,
                },
            ),
            None => (*frame.get_channel_layout(), frame.get_xy_resolution()),
        };
        let mut noise = ImageFrame::new(&layout, &resolution);
        for value in noise.get_pixels_view_mut().iter_mut() {
            *value = self.rng.gen_range(0..255u8);
        }
        noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_patch_shape() {
        let mut config = PatchConfig::default();
        assert_eq!(configured_patch_shape(&config).unwrap(), None);
        config.patch_shape = Some([224, 112]);
        assert_eq!(configured_patch_shape(&config).unwrap(), Some(PatchShape::new(224, 112).unwrap()));
        config.patch_shape = Some([0, 112]);
        assert!(configured_patch_shape(&config).is_err());
    }
}
