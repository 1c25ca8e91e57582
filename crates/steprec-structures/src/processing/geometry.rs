// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;

use image::imageops::FilterType;
use ndarray::{s, Array3, Axis, Zip};

use crate::descriptors::ImageXYResolution;
use crate::{FrameError, ImageFrame};

/// The eight coefficients (a, b, c, d, e, f, g, h) of a projective map
/// `(x, y) -> ((a x + b y + c) / (g x + h y + 1), (d x + e y + f) / (g x + h y + 1))`.
pub type PerspectiveCoefficients = [f64; 8];

pub const IDENTITY_PERSPECTIVE: PerspectiveCoefficients = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

impl ImageFrame {

    //region Geometric Transforms

    /// Mirrors the frame left to right.
    pub fn flip_horizontal(&self) -> ImageFrame {
        let flipped = self.get_internal_data().slice(s![.., ..;-1, ..]).to_owned();
        ImageFrame::from_parts(flipped, *self.get_channel_layout())
    }

    /// Shrinks the frame to fit inside `bounds`, preserving the aspect ratio, using
    /// Lanczos3 resampling. Frames that already fit are returned unchanged; frames are
    /// never enlarged.
    pub fn resize_to_fit(&self, bounds: &ImageXYResolution) -> Result<ImageFrame, FrameError> {
        let current = self.get_xy_resolution();
        if current.width <= bounds.width && current.height <= bounds.height {
            return Ok(self.clone());
        }
        let scale = (bounds.width as f64 / current.width as f64).min(bounds.height as f64 / current.height as f64);
        let width = ((current.width as f64 * scale).round() as u32).clamp(1, bounds.width);
        let height = ((current.height as f64 * scale).round() as u32).clamp(1, bounds.height);
        let resized = self
            .export_as_dynamic_image()?
            .resize_exact(width, height, FilterType::Lanczos3);
        ImageFrame::new_from_dynamic_image(resized)
    }

    /// Remaps the frame through a projective transform.
    ///
    /// `coefficients` map every output pixel center to the source location it is
    /// sampled from (nearest neighbour). Output pixels whose source falls outside the
    /// frame, or whose projective denominator vanishes, are set to 0.
    pub fn warp_perspective(&self, coefficients: &PerspectiveCoefficients) -> ImageFrame {
        let source = self.get_internal_data();
        let (height, width, channels) = source.dim();
        let [a, b, c, d, e, f, g, h] = *coefficients;
        let mut output = Array3::<u8>::zeros((height, width, channels));
        Zip::indexed(output.lanes_mut(Axis(2))).par_for_each(|(y, x), mut pixel| {
            let (ox, oy) = (x as f64 + 0.5, y as f64 + 0.5);
            let denominator = g * ox + h * oy + 1.0;
            if denominator.abs() < f64::EPSILON {
                return;
            }
            let sx = ((a * ox + b * oy + c) / denominator).floor();
            let sy = ((d * ox + e * oy + f) / denominator).floor();
            if sx < 0.0 || sy < 0.0 || sx >= width as f64 || sy >= height as f64 {
                return;
            }
            pixel.assign(&source.slice(s![sy as usize, sx as usize, ..]));
        });
        ImageFrame::from_parts(output, *self.get_channel_layout())
    }

    /// Sets every channel of the pixels in `rows x columns` to 0. Ranges are clamped to
    /// the frame; an empty range leaves the frame untouched.
    pub fn zero_region(&mut self, rows: Range<usize>, columns: Range<usize>) {
        let resolution = self.get_xy_resolution();
        let row_end = rows.end.min(resolution.height as usize);
        let column_end = columns.end.min(resolution.width as usize);
        if rows.start >= row_end || columns.start >= column_end {
            return;
        }
        self.get_internal_data_mut()
            .slice_mut(s![rows.start..row_end, columns.start..column_end, ..])
            .fill(0);
    }

    //endregion
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_frame(width: usize, height: usize) -> ImageFrame {
        ImageFrame::from_array(Array3::from_shape_fn((height, width, 3), |(y, x, c)| (y * 16 + x * 2 + c) as u8)).unwrap()
    }

    #[test]
    fn test_flip_is_involution() {
        let frame = indexed_frame(7, 4);
        let flipped = frame.flip_horizontal();
        assert_ne!(flipped, frame);
        assert_eq!(flipped.get_internal_data()[(2, 0, 1)], frame.get_internal_data()[(2, 6, 1)]);
        assert_eq!(flipped.flip_horizontal(), frame);
    }

    #[test]
    fn test_identity_warp_is_lossless() {
        let frame = indexed_frame(12, 9);
        assert_eq!(frame.warp_perspective(&IDENTITY_PERSPECTIVE), frame);
    }

    #[test]
    fn test_translation_warp_fills_with_black() {
        let frame = indexed_frame(8, 8);
        // sample from x + 2 -> output shifted left, right border falls outside
        let warped = frame.warp_perspective(&[1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(warped.get_internal_data()[(3, 0, 0)], frame.get_internal_data()[(3, 2, 0)]);
        assert_eq!(warped.get_internal_data()[(3, 7, 0)], 0);
    }

    #[test]
    fn test_resize_to_fit_preserves_aspect() {
        let frame = indexed_frame(200, 100);
        let bounds = ImageXYResolution::new(50, 50).unwrap();
        let thumb = frame.resize_to_fit(&bounds).unwrap();
        assert_eq!(thumb.get_xy_resolution(), ImageXYResolution::new(50, 25).unwrap());
        let small = indexed_frame(10, 10);
        assert_eq!(small.resize_to_fit(&bounds).unwrap(), small);
    }

    #[test]
    fn test_zero_region_clamps_far_edge() {
        let mut frame = indexed_frame(10, 10);
        frame.zero_region(8..40, 0..3);
        let data = frame.get_internal_data();
        assert_eq!(data[(9, 2, 0)], 0);
        assert_eq!(data[(9, 3, 1)], 151);
        assert_ne!(data[(7, 1, 2)], 0);
    }
}
