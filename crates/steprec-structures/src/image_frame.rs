// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use image::{DynamicImage, GenericImageView};
use ndarray::{s, Array3, ArrayView3, ArrayViewMut3, Axis, Zip};

use crate::descriptors::{ColorChannelLayout, ImageXYResolution};
use crate::FrameError;

/// A single video frame.
///
/// Stores pixel data as a 3D array with height, width, and channel dimensions.
/// Frames are either grayscale (1 channel) or RGB (3 channels). Transforms take a
/// frame by reference and produce a new one; the in-place processors under
/// [`crate::processing`] are used on working copies.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFrame {
    pixels: Array3<u8>, // Heights, Widths, Channels
    channel_layout: ColorChannelLayout,
}

// NOTE -> (0,0) is in the top left corner!

impl ImageFrame {

    //region Common Constructors

    /// Creates a new ImageFrame with zero-filled pixel data.
    pub fn new(channel_layout: &ColorChannelLayout, xy_resolution: &ImageXYResolution) -> ImageFrame {
        ImageFrame {
            channel_layout: *channel_layout,
            pixels: Array3::<u8>::zeros((
                xy_resolution.height as usize,
                xy_resolution.width as usize,
                *channel_layout as usize,
            )),
        }
    }

    /// Creates an ImageFrame from a height, width, channel array.
    ///
    /// # Returns
    ///
    /// An error if the array has a zero-length spatial axis or a channel count
    /// other than 1 or 3.
    pub fn from_array(input: Array3<u8>) -> Result<ImageFrame, FrameError> {
        let (height, width, channels) = input.dim();
        if height == 0 || width == 0 {
            return Err(FrameError::BadParameters(format!(
                "Frame must have non-zero size, got {}x{}",
                width, height
            )));
        }
        Ok(ImageFrame {
            channel_layout: ColorChannelLayout::try_from(channels)?,
            pixels: input.as_standard_layout().into_owned(),
        })
    }

    /// Wraps an array whose channel count is already known to match `channel_layout`.
    pub(crate) fn from_parts(pixels: Array3<u8>, channel_layout: ColorChannelLayout) -> ImageFrame {
        debug_assert_eq!(pixels.len_of(Axis(2)), channel_layout as usize);
        ImageFrame { pixels, channel_layout }
    }

    pub fn new_from_dynamic_image(img: DynamicImage) -> Result<ImageFrame, FrameError> {
        let (width, height) = img.dimensions();
        let shape_error = |e: ndarray::ShapeError| FrameError::InternalError(format!("Image buffer does not match its dimensions: {}", e));
        match img.color() {
            image::ColorType::L8 | image::ColorType::L16 | image::ColorType::La8 | image::ColorType::La16 => {
                let buffer = img.to_luma8();
                let array = Array3::from_shape_vec((height as usize, width as usize, 1), buffer.into_raw())
                    .map_err(shape_error)?;
                Self::from_array(array)
            }
            _ => {
                let buffer = img.to_rgb8();
                let array = Array3::from_shape_vec((height as usize, width as usize, 3), buffer.into_raw())
                    .map_err(shape_error)?;
                Self::from_array(array)
            }
        }
    }

    pub fn new_from_png_bytes(input: &[u8]) -> Result<ImageFrame, FrameError> {
        let img = image::load_from_memory_with_format(input, image::ImageFormat::Png)?;
        Self::new_from_dynamic_image(img)
    }

    //endregion

    //region Properties

    pub fn get_channel_layout(&self) -> &ColorChannelLayout {
        &self.channel_layout
    }

    pub fn get_color_channel_count(&self) -> usize {
        self.channel_layout as usize
    }

    pub fn get_pixels_view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn get_pixels_view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.pixels.view_mut()
    }

    /// Returns the (width, height) of the frame.
    pub fn get_xy_resolution(&self) -> ImageXYResolution {
        let shape = self.pixels.shape();
        ImageXYResolution {
            width: shape[1] as u32,
            height: shape[0] as u32,
        }
    }

    pub fn get_internal_data(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub(crate) fn get_internal_data_mut(&mut self) -> &mut Array3<u8> {
        &mut self.pixels
    }

    pub fn into_internal_data(self) -> Array3<u8> {
        self.pixels
    }

    //endregion

    //region Conversions

    /// Returns an RGB copy of this frame. Grayscale intensities are replicated into
    /// all three channels; RGB frames are cloned as is.
    pub fn to_rgb(&self) -> ImageFrame {
        match self.channel_layout {
            ColorChannelLayout::RGB => self.clone(),
            ColorChannelLayout::GrayScale => {
                let gray = self.pixels.index_axis(Axis(2), 0);
                let (height, width) = gray.dim();
                let mut pixels = Array3::<u8>::zeros((height, width, 3));
                Zip::from(pixels.lanes_mut(Axis(2)))
                    .and(&gray)
                    .par_for_each(|mut pixel, &value| pixel.fill(value));
                ImageFrame {
                    pixels,
                    channel_layout: ColorChannelLayout::RGB,
                }
            }
        }
    }

    /// Copies out the pixels of the half-open region `[y1, y2) x [x1, x2)`.
    pub fn crop(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> Result<ImageFrame, FrameError> {
        let resolution = self.get_xy_resolution();
        if x1 >= x2 || y1 >= y2 || x2 > resolution.width as usize || y2 > resolution.height as usize {
            return Err(FrameError::BadParameters(format!(
                "Crop region ({}, {}) -> ({}, {}) is empty or outside a {} frame",
                x1, y1, x2, y2, resolution
            )));
        }
        Ok(ImageFrame {
            pixels: self.pixels.slice(s![y1..y2, x1..x2, ..]).to_owned(),
            channel_layout: self.channel_layout,
        })
    }

    //endregion

    //region Export as Image

    /// Exports the ImageFrame as an `image` crate DynamicImage.
    ///
    /// # Returns
    ///
    /// A Luma8 image for grayscale frames, an Rgb8 image otherwise.
    pub fn export_as_dynamic_image(&self) -> Result<DynamicImage, FrameError> {
        let resolution = self.get_xy_resolution();
        let buffer: Vec<u8> = self.pixels.iter().copied().collect();
        match self.channel_layout {
            ColorChannelLayout::GrayScale => {
                let img_buffer = image::GrayImage::from_raw(resolution.width, resolution.height, buffer)
                    .ok_or_else(|| FrameError::InternalError("Failed to create grayscale image".to_string()))?;
                Ok(DynamicImage::ImageLuma8(img_buffer))
            }
            ColorChannelLayout::RGB => {
                let img_buffer = image::RgbImage::from_raw(resolution.width, resolution.height, buffer)
                    .ok_or_else(|| FrameError::InternalError("Failed to create RGB image".to_string()))?;
                Ok(DynamicImage::ImageRgb8(img_buffer))
            }
        }
    }

    /// Exports the ImageFrame as PNG bytes.
    pub fn export_as_png_bytes(&self) -> Result<Vec<u8>, FrameError> {
        let dynamic_img = self.export_as_dynamic_image()?;
        let mut buffer = Vec::new();
        dynamic_img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }

    //endregion
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: usize, height: usize) -> ImageFrame {
        let array = Array3::from_shape_fn((height, width, 3), |(y, x, c)| ((y * 7 + x * 3 + c) % 256) as u8);
        ImageFrame::from_array(array).unwrap()
    }

    #[test]
    fn test_from_array_rejects_bad_channels() {
        assert!(ImageFrame::from_array(Array3::zeros((4, 4, 2))).is_err());
        assert!(ImageFrame::from_array(Array3::zeros((0, 4, 3))).is_err());
    }

    #[test]
    fn test_dynamic_image_round_trip_keeps_pixels() {
        let frame = gradient_frame(9, 5);
        let back = ImageFrame::new_from_dynamic_image(frame.export_as_dynamic_image().unwrap()).unwrap();
        assert_eq!(frame, back);
    }

    #[test]
    fn test_png_bytes_decode_to_same_frame() {
        let frame = gradient_frame(6, 4);
        let png = frame.export_as_png_bytes().unwrap();
        assert_eq!(ImageFrame::new_from_png_bytes(&png).unwrap(), frame);
    }

    #[test]
    fn test_grayscale_promotion() {
        let gray = ImageFrame::from_array(Array3::from_elem((2, 3, 1), 42u8)).unwrap();
        let rgb = gray.to_rgb();
        assert_eq!(*rgb.get_channel_layout(), ColorChannelLayout::RGB);
        assert!(rgb.get_internal_data().iter().all(|&v| v == 42));
    }

    #[test]
    fn test_crop_bounds() {
        let frame = gradient_frame(10, 10);
        let patch = frame.crop(2, 3, 5, 9).unwrap();
        assert_eq!(patch.get_internal_data().dim(), (6, 3, 3));
        assert_eq!(patch.get_internal_data()[(0, 0, 0)], frame.get_internal_data()[(3, 2, 0)]);
        assert!(frame.crop(5, 5, 5, 8).is_err());
        assert!(frame.crop(0, 0, 11, 4).is_err());
    }
}
