// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::{s, Array4, ArrayView4, Axis};

use crate::descriptors::{ChannelOrder, ImageXYResolution};
use crate::{FrameError, ImageFrame};

//region FrameGroup

/// An ordered, non-empty sequence of frames that receives coherent treatment from
/// every augmentation stage: one gate decision per stage for the whole group.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGroup {
    frames: Vec<ImageFrame>,
}

impl FrameGroup {
    pub fn new(frames: Vec<ImageFrame>) -> Result<FrameGroup, FrameError> {
        if frames.is_empty() {
            return Err(FrameError::BadParameters(
                "A frame group must contain at least one frame".into(),
            ));
        }
        Ok(FrameGroup { frames })
    }

    /// Wraps a single frame into a group of one.
    pub fn from_frame(frame: ImageFrame) -> FrameGroup {
        FrameGroup { frames: vec![frame] }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageFrame> {
        self.frames.iter()
    }

    pub fn frames(&self) -> &[ImageFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<ImageFrame> {
        self.frames
    }

    /// Applies a fallible per-frame mapping, keeping group length and order.
    pub fn try_map<F>(self, mut f: F) -> Result<FrameGroup, FrameError>
    where
        F: FnMut(ImageFrame) -> Result<ImageFrame, FrameError>,
    {
        let frames = self
            .frames
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FrameGroup { frames })
    }
}

impl<'a> IntoIterator for &'a FrameGroup {
    type Item = &'a ImageFrame;
    type IntoIter = std::slice::Iter<'a, ImageFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

//endregion

//region FrameBatch

/// A frame group stacked into a single (frames, height, width, 3) array.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBatch {
    data: Array4<u8>,
    channel_order: ChannelOrder,
}

impl FrameBatch {
    pub fn new(data: Array4<u8>, channel_order: ChannelOrder) -> Result<FrameBatch, FrameError> {
        let (count, height, width, channels) = data.dim();
        if count == 0 || height == 0 || width == 0 || channels != 3 {
            return Err(FrameError::BadParameters(format!(
                "A frame batch must be (N>0, H>0, W>0, 3), got {:?}",
                data.dim()
            )));
        }
        Ok(FrameBatch { data, channel_order })
    }

    pub fn frame_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn get_xy_resolution(&self) -> ImageXYResolution {
        let shape = self.data.shape();
        ImageXYResolution {
            width: shape[2] as u32,
            height: shape[1] as u32,
        }
    }

    pub fn get_channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn get_data_view(&self) -> ArrayView4<'_, u8> {
        self.data.view()
    }

    pub fn into_data(self) -> Array4<u8> {
        self.data
    }

    /// Copies a single frame out of the batch, in the batch's channel order.
    pub fn get_frame(&self, index: usize) -> Result<ImageFrame, FrameError> {
        if index >= self.frame_count() {
            return Err(FrameError::BadParameters(format!(
                "Frame index {} out of range for a batch of {}",
                index,
                self.frame_count()
            )));
        }
        ImageFrame::from_array(self.data.index_axis(Axis(0), index).to_owned())
    }

    /// Like `get_frame`, but always in RGB order.
    pub fn get_frame_as_rgb(&self, index: usize) -> Result<ImageFrame, FrameError> {
        let frame = self.get_frame(index)?;
        match self.channel_order {
            ChannelOrder::RGB => Ok(frame),
            ChannelOrder::BGR => ImageFrame::from_array(frame.get_pixels_view().slice(s![.., .., ..;-1]).to_owned()),
        }
    }
}

//endregion

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_empty_group_rejected() {
        assert!(FrameGroup::new(vec![]).is_err());
    }

    #[test]
    fn test_try_map_preserves_order() {
        let frames = (0..4u8)
            .map(|i| ImageFrame::from_array(Array3::from_elem((2, 2, 1), i)).unwrap())
            .collect();
        let group = FrameGroup::new(frames).unwrap();
        let mapped = group.try_map(|f| Ok(f.to_rgb())).unwrap();
        assert_eq!(mapped.len(), 4);
        for (i, frame) in mapped.iter().enumerate() {
            assert_eq!(frame.get_internal_data()[(0, 0, 2)], i as u8);
        }
    }

    #[test]
    fn test_batch_requires_three_channels() {
        assert!(FrameBatch::new(Array4::zeros((1, 2, 2, 1)), ChannelOrder::RGB).is_err());
        let batch = FrameBatch::new(Array4::zeros((2, 3, 5, 3)), ChannelOrder::BGR).unwrap();
        assert_eq!(batch.frame_count(), 2);
        assert_eq!(batch.get_xy_resolution(), ImageXYResolution { width: 5, height: 3 });
        assert!(batch.get_frame(2).is_err());
    }

    #[test]
    fn test_bgr_frame_read_back_as_rgb() {
        let data = Array4::from_shape_fn((1, 1, 1, 3), |(_, _, _, c)| c as u8 + 1);
        let batch = FrameBatch::new(data, ChannelOrder::BGR).unwrap();
        assert_eq!(batch.get_frame(0).unwrap().get_internal_data()[(0, 0, 0)], 1);
        assert_eq!(batch.get_frame_as_rgb(0).unwrap().get_internal_data()[(0, 0, 0)], 3);
    }
}
