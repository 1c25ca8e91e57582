// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core crate for steprec. Defines the data structures shared by the augmentation
//! pipeline and the patch extractor: image frames, frame groups, stacked batches and
//! bounding boxes, together with the pixel-level processing implemented on them.

mod bounding_box;
pub mod descriptors;
mod error;
mod frame_group;
mod image_frame;
pub mod processing;

pub use bounding_box::{BoundingBox, CornerPoints};
pub use error::FrameError;
pub use frame_group::{FrameBatch, FrameGroup};
pub use image_frame::ImageFrame;
