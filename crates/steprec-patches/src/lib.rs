// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Patch extraction for steprec.
//!
//! Detector boxes are cropped out of frames so that an external vision encoder can
//! embed them. A box that yields nothing (fully outside the frame, or collapsed by
//! clipping) never stops a batch: it is replaced by a noise patch and logged.

pub mod encoder;
pub mod extractor;

pub use encoder::{PatchEmbedder, PatchEncoder};
pub use extractor::{configured_patch_shape, extract_image_patch, PatchExtractor};
