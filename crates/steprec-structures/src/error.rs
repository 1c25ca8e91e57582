// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for steprec frame operations.
///
/// Covers invalid parameters, degenerate geometry handed to the homography solver,
/// image encode/decode failures and internal errors across the augmentation and
/// patch extraction code.
///
/// # Examples
/// ```
/// use steprec_structures::FrameError;
///
/// fn validate_ratio(ratio: f64) -> Result<(), FrameError> {
///     if !(0.0..=1.0).contains(&ratio) {
///         return Err(FrameError::BadParameters("Ratio must be within [0, 1]".into()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_ratio(1.5).is_err());
/// assert!(validate_ratio(0.25).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Invalid parameters provided to a function
    BadParameters(String),
    /// Point correspondences do not span a proper quadrilateral (singular system)
    DegenerateGeometry(String),
    /// Failed to encode or decode an image
    EncodingError(String),
    /// Internal error indicating a bug (please report)
    InternalError(String),
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            FrameError::DegenerateGeometry(msg) => write!(f, "Degenerate Geometry: {}", msg),
            FrameError::EncodingError(msg) => write!(f, "Image Encoding Error: {}", msg),
            FrameError::InternalError(msg) => write!(
                f,
                "Internal Error, please raise an issue on Github: {}",
                msg
            ),
        }
    }
}
impl Error for FrameError {}

impl From<image::ImageError> for FrameError {
    fn from(err: image::ImageError) -> Self {
        FrameError::EncodingError(err.to_string())
    }
}
