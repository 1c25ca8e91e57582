// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::descriptors::{ImageXYResolution, PatchShape};

/// An axis aligned box in pixel coordinates, stored as (x, y, width, height).
///
/// Boxes come from detectors and are not trusted: after aspect correction they may
/// be partially or fully outside the frame, or even negative sized. Clipping is
/// done on the integer [`CornerPoints`].
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        BoundingBox { x, y, width, height }
    }

    /// Widens or narrows the box symmetrically so width / height matches the patch
    /// shape's aspect ratio. The height is never changed.
    pub fn aspect_corrected(&self, patch_shape: &PatchShape) -> BoundingBox {
        let new_width = patch_shape.aspect_ratio() * self.height;
        BoundingBox {
            x: self.x - (new_width - self.width) / 2.0,
            y: self.y,
            width: new_width,
            height: self.height,
        }
    }

    /// Converts to integer corners, truncating toward zero.
    pub fn to_corner_points(&self) -> CornerPoints {
        CornerPoints {
            x1: self.x.trunc() as i64,
            y1: self.y.trunc() as i64,
            x2: (self.x + self.width).trunc() as i64,
            y2: (self.y + self.height).trunc() as i64,
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(xywh: [f64; 4]) -> Self {
        BoundingBox::new(xywh[0], xywh[1], xywh[2], xywh[3])
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "BoundingBox(x: {}, y: {}, w: {}, h: {})", self.x, self.y, self.width, self.height)
    }
}

/// Integer (x1, y1) upper left and (x2, y2) lower right corners. The lower right
/// corner is exclusive when used as a slice bound.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct CornerPoints {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl CornerPoints {
    /// Clips the upper left corner to >= 0 and the lower right corner to at most
    /// (width - 1, height - 1).
    pub fn clipped_to(&self, resolution: &ImageXYResolution) -> CornerPoints {
        CornerPoints {
            x1: self.x1.max(0),
            y1: self.y1.max(0),
            x2: self.x2.min(resolution.width as i64 - 1),
            y2: self.y2.min(resolution.height as i64 - 1),
        }
    }

    /// True when the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_correction_recenters_width() {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 40.0);
        let square = bbox.aspect_corrected(&PatchShape::new(224, 224).unwrap());
        assert_eq!(square.width, 40.0);
        assert_eq!(square.height, 40.0);
        assert_eq!(square.x, 0.0);
        assert_eq!(square.y, 10.0);
    }

    #[test]
    fn test_corner_truncation_toward_zero() {
        let corners = BoundingBox::new(-1.7, 2.9, 3.5, 1.2).to_corner_points();
        assert_eq!(corners, CornerPoints { x1: -1, y1: 2, x2: 1, y2: 4 });
    }

    #[test]
    fn test_clip_collapses_outside_box() {
        let resolution = ImageXYResolution::new(100, 100).unwrap();
        let corners = BoundingBox::new(-50.0, -50.0, 20.0, 20.0).to_corner_points().clipped_to(&resolution);
        assert!(corners.is_empty());
    }
}
