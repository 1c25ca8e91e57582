// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Boundary to the external patch encoder.

use ndarray::Array2;
use steprec_structures::descriptors::PatchShape;
use steprec_structures::{BoundingBox, FrameError, ImageFrame};
use tracing::debug;

use crate::extractor::PatchExtractor;

/// Turns a batch of patches into one embedding row per patch.
pub trait PatchEncoder {
    /// Length of every embedding row.
    fn embedding_dim(&self) -> usize;

    /// Returns a `(patches.len(), embedding_dim())` array.
    fn encode(&mut self, patches: &[ImageFrame]) -> Result<Array2<f32>, FrameError>;
}

/// Extracts the patches of a frame and feeds them to a [`PatchEncoder`].
pub struct PatchEmbedder<E: PatchEncoder> {
    encoder: E,
    extractor: PatchExtractor,
}

impl<E: PatchEncoder> PatchEmbedder<E> {
    pub fn new(encoder: E, extractor: PatchExtractor) -> Self {
        PatchEmbedder { encoder, extractor }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Embeds one patch per box, preceded by the whole frame when `include_frame`
    /// is set. Without anything to embed the result is an empty
    /// `(0, embedding_dim)` array and the encoder is not called.
    pub fn embed(
        &mut self,
        frame: &ImageFrame,
        boxes: &[BoundingBox],
        patch_shape: Option<&PatchShape>,
        include_frame: bool,
    ) -> Result<Array2<f32>, FrameError> {
        let mut patches = Vec::with_capacity(boxes.len() + 1);
        if include_frame {
            patches.push(frame.clone());
        }
        patches.extend(self.extractor.extract_many(frame, boxes, patch_shape));

        let dim = self.encoder.embedding_dim();
        if patches.is_empty() {
            return Ok(Array2::zeros((0, dim)));
        }

        debug!("Encoding {} patches", patches.len());
        let embeddings = self.encoder.encode(&patches)?;
        if embeddings.dim() != (patches.len(), dim) {
            return Err(FrameError::InternalError(format!(
                "Encoder returned {:?} embeddings for {} patches of dimension {}",
                embeddings.dim(),
                patches.len(),
                dim
            )));
        }
        Ok(embeddings)
    }
}
