// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-frame transform workers.
//!
//! Each worker owns the generators for its parameters and draws fresh values on
//! every call. The pipeline only ever sees the closed [`TransformWorker`] enum.

mod color;
mod mask;
mod perspective;
mod salt_pepper;
mod stack;
mod thumbnail;

pub use color::{Adjustment, ColorAdjustmentKind, ColorAlterSettings, ColorAlterWorker};
pub use mask::PatchMaskWorker;
pub use perspective::PerspectiveWorker;
pub use salt_pepper::SaltPepperWorker;
pub use stack::StackWorker;
pub use thumbnail::ThumbnailWorker;

use steprec_structures::{FrameError, ImageFrame};

/// Every frame level transform the pipeline can run.
#[derive(Debug, Clone)]
pub enum TransformWorker {
    HorizontalFlip,
    Perspective(PerspectiveWorker),
    ColorAlter(ColorAlterWorker),
    SaltPepper(SaltPepperWorker),
    PatchMask(PatchMaskWorker),
    Thumbnail(ThumbnailWorker),
}

impl TransformWorker {
    pub fn apply(&mut self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        match self {
            TransformWorker::HorizontalFlip => Ok(frame.flip_horizontal()),
            TransformWorker::Perspective(worker) => worker.apply(frame),
            TransformWorker::ColorAlter(worker) => worker.apply(frame),
            TransformWorker::SaltPepper(worker) => worker.apply(frame),
            TransformWorker::PatchMask(worker) => worker.apply(frame),
            TransformWorker::Thumbnail(worker) => worker.apply(frame),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TransformWorker::HorizontalFlip => "flip",
            TransformWorker::Perspective(_) => "perspective",
            TransformWorker::ColorAlter(_) => "color",
            TransformWorker::SaltPepper(_) => "salt_pepper",
            TransformWorker::PatchMask(_) => "mask",
            TransformWorker::Thumbnail(_) => "thumbnail",
        }
    }
}
