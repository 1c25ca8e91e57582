// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Temporally coherent augmentation of video frames.
//!
//! Parameters come from drifting random walks rather than independent draws, so a
//! sequence of frames augmented one after another changes smoothly instead of
//! flickering. Stages are gated per frame group: frames that belong together are
//! either all transformed or all left alone.
//!
//! ```no_run
//! use steprec_augment::AugmentationPipeline;
//! use steprec_structures::ImageFrame;
//! # fn frames() -> Vec<ImageFrame> { Vec::new() }
//!
//! let mut pipeline = AugmentationPipeline::standard(Some(600), 7)?;
//! for frame in frames() {
//!     let batch = pipeline.apply_frame(frame)?;
//!     assert_eq!(batch.frame_count(), 1);
//! }
//! # Ok::<(), steprec_structures::FrameError>(())
//! ```

pub mod drift;
pub mod gated;
pub mod homography;
pub mod pipeline;
pub mod run;
pub mod workers;

pub use drift::{DriftProcess, Factor, SeedSequence};
pub use gated::{Gate, GatedGroupTransform};
pub use homography::{perspective_coefficients_for_frame, solve_perspective_coefficients};
pub use pipeline::AugmentationPipeline;
pub use run::{augment_sequence, resolve_master_seed, AugmentationRun, FrameSink, OutputTemplate, PngFrameDirectory, ReplicaPlan};
pub use workers::TransformWorker;
