// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Planning and running the augmented replicas of one source.
//!
//! A source is either a video file or a directory of frames. Each replica gets its
//! own output path, its own seed and its own pipeline, so replicas are independent
//! of each other and of the order they run in.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_config::{AugmentationConfig, RunConfig};
use steprec_structures::{FrameBatch, FrameError, FrameGroup, ImageFrame};
use tracing::{debug, info};

use crate::drift::SeedSequence;
use crate::pipeline::AugmentationPipeline;

const VIDEO_EXTENSION: &str = "mp4";
const REPLICA_INFIX: &str = "_aug_";

/// Returns `seed`, or a fresh one from OS entropy (logged so the run can be repeated).
pub fn resolve_master_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = StdRng::from_entropy().gen();
            info!("No augmentation seed configured, using {}", seed);
            seed
        }
    }
}

//region Output naming

/// Names the outputs of a source: `{directory}/{stem}_aug_{index}`, with an `.mp4`
/// extension for video sources. Frame directories get no extension; both kinds lose
/// their last dotted suffix, so `take.v2/` and `take.v2.mp4` both name `take`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    directory: PathBuf,
    stem: String,
    is_frame_dir: bool,
}

impl OutputTemplate {
    /// `output_dir` defaults to the directory containing the source.
    pub fn for_source(source: &Path, output_dir: Option<&Path>, is_frame_dir: bool) -> Result<Self, FrameError> {
        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| FrameError::BadParameters(format!("Source {} has no usable file name", source.display())))?;
        let directory = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Ok(OutputTemplate {
            directory,
            stem: stem.to_string(),
            is_frame_dir,
        })
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        let name = if self.is_frame_dir {
            format!("{}{}{}", self.stem, REPLICA_INFIX, index)
        } else {
            format!("{}{}{}.{}", self.stem, REPLICA_INFIX, index, VIDEO_EXTENSION)
        };
        self.directory.join(name)
    }
}

//endregion

//region Planning

/// One augmented output of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPlan {
    pub index: usize,
    pub output: PathBuf,
    pub seed: u64,
    /// The output already exists and overwriting is off
    pub skip: bool,
}

impl ReplicaPlan {
    /// A fresh pipeline for this replica, seeded with the replica's own seed.
    pub fn build_pipeline(&self, config: &AugmentationConfig) -> Result<AugmentationPipeline, FrameError> {
        AugmentationPipeline::from_config(config, self.seed)
    }
}

#[derive(Debug, Clone)]
pub struct AugmentationRun {
    source: PathBuf,
    is_frame_dir: bool,
}

impl AugmentationRun {
    /// A directory source is treated as a frame directory, anything else as video.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let is_frame_dir = source.is_dir();
        AugmentationRun { source, is_frame_dir }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_frame_dir(&self) -> bool {
        self.is_frame_dir
    }

    /// One plan per replica. Replica seeds derive from `master_seed` in index order.
    pub fn plan(&self, run: &RunConfig, master_seed: u64) -> Result<Vec<ReplicaPlan>, FrameError> {
        let template = OutputTemplate::for_source(&self.source, run.output_dir.as_deref(), self.is_frame_dir)?;
        let mut seeds = SeedSequence::new(master_seed);
        let plans: Vec<ReplicaPlan> = (0..run.replicas)
            .map(|index| {
                let output = template.path_for(index);
                let skip = !run.overwrite && output.exists();
                if skip {
                    debug!("Skipping replica {}, {} already exists", index, output.display());
                }
                ReplicaPlan {
                    index,
                    output,
                    seed: seeds.next_seed(),
                    skip,
                }
            })
            .collect();
        info!(
            "Planned {} replicas of {} ({} to generate)",
            plans.len(),
            self.source.display(),
            plans.iter().filter(|plan| !plan.skip).count()
        );
        Ok(plans)
    }
}

//endregion

//region Running

/// Receives augmented frames in order.
pub trait FrameSink {
    fn write_frame(&mut self, index: usize, batch: &FrameBatch) -> Result<(), FrameError>;
}

/// Writes each frame as `frame_{index:010}.png` into a directory.
#[derive(Debug, Clone)]
pub struct PngFrameDirectory {
    directory: PathBuf,
}

impl PngFrameDirectory {
    /// Creates the directory (and its parents) if needed.
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self, FrameError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| {
            FrameError::EncodingError(format!("Failed to create {}: {}", directory.display(), e))
        })?;
        Ok(PngFrameDirectory { directory })
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("frame_{:010}.png", index))
    }
}

impl FrameSink for PngFrameDirectory {
    /// Batches of more than one frame take consecutive indices.
    fn write_frame(&mut self, index: usize, batch: &FrameBatch) -> Result<(), FrameError> {
        for offset in 0..batch.frame_count() {
            let frame = batch.get_frame_as_rgb(offset)?;
            frame
                .export_as_dynamic_image()?
                .save_with_format(self.frame_path(index + offset), ImageFormat::Png)?;
        }
        Ok(())
    }
}

/// Augments `frames` one at a time through a single pipeline, so drifting parameters
/// carry over from frame to frame, and hands every result to `sink`.
///
/// Returns the number of frames written.
pub fn augment_sequence<I, S>(pipeline: &mut AugmentationPipeline, frames: I, sink: &mut S) -> Result<usize, FrameError>
where
    I: IntoIterator<Item = ImageFrame>,
    S: FrameSink + ?Sized,
{
    let mut written = 0;
    for frame in frames {
        let batch = pipeline.apply(FrameGroup::from_frame(frame))?;
        sink.write_frame(written, &batch)?;
        written += batch.frame_count();
    }
    debug!("Augmented {} frames", written);
    Ok(written)
}

//endregion
