//! # steprec - frame augmentation and patch extraction for step recognition
//!
//! This crate bundles the steprec workspace behind feature flags. Two subsystems
//! feed a downstream step recognizer:
//!
//! - **augmentation**: a fixed sequence of randomly gated transforms whose
//!   parameters drift smoothly from frame to frame, so augmented videos stay
//!   temporally coherent;
//! - **patch extraction**: detector boxes cropped out of frames with aspect
//!   correction and clipping, handed to an external encoder.
//!
//! ## Feature Flags
//!
//! - **`augment`** (default): drift processes, workers, pipelines, replica planning
//! - **`patches`** (default): patch extraction and the encoder boundary
//! - **`config`** (default): TOML configuration with environment and CLI overrides
//! - **`observability`** (default): tracing subscriber setup with per-crate debug flags
//! - **`file-logging`**: timestamped per-run log folders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use steprec::prelude::*;
//!
//! let config = steprec::config::load_config(None, None)?;
//! let seed = resolve_master_seed(config.augmentation.seed);
//! let run = AugmentationRun::new("videos/pour_water.mp4");
//! for replica in run.plan(&config.run, seed)? {
//!     if replica.skip {
//!         continue;
//!     }
//!     let mut pipeline = replica.build_pipeline(&config.augmentation)?;
//!     # let _ = &mut pipeline;
//!     // decode frames, then: augment_sequence(&mut pipeline, frames, &mut sink)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! steprec-structures      frames, groups, batches, boxes, pixel processing
//!        ↓
//! steprec-config          pipeline / run / patch configuration
//!        ↓
//! steprec-augment         drift, homography, workers, gated stages, pipeline, runs
//! steprec-patches         extraction, encoder boundary
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use steprec_structures as structures;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use steprec_config as config;

#[cfg(feature = "observability")]
pub use steprec_observability as observability;

// Re-export algorithms
#[cfg(feature = "augment")]
pub use steprec_augment as augment;

#[cfg(feature = "patches")]
pub use steprec_patches as patches;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::structures::descriptors::{ChannelOrder, ColorChannelLayout, ImageXYResolution, PatchShape};
    pub use crate::structures::{BoundingBox, FrameBatch, FrameError, FrameGroup, ImageFrame};

    #[cfg(feature = "config")]
    pub use crate::config::{AugmentationConfig, ConfigError, PatchConfig, RunConfig, SteprecConfig};

    #[cfg(feature = "augment")]
    pub use crate::augment::{
        augment_sequence, resolve_master_seed, AugmentationPipeline, AugmentationRun, DriftProcess, Factor,
        FrameSink, Gate, GatedGroupTransform, PngFrameDirectory, ReplicaPlan, TransformWorker,
    };

    #[cfg(feature = "patches")]
    pub use crate::patches::{PatchEmbedder, PatchEncoder, PatchExtractor};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(bbox.width, 1.0);
    }
}
