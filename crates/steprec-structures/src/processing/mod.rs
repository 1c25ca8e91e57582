// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pixel level processing implemented directly on [`crate::ImageFrame`].
//!
//! Photometric adjustments mutate the frame in place and mirror the behaviour of the
//! classic PIL enhancers (blend against a degenerate image). Geometric operations
//! return new frames. None of these draw random numbers; the stochastic parameters are
//! chosen by the caller, which keeps every operation here deterministic and safe to
//! run across rayon threads.

mod color_adjustments;
mod geometry;

pub use color_adjustments::luma;
pub use geometry::{PerspectiveCoefficients, IDENTITY_PERSPECTIVE};
