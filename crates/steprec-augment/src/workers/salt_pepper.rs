// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::Axis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_structures::{FrameError, ImageFrame};

use crate::drift::Factor;

const SALT: u8 = 255;
const PEPPER: u8 = 0;

/// Impulse noise. Roughly one pixel in `ratio` turns white, then, with a freshly
/// drawn ratio, one in `ratio` turns black.
#[derive(Debug, Clone)]
pub struct SaltPepperWorker {
    ratio: Factor,
    rng: StdRng,
}

impl SaltPepperWorker {
    pub fn new(ratio: Factor, seed: u64) -> Self {
        SaltPepperWorker {
            ratio,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn apply(&mut self, frame: &ImageFrame) -> Result<ImageFrame, FrameError> {
        let mut output = frame.clone();
        self.sprinkle(&mut output, SALT);
        self.sprinkle(&mut output, PEPPER);
        Ok(output)
    }

    /// Row-major pass over every pixel; sequential so the draws follow the seed.
    fn sprinkle(&mut self, frame: &mut ImageFrame, value: u8) {
        let ratio = draw_ratio(&mut self.ratio);
        let mut pixels = frame.get_pixels_view_mut();
        for mut pixel in pixels.lanes_mut(Axis(2)) {
            if self.rng.gen_range(0..ratio) == 0 {
                pixel.fill(value);
            }
        }
    }
}

/// Floors the drawn ratio to an integer of at least 1.
fn draw_ratio(factor: &mut Factor) -> u64 {
    let drawn = factor.next_value().floor();
    if drawn.is_finite() && drawn >= 1.0 {
        drawn as u64
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_ratio_of_one_hits_every_pixel() {
        let mut worker = SaltPepperWorker::new(Factor::Fixed(1.0), 4);
        let frame = ImageFrame::from_array(Array3::from_elem((5, 6, 3), 128)).unwrap();
        let output = worker.apply(&frame).unwrap();
        assert!(output.get_internal_data().iter().all(|&v| v == PEPPER));
    }

    #[test]
    fn test_ratio_floor() {
        assert_eq!(draw_ratio(&mut Factor::Fixed(0.3)), 1);
        assert_eq!(draw_ratio(&mut Factor::Fixed(-4.0)), 1);
        assert_eq!(draw_ratio(&mut Factor::Fixed(999.9)), 999);
    }
}
