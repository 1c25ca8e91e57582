//! Tests for box cropping, noise fallback and the encoder boundary

use ndarray::{s, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steprec_patches::{extract_image_patch, PatchEmbedder, PatchEncoder, PatchExtractor};
use steprec_structures::descriptors::PatchShape;
use steprec_structures::{BoundingBox, FrameError, ImageFrame};

//region Helper Functions

fn indexed_frame(width: usize, height: usize) -> ImageFrame {
    ImageFrame::from_array(Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        ((y * 31 + x * 7 + c) % 251) as u8
    }))
    .unwrap()
}

/// Embeds every patch as its mean intensity per channel.
struct MeanColorEncoder {
    calls: usize,
}

impl PatchEncoder for MeanColorEncoder {
    fn embedding_dim(&self) -> usize {
        3
    }

    fn encode(&mut self, patches: &[ImageFrame]) -> Result<Array2<f32>, FrameError> {
        self.calls += 1;
        let mut embeddings = Array2::zeros((patches.len(), 3));
        for (row, patch) in patches.iter().enumerate() {
            let pixels = patch.to_rgb().into_internal_data().mapv(|v| v as f32);
            let means = pixels
                .mean_axis(Axis(0))
                .and_then(|m| m.mean_axis(Axis(0)))
                .ok_or_else(|| FrameError::BadParameters("empty patch".into()))?;
            embeddings.row_mut(row).assign(&means);
        }
        Ok(embeddings)
    }
}

//endregion

#[cfg(test)]
mod test_single_box {
    use super::*;

    #[test]
    fn test_box_inside_frame_is_exact_crop() {
        let frame = indexed_frame(100, 100);
        let patch = extract_image_patch(&frame, &BoundingBox::new(10.0, 10.0, 20.0, 30.0), None).unwrap();
        assert_eq!(patch.get_internal_data().dim(), (30, 20, 3));
        assert_eq!(
            patch.get_internal_data(),
            &frame.get_internal_data().slice(s![10..40, 10..30, ..]).to_owned()
        );
    }

    #[test]
    fn test_box_outside_frame_fails() {
        let frame = indexed_frame(100, 100);
        assert!(extract_image_patch(&frame, &BoundingBox::new(-50.0, -50.0, 20.0, 20.0), None).is_none());
        assert!(extract_image_patch(&frame, &BoundingBox::new(150.0, 10.0, 20.0, 20.0), None).is_none());
        assert!(extract_image_patch(&frame, &BoundingBox::new(10.0, 10.0, 0.0, 20.0), None).is_none());
    }

    #[test]
    fn test_straddling_box_is_clipped() {
        let frame = indexed_frame(100, 80);
        let patch = extract_image_patch(&frame, &BoundingBox::new(90.0, -5.0, 30.0, 20.0), None).unwrap();
        // x: 90..99 (clipped to width - 1), y: 0..15
        assert_eq!(patch.get_internal_data().dim(), (15, 9, 3));
        assert_eq!(
            patch.get_internal_data(),
            &frame.get_internal_data().slice(s![0..15, 90..99, ..]).to_owned()
        );
    }

    #[test]
    fn test_aspect_correction_widens_around_center() {
        let frame = indexed_frame(100, 100);
        let square = PatchShape::new(64, 64).unwrap();
        let patch = extract_image_patch(&frame, &BoundingBox::new(40.0, 10.0, 10.0, 30.0), Some(&square)).unwrap();
        // width 10 -> 30, x 40 -> 30
        assert_eq!(patch.get_internal_data().dim(), (30, 30, 3));
        assert_eq!(
            patch.get_internal_data(),
            &frame.get_internal_data().slice(s![10..40, 30..60, ..]).to_owned()
        );
    }

    #[test]
    fn test_fuzzed_boxes_stay_inside_frame() {
        let frame = indexed_frame(64, 48);
        let shapes = [None, Some(PatchShape::new(10, 30).unwrap()), Some(PatchShape::new(40, 5).unwrap())];
        let mut rng = StdRng::seed_from_u64(2024);
        let magnitudes = [1.0, 10.0, 100.0, 1e4, 1e12];
        for _ in 0..2000 {
            let scale = magnitudes[rng.gen_range(0..magnitudes.len())];
            let bbox = BoundingBox::new(
                rng.gen_range(-scale..scale),
                rng.gen_range(-scale..scale),
                rng.gen_range(-scale..scale),
                rng.gen_range(-scale..scale),
            );
            let shape = shapes[rng.gen_range(0..shapes.len())];
            if let Some(patch) = extract_image_patch(&frame, &bbox, shape.as_ref()) {
                let (height, width, channels) = patch.get_internal_data().dim();
                assert!(height >= 1 && height < 48, "{} gave height {}", bbox, height);
                assert!(width >= 1 && width < 64, "{} gave width {}", bbox, width);
                assert_eq!(channels, 3);
            }
        }
    }
}

#[cfg(test)]
mod test_batch {
    use super::*;

    #[test]
    fn test_failed_boxes_become_noise_of_requested_shape() {
        let frame = indexed_frame(100, 100);
        let shape = PatchShape::new(16, 24).unwrap();
        let boxes = vec![
            BoundingBox::new(-50.0, -50.0, 20.0, 20.0),
            BoundingBox::new(10.0, 10.0, 30.0, 20.0),
            BoundingBox::new(500.0, 500.0, 20.0, 20.0),
        ];
        let mut extractor = PatchExtractor::new(3);
        let patches = extractor.extract_many(&frame, &boxes, Some(&shape));

        assert_eq!(patches.len(), 3);
        assert_eq!(patches[0].get_internal_data().dim(), (16, 24, 3));
        assert_eq!(patches[2].get_internal_data().dim(), (16, 24, 3));
        assert!(patches[0].get_internal_data().iter().all(|&v| v < 255));
        assert_eq!(patches[1].get_internal_data().dim(), (20, 30, 3));
    }

    #[test]
    fn test_noise_without_shape_matches_frame() {
        let frame = ImageFrame::from_array(Array3::zeros((12, 20, 1))).unwrap();
        let mut extractor = PatchExtractor::new(3);
        let patches = extractor.extract_many(&frame, &[BoundingBox::new(-9.0, -9.0, 1.0, 1.0)], None);
        assert_eq!(patches[0].get_internal_data().dim(), (12, 20, 1));
    }

    #[test]
    fn test_noise_is_seeded() {
        let frame = indexed_frame(10, 10);
        let boxes = [BoundingBox::new(-20.0, 0.0, 5.0, 5.0)];
        let first = PatchExtractor::new(8).extract_many(&frame, &boxes, None);
        let second = PatchExtractor::new(8).extract_many(&frame, &boxes, None);
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod test_embedder {
    use super::*;

    #[test]
    fn test_empty_input_returns_zero_rows() {
        let mut embedder = PatchEmbedder::new(MeanColorEncoder { calls: 0 }, PatchExtractor::new(1));
        let embeddings = embedder.embed(&indexed_frame(8, 8), &[], None, false).unwrap();
        assert_eq!(embeddings.dim(), (0, 3));
        assert_eq!(embedder.encoder().calls, 0);
    }

    #[test]
    fn test_frame_is_embedded_first() {
        let frame = ImageFrame::from_array(Array3::from_elem((10, 10, 3), 100)).unwrap();
        let mut pixels = frame.clone().into_internal_data();
        pixels.slice_mut(s![0..4, 0..4, ..]).fill(20);
        let frame = ImageFrame::from_array(pixels).unwrap();

        let mut embedder = PatchEmbedder::new(MeanColorEncoder { calls: 0 }, PatchExtractor::new(1));
        let embeddings = embedder
            .embed(&frame, &[BoundingBox::new(0.0, 0.0, 4.0, 4.0)], None, true)
            .unwrap();

        assert_eq!(embeddings.dim(), (2, 3));
        assert!((embeddings[(0, 0)] - 87.2).abs() < 1e-3);
        assert_eq!(embeddings[(1, 0)], 20.0);
        assert_eq!(embedder.encoder().calls, 1);
    }
}
