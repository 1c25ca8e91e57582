//! Tests for the pixel processing implemented on ImageFrame

use ndarray::Array3;
use steprec_structures::descriptors::{ColorChannelLayout, ImageXYResolution};
use steprec_structures::processing::IDENTITY_PERSPECTIVE;
use steprec_structures::{FrameError, ImageFrame};

#[cfg(test)]
mod test_photometric {
    use super::*;

    //region Helper Functions

    fn gradient_frame() -> ImageFrame {
        ImageFrame::from_array(Array3::from_shape_fn((6, 8, 3), |(y, x, c)| (x * 20 + y * 5 + c * 3) as u8)).unwrap()
    }

    //endregion

    #[test]
    fn test_contrast_zero_flattens_to_mean_luma() {
        let mut frame = ImageFrame::from_array(Array3::from_shape_fn((2, 2, 1), |(y, x, _)| if (x + y) % 2 == 0 { 0 } else { 200 })).unwrap();
        frame.adjust_contrast(0.0).unwrap();
        assert!(frame.get_internal_data().iter().all(|&v| v == 100));
    }

    #[test]
    fn test_gamma_keeps_endpoints() {
        let mut frame = ImageFrame::from_array(Array3::from_shape_fn((1, 2, 1), |(_, x, _)| if x == 0 { 0 } else { 255 })).unwrap();
        frame.adjust_gamma(2.0).unwrap();
        assert_eq!(frame.get_internal_data().as_slice().unwrap(), &[0, 255]);
    }

    #[test]
    fn test_sharpness_leaves_border() {
        let original = gradient_frame();
        let mut frame = original.clone();
        frame.adjust_sharpness(0.0).unwrap();
        let (before, after) = (original.get_internal_data(), frame.get_internal_data());
        for x in 0..8 {
            assert_eq!(before[(0, x, 0)], after[(0, x, 0)]);
            assert_eq!(before[(5, x, 1)], after[(5, x, 1)]);
        }
    }

    #[test]
    fn test_hue_out_of_range_rejected() {
        let mut frame = gradient_frame();
        assert!(matches!(frame.adjust_hue(0.75), Err(FrameError::BadParameters(_))));
    }

    #[test]
    fn test_grayscale_ignores_color_only_adjustments() {
        let original = ImageFrame::new(&ColorChannelLayout::GrayScale, &ImageXYResolution::new(4, 3).unwrap());
        let mut frame = original.clone();
        frame.adjust_hue(0.3).unwrap();
        frame.adjust_saturation(0.0).unwrap();
        assert_eq!(frame, original);
    }
}

#[cfg(test)]
mod test_geometry {
    use super::*;

    #[test]
    fn test_identity_warp_of_grayscale() {
        let frame = ImageFrame::from_array(Array3::from_shape_fn((5, 7, 1), |(y, x, _)| (y * 7 + x) as u8)).unwrap();
        assert_eq!(frame.warp_perspective(&IDENTITY_PERSPECTIVE), frame);
    }

    #[test]
    fn test_scaling_warp_samples_source() {
        // Output (x, y) samples source (x / 2, y / 2): the top left quadrant is enlarged
        let frame = ImageFrame::from_array(Array3::from_shape_fn((4, 4, 1), |(y, x, _)| (y * 4 + x) as u8)).unwrap();
        let half = [0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0];
        let warped = frame.warp_perspective(&half);
        let pixels = warped.get_internal_data();
        assert_eq!(pixels[(0, 0, 0)], 0);
        assert_eq!(pixels[(3, 3, 0)], 5);
        assert_eq!(pixels[(2, 1, 0)], 4);
    }
}
