// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::{Axis, Zip};

use crate::descriptors::ColorChannelLayout;
use crate::{FrameError, ImageFrame};

const LUMA_RED: f64 = 0.299;
const LUMA_GREEN: f64 = 0.587;
const LUMA_BLUE: f64 = 0.114;
const SMOOTH_CENTER_WEIGHT: f64 = 5.0;
const SMOOTH_KERNEL_SUM: f64 = 13.0;

/// ITU-R 601 luma of an RGB triple, in the same 0-255 range as the inputs.
pub fn luma(red: f64, green: f64, blue: f64) -> f64 {
    LUMA_RED * red + LUMA_GREEN * green + LUMA_BLUE * blue
}

#[inline]
fn saturate(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn check_factor(name: &str, factor: f64) -> Result<(), FrameError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(FrameError::BadParameters(format!(
            "{} factor must be a finite non-negative number, got {}",
            name, factor
        )));
    }
    Ok(())
}

impl ImageFrame {

    //region Photometric Adjustments (In Place)

    /// Scales every intensity by `factor` (0 gives a black frame, 1 leaves it unchanged).
    pub fn adjust_brightness(&mut self, factor: f64) -> Result<(), FrameError> {
        check_factor("Brightness", factor)?;
        Zip::from(self.get_internal_data_mut()).par_for_each(|value| {
            *value = saturate(*value as f64 * factor);
        });
        Ok(())
    }

    /// Interpolates every intensity against the frame's mean luma.
    /// 0 gives a flat gray frame, 1 leaves it unchanged.
    pub fn adjust_contrast(&mut self, factor: f64) -> Result<(), FrameError> {
        check_factor("Contrast", factor)?;
        let mean = self.mean_luma().round();
        Zip::from(self.get_internal_data_mut()).par_for_each(|value| {
            *value = saturate(mean + (*value as f64 - mean) * factor);
        });
        Ok(())
    }

    /// Applies `255 * (v / 255) ^ gamma` through a lookup table.
    pub fn adjust_gamma(&mut self, gamma: f64) -> Result<(), FrameError> {
        check_factor("Gamma", gamma)?;
        let mut lut = [0u8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = (255.999 * (i as f64 / 255.0).powf(gamma)).min(255.0) as u8;
        }
        self.apply_lookup_table(&lut);
        Ok(())
    }

    /// Rotates the hue of every pixel by `factor` of a full turn. `factor` must lie in
    /// [-0.5, 0.5]. Grayscale frames carry no hue and are left untouched.
    pub fn adjust_hue(&mut self, factor: f64) -> Result<(), FrameError> {
        if !(-0.5..=0.5).contains(&factor) {
            return Err(FrameError::BadParameters(format!(
                "Hue factor must be within [-0.5, 0.5], got {}",
                factor
            )));
        }
        if *self.get_channel_layout() == ColorChannelLayout::GrayScale {
            return Ok(());
        }
        Zip::from(self.get_internal_data_mut().lanes_mut(Axis(2))).par_for_each(|mut pixel| {
            let (hue, saturation, value) = rgb_to_hsv(
                pixel[0] as f64 / 255.0,
                pixel[1] as f64 / 255.0,
                pixel[2] as f64 / 255.0,
            );
            let (r, g, b) = hsv_to_rgb((hue + factor).rem_euclid(1.0), saturation, value);
            pixel[0] = saturate(r * 255.0);
            pixel[1] = saturate(g * 255.0);
            pixel[2] = saturate(b * 255.0);
        });
        Ok(())
    }

    /// Interpolates each pixel against its own luma. 0 gives grayscale, 1 leaves it
    /// unchanged. Grayscale frames are already fully desaturated and are left as is.
    pub fn adjust_saturation(&mut self, factor: f64) -> Result<(), FrameError> {
        check_factor("Saturation", factor)?;
        if *self.get_channel_layout() == ColorChannelLayout::GrayScale {
            return Ok(());
        }
        Zip::from(self.get_internal_data_mut().lanes_mut(Axis(2))).par_for_each(|mut pixel| {
            let gray = luma(pixel[0] as f64, pixel[1] as f64, pixel[2] as f64);
            for channel in pixel.iter_mut() {
                *channel = saturate(gray + (*channel as f64 - gray) * factor);
            }
        });
        Ok(())
    }

    /// Interpolates against a 3x3 smoothed copy of the frame (center weight 5, others 1).
    /// 0 gives the smoothed frame, 1 leaves it unchanged, values above 1 sharpen.
    /// The one pixel border is never modified.
    pub fn adjust_sharpness(&mut self, factor: f64) -> Result<(), FrameError> {
        check_factor("Sharpness", factor)?;
        let source = self.get_internal_data().clone();
        let (height, width, _) = source.dim();
        if height < 3 || width < 3 {
            return Ok(());
        }
        Zip::indexed(self.get_internal_data_mut()).par_for_each(|(y, x, c), value| {
            if y == 0 || x == 0 || y == height - 1 || x == width - 1 {
                return;
            }
            let mut sum = 0.0;
            for ny in (y - 1)..=(y + 1) {
                for nx in (x - 1)..=(x + 1) {
                    sum += source[(ny, nx, c)] as f64;
                }
            }
            let center = source[(y, x, c)] as f64;
            let smoothed = (sum + (SMOOTH_CENTER_WEIGHT - 1.0) * center) / SMOOTH_KERNEL_SUM;
            *value = saturate(smoothed + (center - smoothed) * factor);
        });
        Ok(())
    }

    /// Keeps only the `bits` most significant bits of every intensity.
    pub fn posterize(&mut self, bits: u8) -> Result<(), FrameError> {
        if bits > 8 {
            return Err(FrameError::BadParameters(format!(
                "Posterize bit count must be within [0, 8], got {}",
                bits
            )));
        }
        let mask = (!((1u16 << (8 - bits)) - 1)) as u8;
        Zip::from(self.get_internal_data_mut()).par_for_each(|value| *value &= mask);
        Ok(())
    }

    /// Inverts every intensity at or above `threshold`.
    pub fn solarize(&mut self, threshold: f64) {
        Zip::from(self.get_internal_data_mut()).par_for_each(|value| {
            if *value as f64 >= threshold {
                *value = 255 - *value;
            }
        });
    }

    //endregion

    //region Compositing

    /// Linear interpolation between this frame and `other`:
    /// `self * (1 - ratio) + other * ratio`. Ratios outside [0, 1] extrapolate.
    pub fn blend(&self, other: &ImageFrame, ratio: f64) -> Result<ImageFrame, FrameError> {
        if self.get_channel_layout() != other.get_channel_layout()
            || self.get_internal_data().dim() != other.get_internal_data().dim()
        {
            return Err(FrameError::BadParameters(format!(
                "Cannot blend a {:?} {} frame with a {:?} {} frame",
                self.get_internal_data().dim(),
                self.get_channel_layout(),
                other.get_internal_data().dim(),
                other.get_channel_layout()
            )));
        }
        let mut output = self.clone();
        Zip::from(output.get_internal_data_mut())
            .and(other.get_internal_data())
            .par_for_each(|value, &incoming| {
                *value = saturate(*value as f64 * (1.0 - ratio) + incoming as f64 * ratio);
            });
        Ok(output)
    }

    //endregion

    //region Internal

    fn apply_lookup_table(&mut self, lut: &[u8; 256]) {
        Zip::from(self.get_internal_data_mut()).par_for_each(|value| *value = lut[*value as usize]);
    }

    fn mean_luma(&self) -> f64 {
        let pixels = self.get_internal_data();
        let count = (pixels.len_of(Axis(0)) * pixels.len_of(Axis(1))) as f64;
        let total: f64 = match self.get_channel_layout() {
            ColorChannelLayout::GrayScale => pixels.iter().map(|&v| v as f64).sum(),
            ColorChannelLayout::RGB => pixels
                .lanes(Axis(2))
                .into_iter()
                .map(|pixel| luma(pixel[0] as f64, pixel[1] as f64, pixel[2] as f64))
                .sum(),
        };
        total / count
    }

    //endregion
}

fn rgb_to_hsv(red: f64, green: f64, blue: f64) -> (f64, f64, f64) {
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = max - min;
    let saturation = if max > 0.0 { delta / max } else { 0.0 };
    let hue = if delta == 0.0 {
        0.0
    } else if max == red {
        ((green - blue) / delta).rem_euclid(6.0) / 6.0
    } else if max == green {
        ((blue - red) / delta + 2.0) / 6.0
    } else {
        ((red - green) / delta + 4.0) / 6.0
    };
    (hue, saturation, max)
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    let sector = (hue * 6.0).floor();
    let fraction = hue * 6.0 - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));
    match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    }
}
