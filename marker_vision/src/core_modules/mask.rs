// THEORY:
// The `mask` module is the segmentation layer. It turns a color frame into the binary
// image that contour extraction runs on, in two stages:
//
// 1.  **Color Gating**: every pixel is converted to HSV and tested against the marker
//     `ColorRange`. Pixels outside the range are blacked out; pixels inside keep their
//     brightness, reduced to a single luma channel.
// 2.  **Adaptive Thresholding**: the luma image is binarized against a Gaussian-weighted
//     local mean instead of one global cut-off. A marker pixel only survives if it is
//     not noticeably darker than its neighborhood, which compensates for uneven lighting
//     across the capture square. Blacked-out pixels never become foreground.
//
// Both stages are stateless and work on one frame at a time.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::Hsv;
use crate::error::{VisionError, VisionResult};
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Inclusive HSV bounds that define the marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl Default for ColorRange {
    /// Dark magenta to light magenta.
    fn default() -> Self {
        Self {
            lower: Hsv::new(139, 96, 129),
            upper: Hsv::new(169, 225, 225),
        }
    }
}

impl ColorRange {
    pub fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.hue..=self.upper.hue).contains(&hsv.hue)
            && (self.lower.saturation..=self.upper.saturation).contains(&hsv.saturation)
            && (self.lower.value..=self.upper.value).contains(&hsv.value)
    }

    pub fn validate(&self) -> VisionResult<()> {
        if self.lower.hue > self.upper.hue
            || self.lower.saturation > self.upper.saturation
            || self.lower.value > self.upper.value
        {
            return Err(VisionError::config(format!(
                "color range lower bound {:?} exceeds upper bound {:?}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Parameters of the local threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveThreshold {
    /// Side of the square neighborhood, in pixels. Odd, at least 3.
    pub block_size: u32,
    /// Subtracted from the local mean before comparing.
    pub offset: i32,
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            block_size: 15,
            offset: 1,
        }
    }
}

impl AdaptiveThreshold {
    pub fn validate(&self) -> VisionResult<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(VisionError::config(format!(
                "threshold block size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Normalized 1D Gaussian weights for the block, sigma derived from its size.
    fn kernel(&self) -> Vec<f32> {
        let sigma = 0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
        let radius = (self.block_size / 2) as i32;
        let weights: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
            .collect();
        let total: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }
}

/// Blacks out everything outside `range` and reduces the rest to luma.
pub fn masked_intensity(frame: &Frame, range: &ColorRange) -> GrayImage {
    let raw: Vec<u8> = frame
        .pixels()
        .map(|pixel| if range.contains(pixel.hsv()) { pixel.luma() } else { 0 })
        .collect();
    GrayImage::from_raw(frame.width(), frame.height(), raw).unwrap_or_default()
}

/// Binarizes `intensity` against its Gaussian-weighted local mean.
///
/// A pixel becomes `FOREGROUND` when it is non-zero and brighter than
/// `mean - offset`; everything else is `BACKGROUND`. Borders replicate the edge pixels.
pub fn adaptive_threshold(intensity: &GrayImage, params: &AdaptiveThreshold) -> GrayImage {
    let (width, height) = intensity.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let kernel = params.kernel();
    let radius = (kernel.len() / 2) as i64;
    let w = width as usize;
    let h = height as usize;
    let source = intensity.as_raw();

    // Horizontal pass.
    let mut horizontal = vec![0f32; w * h];
    for y in 0..h {
        let row = &source[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as i64 + k as i64 - radius).clamp(0, w as i64 - 1) as usize;
                acc += row[sx] as f32 * weight;
            }
            horizontal[y * w + x] = acc;
        }
    }

    // Vertical pass, then compare.
    let mut binary = GrayImage::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let value = source[y * w + x];
            if value == 0 {
                continue;
            }
            let mut mean = 0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as i64 + k as i64 - radius).clamp(0, h as i64 - 1) as usize;
                mean += horizontal[sy * w + x] * weight;
            }
            let mean = mean.round() as i32;
            if value as i32 > mean - params.offset {
                binary.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
            }
        }
    }
    binary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const MARKER: Rgba<u8> = Rgba([200, 60, 200, 255]);

    #[test]
    fn default_range_accepts_the_marker_and_rejects_grays() {
        let range = ColorRange::default();
        assert!(range.contains(Hsv::new(150, 179, 200)));
        assert!(!range.contains(Hsv::new(0, 0, 200)));
        assert!(range.contains(range.lower));
        assert!(range.contains(range.upper));
    }

    #[test]
    fn inverted_range_fails_validation() {
        let range = ColorRange::new(Hsv::new(170, 0, 0), Hsv::new(10, 255, 255));
        assert!(matches!(range.validate(), Err(VisionError::Config { .. })));
    }

    #[test]
    fn even_block_sizes_fail_validation() {
        let params = AdaptiveThreshold {
            block_size: 14,
            offset: 1,
        };
        assert!(params.validate().is_err());
        assert!(AdaptiveThreshold::default().validate().is_ok());
    }

    #[test]
    fn masking_keeps_only_marker_luma() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([128, 128, 128, 255]));
        image.put_pixel(1, 0, MARKER);
        let gray = masked_intensity(&Frame::from_rgba_image(image), &ColorRange::default());
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 0).0, [118]);
    }

    #[test]
    fn uniform_marker_area_is_fully_foreground() {
        let gray = GrayImage::from_pixel(20, 20, Luma([118]));
        let binary = adaptive_threshold(&gray, &AdaptiveThreshold::default());
        assert!(binary.pixels().all(|p| p.0 == [FOREGROUND]));
    }

    #[test]
    fn black_pixels_never_become_foreground() {
        let gray = GrayImage::new(20, 20);
        let binary = adaptive_threshold(&gray, &AdaptiveThreshold::default());
        assert!(binary.pixels().all(|p| p.0 == [BACKGROUND]));
    }

    #[test]
    fn dim_pixel_in_bright_neighborhood_is_dropped() {
        let mut gray = GrayImage::from_pixel(15, 15, Luma([200]));
        gray.put_pixel(7, 7, Luma([100]));
        let binary = adaptive_threshold(&gray, &AdaptiveThreshold::default());
        assert_eq!(binary.get_pixel(7, 7).0, [BACKGROUND]);
        assert_eq!(binary.get_pixel(0, 0).0, [FOREGROUND]);
    }
}
