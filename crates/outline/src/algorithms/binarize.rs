use image::GrayImage;
use crate::traits::MaskBinarizer;

/// Threshold used when none is requested, as a percentage of full scale
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 60;

/// Global threshold binarizer.
///
/// The percentage is quantized to an 8-bit level `L = round(t / 100 * 255)`.
/// Without `invert` a pixel is foreground iff `value > L`; with `invert`
/// iff `value <= L`, so the two masks are exact complements.
#[derive(Debug, Clone)]
pub struct ThresholdBinarizer {
    pub threshold_percent: u8,
    pub invert: bool,
}

impl ThresholdBinarizer {
    pub fn new(threshold_percent: u8, invert: bool) -> Self {
        Self { threshold_percent, invert }
    }

    /// Quantized 8-bit level; percentages above 100 are clamped
    pub fn level(&self) -> u8 {
        let percent = f64::from(self.threshold_percent.min(100));
        (percent / 100.0 * 255.0).round() as u8
    }
}

impl Default for ThresholdBinarizer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT, false)
    }
}

impl MaskBinarizer for ThresholdBinarizer {
    fn binarize(&self, image: &GrayImage) -> GrayImage {
        let mut mask = imageproc::contrast::threshold(image, self.level());
        if self.invert {
            image::imageops::invert(&mut mask);
        }
        mask
    }
}
