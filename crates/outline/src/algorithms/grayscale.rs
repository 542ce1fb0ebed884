use image::{DynamicImage, GrayImage, Luma};

/// Reduce any decoded image to 8-bit luma with BT.601 weights.
///
/// Alpha is dropped and the colour channels are weighted 0.299 / 0.587 /
/// 0.114 in 14-bit fixed point, the usual weighting for camera and scanner
/// input. Gray inputs come back unchanged.
pub fn to_luma_bt601(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([bt601(r, g, b)])
    })
}

fn bt601(r: u8, g: u8, b: u8) -> u8 {
    const SHIFT: u32 = 14;
    let weighted = u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868;
    // weights sum to 1 << SHIFT, so the result never exceeds 255
    ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::ThresholdBinarizer, traits::MaskBinarizer};
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_gray_levels_are_preserved() {
        for v in 0..=255u8 {
            assert_eq!(bt601(v, v, v), v);
        }
    }

    #[test]
    fn test_channel_weights() {
        assert_eq!(bt601(0, 200, 0), 117);
        assert_eq!(bt601(255, 0, 0), 76);
        assert_eq!(bt601(0, 0, 255), 29);
    }

    #[test]
    fn test_green_near_threshold_is_background() {
        // 143 with Rec.709 weights would sit above level 128
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 200, 0])));
        let gray = to_luma_bt601(&image);
        assert_eq!(gray.get_pixel(0, 0)[0], 117);

        let binarizer = ThresholdBinarizer::new(50, false);
        assert_eq!(binarizer.level(), 128);
        assert!(binarizer.binarize(&gray).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_alpha_is_ignored() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0])));
        assert_eq!(to_luma_bt601(&image).get_pixel(1, 1)[0], 255);
    }
}
