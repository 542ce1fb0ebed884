use image::GrayImage;
use imageproc::contours::BorderType;
use crate::{traits::BoundaryExtractor, types::Boundary};

/// Border-following extractor that keeps only outermost boundaries.
///
/// Holes and regions nested inside holes are ignored. A uniform mask has no
/// foreground/background edge and yields nothing, even when every pixel is
/// foreground. Regions touching the image edge are traced along the edge.
#[derive(Debug, Clone, Default)]
pub struct ExternalBoundaryExtractor;

impl BoundaryExtractor for ExternalBoundaryExtractor {
    fn extract_boundaries(&self, mask: &GrayImage) -> Vec<Boundary> {
        if is_uniform(mask) {
            return Vec::new();
        }

        // Border following mislabels a region that contains the first pixel,
        // so trace inside a one pixel background frame and shift back.
        imageproc::contours::find_contours::<i32>(&with_background_frame(mask))
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .map(|contour| {
                Boundary::new(contour.points.iter().map(|p| [p.x - 1, p.y - 1]).collect())
            })
            .filter(Boundary::is_traceable)
            .collect()
    }
}

fn with_background_frame(mask: &GrayImage) -> GrayImage {
    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut framed, mask, 1, 1);
    framed
}

fn is_uniform(mask: &GrayImage) -> bool {
    let mut pixels = mask.pixels().map(|p| p[0] != 0);
    match pixels.next() {
        Some(first) => pixels.all(|foreground| foreground == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(img: &mut GrayImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>, value: u8) {
        for y in ys {
            for x in xs.clone() {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_uniform_masks_have_no_boundaries() {
        let black = GrayImage::new(20, 20);
        let white = GrayImage::from_pixel(20, 20, Luma([255]));
        assert!(ExternalBoundaryExtractor.extract_boundaries(&black).is_empty());
        assert!(ExternalBoundaryExtractor.extract_boundaries(&white).is_empty());
    }

    #[test]
    fn test_square_has_one_boundary() {
        let mut img = GrayImage::new(40, 40);
        fill(&mut img, 10..30, 10..30, 255);

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 1);
        let points = &boundaries[0].points;
        for corner in [[10, 10], [29, 10], [29, 29], [10, 29]] {
            assert!(points.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_holes_and_nested_regions_are_ignored() {
        // Ring with a filled island inside its hole
        let mut img = GrayImage::new(60, 60);
        fill(&mut img, 5..55, 5..55, 255);
        fill(&mut img, 15..45, 15..45, 0);
        fill(&mut img, 25..35, 25..35, 255);

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 1);
        assert!(boundaries[0].points.contains(&[5, 5]));
    }

    #[test]
    fn test_separate_regions_each_get_a_boundary() {
        let mut img = GrayImage::new(50, 20);
        fill(&mut img, 2..10, 2..10, 255);
        fill(&mut img, 20..30, 5..15, 255);

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 2);
    }

    #[test]
    fn test_tiny_regions_are_dropped() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(5, 5, Luma([255]));

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert!(boundaries.iter().all(Boundary::is_traceable));
        assert!(boundaries.is_empty());
    }

    #[test]
    fn test_region_at_the_origin_is_traced() {
        let mut img = GrayImage::new(50, 50);
        fill(&mut img, 0..20, 0..20, 255);

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 1);
        for corner in [[0, 0], [19, 0], [19, 19], [0, 19]] {
            assert!(boundaries[0].points.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_region_along_an_edge_is_traced() {
        let mut img = GrayImage::new(50, 50);
        fill(&mut img, 0..20, 10..30, 255);

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 1);
        assert!(boundaries[0].points.contains(&[0, 10]));
        assert!(boundaries[0].points.contains(&[19, 29]));
    }

    #[test]
    fn test_foreground_with_a_speck_traces_the_frame() {
        let mut img = GrayImage::from_pixel(30, 30, Luma([255]));
        img.put_pixel(12, 17, Luma([0]));

        let boundaries = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(boundaries.len(), 1);
        for corner in [[0, 0], [29, 0], [29, 29], [0, 29]] {
            assert!(boundaries[0].points.contains(&corner), "missing corner {corner:?}");
        }
        assert!(boundaries[0].points.iter().all(|&[x, y]| (0..30).contains(&x) && (0..30).contains(&y)));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut img = GrayImage::new(50, 50);
        fill(&mut img, 2..10, 2..10, 255);
        fill(&mut img, 20..40, 25..45, 255);

        let first = ExternalBoundaryExtractor.extract_boundaries(&img);
        let second = ExternalBoundaryExtractor.extract_boundaries(&img);
        assert_eq!(first, second);
    }
}
