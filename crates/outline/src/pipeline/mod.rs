pub mod builder;

use image::GrayImage;
use crate::{
    types::{Boundary, ComputedOutline, DrawingPolygon},
    traits::{BoundaryExtractor, CoordinateMapper, MaskBinarizer, PolygonSimplifier},
};

/// Raster-to-polygon pipeline: binarize, extract, simplify, map.
///
/// Every stage is a trait object so alternate algorithms can be swapped in
/// through [`builder::PipelineBuilder`].
pub struct Pipeline {
    binarizer: Box<dyn MaskBinarizer>,
    extractor: Box<dyn BoundaryExtractor>,
    simplifier: Box<dyn PolygonSimplifier>,
    mapper: Box<dyn CoordinateMapper>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        binarizer: Box<dyn MaskBinarizer>,
        extractor: Box<dyn BoundaryExtractor>,
        simplifier: Box<dyn PolygonSimplifier>,
        mapper: Box<dyn CoordinateMapper>,
    ) -> Self {
        Self {
            binarizer,
            extractor,
            simplifier,
            mapper,
        }
    }

    /// Binarize the image and extract its outer boundaries
    pub fn boundaries(&self, image: &GrayImage) -> Vec<Boundary> {
        let mask = self.binarizer.binarize(image);
        self.extractor
            .extract_boundaries(&mask)
            .into_iter()
            .filter(Boundary::is_traceable)
            .collect()
    }

    /// Simplify and map boundaries; those that collapse are dropped
    pub fn polygons(&self, boundaries: &[Boundary]) -> Vec<DrawingPolygon> {
        boundaries
            .iter()
            .filter_map(|boundary| self.simplifier.simplify(boundary))
            .map(|polygon| self.mapper.map(&polygon))
            .collect()
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &GrayImage) -> ComputedOutline {
        let boundaries = self.boundaries(image);
        let polygons = self.polygons(&boundaries);

        tracing::debug!(
            boundaries = boundaries.len(),
            polygons = polygons.len(),
            "traced outline"
        );

        ComputedOutline {
            polygons,
            boundary_count: boundaries.len(),
            image_width: image.width(),
            image_height: image.height(),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SimplifiedPolygon;
    use image::Luma;

    fn square_image() -> GrayImage {
        let mut img = GrayImage::new(100, 100);
        for y in 20..80 {
            for x in 20..80 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn test_square_becomes_four_vertex_polygon() {
        let outline = Pipeline::default().process(&square_image());

        assert_eq!(outline.boundary_count, 1);
        assert_eq!(outline.polygons.len(), 1);
        let mut vertices = outline.polygons[0].vertices.clone();
        vertices.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        assert_eq!(
            vertices,
            vec![[20.0, -79.0], [20.0, -20.0], [79.0, -79.0], [79.0, -20.0]]
        );
        assert_eq!(outline.image_width, 100);
        assert_eq!(outline.image_height, 100);
    }

    #[test]
    fn test_uniform_images_trace_nothing() {
        let pipeline = Pipeline::default();
        let white = GrayImage::from_pixel(32, 32, Luma([255]));
        let black = GrayImage::new(32, 32);

        assert!(pipeline.process(&white).polygons.is_empty());
        assert!(pipeline.process(&black).polygons.is_empty());
    }

    #[test]
    fn test_invert_traces_the_dark_shape() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([255]));
        for y in 10..30 {
            for x in 10..40 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let pipeline = Pipeline::builder().with_threshold(60, true).build();
        let outline = pipeline.process(&img);

        assert_eq!(outline.polygons.len(), 1);
        let mut vertices = outline.polygons[0].vertices.clone();
        vertices.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        assert_eq!(
            vertices,
            vec![[10.0, -29.0], [10.0, -10.0], [39.0, -29.0], [39.0, -10.0]]
        );
    }

    struct KeepEverything;

    impl PolygonSimplifier for KeepEverything {
        fn simplify(&self, boundary: &Boundary) -> Option<SimplifiedPolygon> {
            Some(SimplifiedPolygon::new(boundary.points.clone()))
        }
    }

    #[test]
    fn test_custom_simplifier() {
        let pipeline = Pipeline::builder().set_simplifier(KeepEverything).build();
        let outline = pipeline.process(&square_image());

        assert_eq!(outline.polygons.len(), 1);
        assert!(outline.polygons[0].len() > 4);
    }
}
