use image::GrayImage;
use crate::types::{Boundary, DrawingPolygon, SimplifiedPolygon};

/// Trait for turning a grayscale image into a two-level mask
pub trait MaskBinarizer: Send + Sync {
    /// Foreground pixels are 255, background pixels are 0
    fn binarize(&self, image: &GrayImage) -> GrayImage;
}

/// Trait for boundary extraction algorithms
pub trait BoundaryExtractor: Send + Sync {
    /// Extract the outer boundaries of foreground regions in a binary mask
    fn extract_boundaries(&self, mask: &GrayImage) -> Vec<Boundary>;
}

/// Trait for polygon reduction algorithms
pub trait PolygonSimplifier: Send + Sync {
    /// Reduce a boundary to a polygon, or `None` when too little survives
    fn simplify(&self, boundary: &Boundary) -> Option<SimplifiedPolygon>;
}

/// Trait for moving polygons from pixel space into drawing space
pub trait CoordinateMapper: Send + Sync {
    fn map(&self, polygon: &SimplifiedPolygon) -> DrawingPolygon;
}
