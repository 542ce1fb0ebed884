use crate::{
    traits::CoordinateMapper,
    types::{DrawingPolygon, SimplifiedPolygon},
};

/// Raster to drawing space: `(x, y) -> (x, -y)`.
///
/// No scaling is applied; coordinates stay in pixel units whatever the
/// document unit is.
#[derive(Debug, Clone, Default)]
pub struct FlipYMapper;

impl CoordinateMapper for FlipYMapper {
    fn map(&self, polygon: &SimplifiedPolygon) -> DrawingPolygon {
        let vertices = polygon
            .points
            .iter()
            // adding 0.0 turns -0.0 into 0.0
            .map(|&[x, y]| [f64::from(x), -f64::from(y) + 0.0])
            .collect();
        DrawingPolygon::new(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flips_y_without_scaling() {
        let polygon = SimplifiedPolygon::new(vec![[0, 0], [12, 0], [12, 7]]);
        let mapped = FlipYMapper.map(&polygon);
        assert_eq!(mapped.vertices, vec![[0.0, 0.0], [12.0, 0.0], [12.0, -7.0]]);
        assert!(mapped.vertices[0][1].is_sign_positive());
    }
}
