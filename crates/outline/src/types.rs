use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// Boundaries shorter than this never reach the simplifier.
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// Ordered pixel coordinates walking the outer edge of one foreground region.
///
/// The loop is closed implicitly: the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub points: Vec<[i32; 2]>,
}

impl Boundary {
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the boundary has enough points to describe an area
    pub fn is_traceable(&self) -> bool {
        self.points.len() >= MIN_BOUNDARY_POINTS
    }

    /// Closed ring as a geo line string (first point repeated at the end)
    pub fn to_closed_line_string(&self) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord { x: f64::from(x), y: f64::from(y) })
            .collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }

    /// Sum of edge lengths, including the edge from the last point back to the first
    pub fn perimeter(&self) -> f64 {
        use geo::EuclideanLength;
        self.to_closed_line_string().euclidean_length()
    }
}

/// A boundary reduced to the vertices needed to stay within tolerance.
///
/// Every point is taken from the source [`Boundary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedPolygon {
    pub points: Vec<[i32; 2]>,
}

impl SimplifiedPolygon {
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three vertices encloses no area
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }
}

impl From<SimplifiedPolygon> for Boundary {
    fn from(polygon: SimplifiedPolygon) -> Self {
        Boundary::new(polygon.points)
    }
}

/// Polygon vertices in drawing space (Y axis pointing up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingPolygon {
    pub vertices: Vec<[f64; 2]>,
}

impl DrawingPolygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedOutline {
    /// Simplified, Y-flipped polygons ready for encoding
    pub polygons: Vec<DrawingPolygon>,
    /// Number of external boundaries found before simplification
    pub boundary_count: usize,
    /// Source image dimensions
    pub image_width: u32,
    pub image_height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perimeter_includes_closing_edge() {
        let boundary = Boundary::new(vec![[0, 0], [3, 0], [3, 4]]);
        // 3 + 4 + 5 (closing hypotenuse)
        assert!((boundary.perimeter() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_needs_three_points() {
        assert!(!Boundary::new(vec![[0, 0], [1, 0]]).is_traceable());
        assert!(Boundary::new(vec![[0, 0], [1, 0], [1, 1]]).is_traceable());
    }

    #[test]
    fn test_degenerate_polygon() {
        assert!(SimplifiedPolygon::new(vec![[0, 0], [5, 5]]).is_degenerate());
        assert!(!SimplifiedPolygon::new(vec![[0, 0], [5, 0], [5, 5]]).is_degenerate());
    }
}
