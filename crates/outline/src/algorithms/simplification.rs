use geo_types::{Coord, LineString};
use crate::{
    traits::PolygonSimplifier,
    types::{Boundary, SimplifiedPolygon},
};

/// Tolerance as a fraction of the boundary perimeter
pub const DEFAULT_TOLERANCE_RATIO: f64 = 0.002;

/// Douglas-Peucker over a closed point cycle, with a perimeter-relative tolerance.
///
/// The cycle is cut at two anchor points that always survive reduction: the
/// lexicographically smallest point, and the point farthest from it. Each arc
/// between them is reduced with geo's Douglas-Peucker. Both anchors are
/// chosen by point value rather than position, so a reduced polygon picks the
/// same anchors again and re-simplifying it with the same tolerance is a no-op.
#[derive(Debug, Clone)]
pub struct ClosedDouglasPeuckerSimplifier {
    pub tolerance_ratio: f64,
}

impl Default for ClosedDouglasPeuckerSimplifier {
    fn default() -> Self {
        Self { tolerance_ratio: DEFAULT_TOLERANCE_RATIO }
    }
}

impl ClosedDouglasPeuckerSimplifier {
    /// Tolerance used for a given boundary
    pub fn tolerance_for(&self, boundary: &Boundary) -> f64 {
        self.tolerance_ratio * boundary.perimeter()
    }
}

impl PolygonSimplifier for ClosedDouglasPeuckerSimplifier {
    fn simplify(&self, boundary: &Boundary) -> Option<SimplifiedPolygon> {
        if !boundary.is_traceable() {
            return None;
        }
        let epsilon = self.tolerance_for(boundary);
        let points = simplify_closed(&boundary.points, epsilon);
        (points.len() >= 2).then(|| SimplifiedPolygon::new(points))
    }
}

/// Reduce a closed cycle of points with a fixed tolerance.
///
/// The result is a subset of `points` in cycle order, starting at the
/// smallest point.
pub fn simplify_closed(points: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let start = (0..points.len()).min_by_key(|&index| points[index]).unwrap_or(0);
    let split = farthest_from(points, start);
    if points[split] == points[start] {
        return vec![points[start]];
    }

    let mut reduced = reduce_arc(&arc(points, start, split), epsilon);
    // split opens the second arc
    reduced.pop();
    let mut closing = reduce_arc(&arc(points, split, start), epsilon);
    // start is already the first vertex
    closing.pop();
    reduced.extend(closing);
    reduced
}

/// Index of the point farthest from `points[from]`; ties go to the smaller point
fn farthest_from(points: &[[i32; 2]], from: usize) -> usize {
    let [ox, oy] = points[from];
    let squared_distance = |[x, y]: [i32; 2]| {
        let dx = i64::from(x - ox);
        let dy = i64::from(y - oy);
        dx * dx + dy * dy
    };
    (0..points.len())
        .max_by(|&a, &b| {
            squared_distance(points[a])
                .cmp(&squared_distance(points[b]))
                .then_with(|| points[b].cmp(&points[a]))
        })
        .unwrap_or(from)
}

/// Points from `from` to `to` inclusive, walking forward and wrapping around
fn arc(points: &[[i32; 2]], from: usize, to: usize) -> Vec<[i32; 2]> {
    let len = points.len();
    let steps = (to + len - from) % len;
    (0..=steps).map(|offset| points[(from + offset) % len]).collect()
}

fn reduce_arc(arc: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    use geo::SimplifyIdx;

    let coords: Vec<Coord<f64>> = arc
        .iter()
        .map(|&[x, y]| Coord { x: f64::from(x), y: f64::from(y) })
        .collect();
    LineString::new(coords)
        .simplify_idx(&epsilon)
        .into_iter()
        .map(|index| arc[index])
        .collect()
}
