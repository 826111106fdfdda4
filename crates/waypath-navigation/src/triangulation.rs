//! Bowyer–Watson Delaunay triangulation.
//!
//! Points are inserted one at a time into a triangulation seeded with a single
//! super-triangle that encloses every input point. Each insertion removes the
//! triangles whose circumcircle contains the new point, then re-fans the
//! boundary of the resulting cavity to the new point. Triangles still touching
//! a super-triangle vertex are dropped at the end, which leaves the
//! triangulation of the convex hull of the input.

#![warn(missing_docs)]

use tracing::debug;

use crate::map::point_types::{Point2D, points_equal};

/// Factor applied to the largest bounding-box side when sizing the super-triangle.
const SUPER_TRIANGLE_SCALE: f64 = 50.0;

/// Circumcircle denominators at or below this magnitude mark a degenerate triangle.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// An undirected edge between two layout points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// First endpoint.
    pub start: Point2D,
    /// Second endpoint.
    pub end: Point2D,
}

impl Edge {
    /// Creates a new edge.
    pub const fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    /// Returns true if both edges join the same pair of points, in either direction.
    pub fn same_as(&self, other: &Edge) -> bool {
        (points_equal(&self.start, &other.start) && points_equal(&self.end, &other.end))
            || (points_equal(&self.start, &other.end) && points_equal(&self.end, &other.start))
    }
}

/// A triangle of the triangulation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub a: Point2D,
    /// Second vertex.
    pub b: Point2D,
    /// Third vertex.
    pub c: Point2D,
}

impl Triangle {
    /// Creates a new triangle.
    pub const fn new(a: Point2D, b: Point2D, c: Point2D) -> Self {
        Self { a, b, c }
    }

    /// The three vertices in construction order.
    pub fn vertices(&self) -> [Point2D; 3] {
        [self.a, self.b, self.c]
    }

    /// The three edges `ab`, `bc`, `ca`.
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.c, self.a),
        ]
    }

    /// Returns true if `point` is one of the vertices.
    pub fn contains_vertex(&self, point: &Point2D) -> bool {
        self.vertices().iter().any(|v| points_equal(v, point))
    }

    /// Circumcentre and squared circumradius, or `None` for a degenerate triangle.
    pub fn circumcircle(&self) -> Option<(Point2D, f64)> {
        let (ax, ay) = (self.a.x, self.a.y);
        let (bx, by) = (self.b.x, self.b.y);
        let (cx, cy) = (self.c.x, self.c.y);

        let ab = ax * ax + ay * ay;
        let cd = bx * bx + by * by;
        let ef = cx * cx + cy * cy;

        let denom_x = ax * (cy - by) + bx * (ay - cy) + cx * (by - ay);
        let denom_y = ay * (cx - bx) + by * (ax - cx) + cy * (bx - ax);
        if denom_x.abs() <= DEGENERATE_EPSILON || denom_y.abs() <= DEGENERATE_EPSILON {
            return None;
        }

        let circum_x = (ab * (cy - by) + cd * (ay - cy) + ef * (by - ay)) / denom_x;
        let circum_y = (ab * (cx - bx) + cd * (ax - cx) + ef * (bx - ax)) / denom_y;
        let centre = Point2D::new(circum_x / 2.0, circum_y / 2.0);
        if !centre.x.is_finite() || !centre.y.is_finite() {
            return None;
        }

        let radius_sq = nalgebra::distance_squared(&self.a, &centre);
        Some((centre, radius_sq))
    }

    /// Returns true if `point` lies inside or on the circumcircle.
    ///
    /// Degenerate triangles contain nothing.
    pub fn circumcircle_contains(&self, point: &Point2D) -> bool {
        match self.circumcircle() {
            Some((centre, radius_sq)) => nalgebra::distance_squared(point, &centre) <= radius_sq,
            None => false,
        }
    }
}

/// Triangles and edges produced by [`triangulate`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangulation {
    /// Final triangles, none of which touches the super-triangle.
    pub triangles: Vec<Triangle>,
    /// Three edges per triangle; edges shared by adjacent triangles appear twice.
    pub edges: Vec<Edge>,
}

impl Triangulation {
    /// Returns true if no triangle was produced.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Edges with duplicates removed, in first-seen order.
    pub fn unique_edges(&self) -> Vec<Edge> {
        let mut unique: Vec<Edge> = Vec::with_capacity(self.edges.len() / 2 + 1);
        for edge in &self.edges {
            if !unique.iter().any(|kept| kept.same_as(edge)) {
                unique.push(*edge);
            }
        }
        unique
    }
}

fn super_triangle(points: &[Point2D]) -> Triangle {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let mut span = (max_x - min_x).max(max_y - min_y);
    if span <= 0.0 {
        span = 1.0;
    }
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;
    let reach = SUPER_TRIANGLE_SCALE * span;

    Triangle::new(
        Point2D::new(mid_x - reach, mid_y - span),
        Point2D::new(mid_x, mid_y + reach),
        Point2D::new(mid_x + reach, mid_y - span),
    )
}

/// Keeps the cavity edges that belong to exactly one removed triangle.
fn cavity_boundary(polygon: &[Edge]) -> Vec<Edge> {
    polygon
        .iter()
        .enumerate()
        .filter(|(i, edge)| {
            !polygon
                .iter()
                .enumerate()
                .any(|(j, other)| *i != j && edge.same_as(other))
        })
        .map(|(_, edge)| *edge)
        .collect()
}

/// Builds the Delaunay triangulation of `points`.
///
/// Fewer than three points yield an empty triangulation.
pub fn triangulate(points: &[Point2D]) -> Triangulation {
    if points.len() < 3 {
        return Triangulation::default();
    }

    let bounds = super_triangle(points);
    let mut triangles = vec![bounds];

    for point in points {
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(point));

        let polygon: Vec<Edge> = bad.iter().flat_map(|t| t.edges()).collect();

        triangles = good;
        triangles.extend(
            cavity_boundary(&polygon)
                .into_iter()
                .map(|edge| Triangle::new(edge.start, edge.end, *point)),
        );
    }

    let super_vertices = bounds.vertices();
    triangles.retain(|t| !super_vertices.iter().any(|v| t.contains_vertex(v)));

    let edges: Vec<Edge> = triangles.iter().flat_map(|t| t.edges()).collect();
    debug!(
        points = points.len(),
        triangles = triangles.len(),
        edges = edges.len(),
        "Delaunay triangulation finished"
    );

    Triangulation { triangles, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{IterationBudget, PoissonSampler};

    fn sample_points(seed: u64) -> Vec<Point2D> {
        PoissonSampler::new(50.0, 5.0, 30, IterationBudget::Unbounded)
            .unwrap()
            .generate(seed)
            .unwrap()
            .points
    }

    #[test]
    fn test_empty_and_single_point() {
        assert!(triangulate(&[]).is_empty());
        let single = triangulate(&[Point2D::new(1.0, 1.0)]);
        assert!(single.triangles.is_empty());
        assert!(single.edges.is_empty());
        let pair = triangulate(&[Point2D::new(1.0, 1.0), Point2D::new(4.0, 2.0)]);
        assert!(pair.is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let points = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(5.0, 8.0),
        ];
        let result = triangulate(&points);

        assert_eq!(result.triangles.len(), 1, "Three points form one triangle");
        assert_eq!(result.edges.len(), 3);
        let triangle = result.triangles[0];
        for p in &points {
            assert!(triangle.contains_vertex(p), "Missing vertex {:?}", p);
        }
        assert_eq!(result.unique_edges().len(), 3);
    }

    #[test]
    fn test_square_splits_in_two() {
        let points = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.5),
            Point2D::new(10.5, 10.0),
            Point2D::new(0.0, 9.0),
        ];
        let result = triangulate(&points);
        assert_eq!(result.triangles.len(), 2);
        assert_eq!(result.edges.len(), 6);
        assert_eq!(result.unique_edges().len(), 5, "Four sides plus one diagonal");
    }

    #[test]
    fn test_circumcircle() {
        let triangle = Triangle::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(0.0, 2.0),
        );
        let (centre, radius_sq) = triangle.circumcircle().unwrap();
        assert!((centre.x - 1.0).abs() < 1e-9);
        assert!((centre.y - 1.0).abs() < 1e-9);
        assert!((radius_sq - 2.0).abs() < 1e-9);

        assert!(triangle.circumcircle_contains(&Point2D::new(1.0, 1.5)));
        assert!(triangle.circumcircle_contains(&Point2D::new(2.0, 2.0)), "On the circle counts");
        assert!(!triangle.circumcircle_contains(&Point2D::new(3.0, 3.0)));
    }

    #[test]
    fn test_degenerate_circumcircle() {
        let collinear = Triangle::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 2.0),
        );
        assert!(collinear.circumcircle().is_none());
        assert!(!collinear.circumcircle_contains(&Point2D::new(1.0, 1.0)));

        let repeated = Triangle::new(
            Point2D::new(3.0, 3.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(5.0, 1.0),
        );
        assert!(!repeated.circumcircle_contains(&Point2D::new(4.0, 2.0)));
    }

    #[test]
    fn test_edge_equality_is_order_independent() {
        let a = Point2D::new(1.0, 2.0);
        let b = Point2D::new(3.0, 4.0);
        let c = Point2D::new(5.0, 6.0);
        assert!(Edge::new(a, b).same_as(&Edge::new(b, a)));
        assert!(Edge::new(a, b).same_as(&Edge::new(Point2D::new(1.0 + 1e-9, 2.0), b)));
        assert!(!Edge::new(a, b).same_as(&Edge::new(a, c)));
    }

    #[test]
    fn test_delaunay_property() {
        for seed in [11, 123_456_789] {
            let points = sample_points(seed);
            let result = triangulate(&points);
            assert!(!result.is_empty());

            for triangle in &result.triangles {
                let (centre, radius_sq) = triangle
                    .circumcircle()
                    .expect("Sampled points never form a degenerate triangle");
                for p in &points {
                    if triangle.contains_vertex(p) {
                        continue;
                    }
                    let d = nalgebra::distance_squared(p, &centre);
                    assert!(
                        d >= radius_sq * (1.0 - 1e-9),
                        "Point {:?} lies inside the circumcircle of {:?}",
                        p,
                        triangle
                    );
                }
            }
        }
    }

    #[test]
    fn test_edges_use_input_points() {
        let points = sample_points(3);
        let result = triangulate(&points);
        assert_eq!(result.edges.len(), result.triangles.len() * 3);
        for edge in &result.edges {
            assert!(points.iter().any(|p| points_equal(p, &edge.start)));
            assert!(points.iter().any(|p| points_equal(p, &edge.end)));
        }
    }

    #[test]
    fn test_deterministic() {
        let points = sample_points(99);
        assert_eq!(triangulate(&points), triangulate(&points));
    }
}
