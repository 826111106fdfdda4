use nalgebra::Point2;

/// A point in layout coordinates (world units).
pub type Point2D = Point2<f64>;

/// Absolute per-axis tolerance used when two layout points are compared.
pub const POINT_EPSILON: f64 = 1e-6;

/// Returns true if `a` and `b` are the same point within [`POINT_EPSILON`].
pub fn points_equal(a: &Point2D, b: &Point2D) -> bool {
    (a.x - b.x).abs() <= POINT_EPSILON && (a.y - b.y).abs() <= POINT_EPSILON
}

/// Straight-line distance between two layout points.
pub fn distance(a: &Point2D, b: &Point2D) -> f64 {
    nalgebra::distance(a, b)
}

/// Represents a cell in the sample grid (cell indices).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}
