//! Point types and spatial grids for layout generation.
//!
//! This module provides the layout point type, tolerant point comparison and
//! the acceleration grid used by the Poisson-disk sampler.

pub mod point_types;
pub mod sample_grid;

pub use point_types::{GridPoint, Point2D, distance, points_equal};
pub use sample_grid::SampleGrid;
