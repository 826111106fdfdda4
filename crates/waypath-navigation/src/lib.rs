//! Procedural traversal layouts for game levels.
//!
//! The pipeline runs in four stages, each consuming the previous one:
//!
//! 1. [`sampling`] scatters Poisson-disk samples over a square region.
//! 2. [`triangulation`] connects them with a Bowyer–Watson Delaunay triangulation.
//! 3. [`graph`] turns the triangulation edges into a forward-directed graph.
//! 4. [`astar`] searches that graph for a route from the start to the goal.
//!
//! [`generator::LayoutGenerator`] drives all four for one [`generator::LayoutConfig`].

pub mod astar;
pub mod error;
pub mod generator;
pub mod graph;
pub mod map;
pub mod sampling;
pub mod triangulation;

pub use astar::{PathResult, Route, RouteCost, find_route, find_route_detailed};
pub use error::NavigationError;
pub use generator::{GeneratedLayout, LayoutConfig, LayoutGenerator};
pub use graph::{GraphNode, LayoutGraph, NodeId};
pub use map::Point2D;
pub use sampling::{IterationBudget, PoissonSampler, SampleSet};
pub use triangulation::{Edge, Triangle, Triangulation, triangulate};
