//! One-shot layout generation: sample, triangulate, build the graph, route.

#![warn(missing_docs)]

use std::sync::atomic::AtomicBool;

use tracing::{debug, info};

use crate::astar::{Route, RouteCost, find_route_with_cost};
use crate::error::NavigationError;
use crate::graph::LayoutGraph;
use crate::map::point_types::Point2D;
use crate::sampling::{IterationBudget, PoissonSampler, SampleSet};
use crate::triangulation::{Triangulation, triangulate};

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Seed of the random stream; the same seed reproduces the same layout.
    pub seed: u64,
    /// Side length of the square sampling region.
    pub extent: f64,
    /// Minimum distance between two samples.
    pub min_radius: f64,
    /// Candidates tried around each active sample.
    pub attempts_per_point: u32,
    /// Sampling budget; negative or `>= i32::MAX` means unbounded.
    pub max_iterations: i64,
    /// Forward progress a link must exceed; `min_radius / 3` when unset.
    pub min_advance: Option<f64>,
    /// Distance of start and goal outside the region; `min_radius` when unset.
    pub endpoint_margin: Option<f64>,
    /// Step cost used by the route search.
    pub route_cost: RouteCost,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 123_456_789,
            extent: 50.0,
            min_radius: 5.0,
            attempts_per_point: 1,
            max_iterations: 50_000,
            min_advance: None,
            endpoint_margin: None,
            route_cost: RouteCost::Hops,
        }
    }
}

impl LayoutConfig {
    /// Forward progress threshold for graph links.
    pub fn effective_min_advance(&self) -> f64 {
        self.min_advance.unwrap_or(self.min_radius / 3.0)
    }

    /// Distance of the start and goal points from the region.
    pub fn effective_endpoint_margin(&self) -> f64 {
        self.endpoint_margin.unwrap_or(self.min_radius)
    }

    /// Start point, left of the region at mid height.
    pub fn start_point(&self) -> Point2D {
        Point2D::new(-self.effective_endpoint_margin(), self.extent / 2.0)
    }

    /// Goal point, right of the region at mid height.
    pub fn goal_point(&self) -> Point2D {
        Point2D::new(
            self.extent + self.effective_endpoint_margin(),
            self.extent / 2.0,
        )
    }

    /// Checks every parameter.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(NavigationError::InvalidParameter(
                "region extent must be positive and finite",
            ));
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(NavigationError::InvalidParameter(
                "minimum radius must be positive and finite",
            ));
        }
        if self.attempts_per_point == 0 {
            return Err(NavigationError::InvalidParameter(
                "at least one attempt per point is required",
            ));
        }
        let advance = self.effective_min_advance();
        if !advance.is_finite() || advance < 0.0 {
            return Err(NavigationError::InvalidParameter(
                "minimum advance must be finite and non-negative",
            ));
        }
        let margin = self.effective_endpoint_margin();
        if !margin.is_finite() || margin <= 0.0 {
            return Err(NavigationError::InvalidParameter(
                "endpoint margin must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Everything produced by one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedLayout {
    /// Samples followed by the start and goal points.
    pub points: Vec<Point2D>,
    /// Delaunay triangulation of `points`.
    pub triangulation: Triangulation,
    /// Forward-directed graph, with the route recorded on its nodes.
    pub graph: LayoutGraph,
    /// Route from start to goal; empty if the goal is unreachable.
    pub route: Route,
    /// Active picks performed by the sampler.
    pub iterations: u64,
    /// Accepted sample pairs closer than the minimum radius.
    pub spacing_violations: usize,
}

impl GeneratedLayout {
    /// Route waypoints from start to goal.
    pub fn route_points(&self) -> &[Point2D] {
        &self.route.points
    }
}

/// Runs the full layout pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct LayoutGenerator {
    config: LayoutConfig,
    sampler: PoissonSampler,
}

impl LayoutGenerator {
    /// Creates a generator, validating `config`.
    pub fn new(config: LayoutConfig) -> Result<Self, NavigationError> {
        config.validate()?;
        let sampler = PoissonSampler::new(
            config.extent,
            config.min_radius,
            config.attempts_per_point,
            IterationBudget::from_configured(config.max_iterations),
        )?;
        Ok(Self { config, sampler })
    }

    /// The configuration this generator runs with.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Generates a layout from scratch.
    pub fn generate(&self) -> Result<GeneratedLayout, NavigationError> {
        let samples = self.sampler.generate(self.config.seed)?;
        self.finish(samples)
    }

    /// Generates a layout, aborting sampling once `cancel` is raised.
    pub fn generate_with_cancel(
        &self,
        cancel: &AtomicBool,
    ) -> Result<GeneratedLayout, NavigationError> {
        let samples = self.sampler.generate_with_cancel(self.config.seed, cancel)?;
        self.finish(samples)
    }

    fn finish(&self, samples: SampleSet) -> Result<GeneratedLayout, NavigationError> {
        let SampleSet {
            mut points,
            iterations,
            spacing_violations,
            ..
        } = samples;

        let start = self.config.start_point();
        let goal = self.config.goal_point();
        points.push(start);
        points.push(goal);

        let triangulation = triangulate(&points);
        let mut graph = LayoutGraph::build(
            &points,
            &triangulation.edges,
            start,
            goal,
            self.config.effective_min_advance(),
        )?;

        let route = find_route_with_cost(&graph, graph.start(), graph.goal(), self.config.route_cost);
        graph.record_route(&route.nodes);

        if route.is_empty() {
            info!(seed = self.config.seed, "No route from start to goal");
        } else {
            debug!(waypoints = route.len(), length = route.length(), "Route found");
        }

        info!(
            seed = self.config.seed,
            points = points.len(),
            triangles = triangulation.triangles.len(),
            links = graph.edge_count(),
            waypoints = route.len(),
            "Layout generated"
        );

        Ok(GeneratedLayout {
            points,
            triangulation,
            graph,
            route,
            iterations,
            spacing_violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::point_types::points_equal;

    fn default_layout() -> GeneratedLayout {
        LayoutGenerator::new(LayoutConfig::default())
            .unwrap()
            .generate()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.seed, 123_456_789);
        assert_eq!(config.extent, 50.0);
        assert_eq!(config.min_radius, 5.0);
        assert_eq!(config.attempts_per_point, 1);
        assert_eq!(config.max_iterations, 50_000);
        assert!((config.effective_min_advance() - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(config.start_point(), Point2D::new(-5.0, 25.0));
        assert_eq!(config.goal_point(), Point2D::new(55.0, 25.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = LayoutConfig {
            min_radius: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            LayoutGenerator::new(config),
            Err(NavigationError::InvalidParameter(_))
        ));

        let config = LayoutConfig {
            min_advance: Some(-2.0),
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig {
            endpoint_margin: Some(0.0),
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let layout = default_layout();

        // centre sample plus start and goal at minimum
        assert!(layout.points.len() > 3);
        assert_eq!(layout.spacing_violations, 0);
        assert!(!layout.triangulation.is_empty());

        for edge in &layout.triangulation.edges {
            assert!(layout.points.iter().any(|p| points_equal(p, &edge.start)));
            assert!(layout.points.iter().any(|p| points_equal(p, &edge.end)));
        }

        assert!(!layout.route.is_empty(), "Start and goal should be connected");
        let route = layout.route_points();
        assert_eq!(route[0], LayoutConfig::default().start_point());
        assert_eq!(*route.last().unwrap(), LayoutConfig::default().goal_point());
        for pair in route.windows(2) {
            assert!(pair[1].x > pair[0].x, "Route must move forward along x");
        }
    }

    #[test]
    fn test_delaunay_property_with_endpoints() {
        for attempts in [1, 30] {
            let config = LayoutConfig {
                attempts_per_point: attempts,
                ..LayoutConfig::default()
            };
            let layout = LayoutGenerator::new(config).unwrap().generate().unwrap();
            assert!(!layout.triangulation.is_empty());

            for triangle in &layout.triangulation.triangles {
                let (centre, radius_sq) = triangle
                    .circumcircle()
                    .expect("Final triangles should not be degenerate");
                for point in &layout.points {
                    if triangle.contains_vertex(point) {
                        continue;
                    }
                    let d = nalgebra::distance_squared(point, &centre);
                    assert!(
                        d >= radius_sq * (1.0 - 1e-9),
                        "Point {:?} lies strictly inside the circumcircle of {:?}",
                        point,
                        triangle
                    );
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = default_layout();
        let second = default_layout();

        assert_eq!(first.points, second.points);
        assert_eq!(first.triangulation, second.triangulation);
        assert_eq!(first.graph, second.graph);
        assert_eq!(first.route, second.route);
    }

    #[test]
    fn test_different_seed_changes_layout() {
        let config = LayoutConfig {
            seed: 7,
            ..LayoutConfig::default()
        };
        let other = LayoutGenerator::new(config).unwrap().generate().unwrap();
        assert_ne!(other.points, default_layout().points);
    }

    #[test]
    fn test_route_recorded_on_graph() {
        let layout = default_layout();
        for (hops, &id) in layout.route.nodes.iter().enumerate() {
            let node = layout.graph.node(id).unwrap();
            assert_eq!(node.score() as usize, hops);
        }
    }

    #[test]
    fn test_distance_cost_route() {
        let config = LayoutConfig {
            route_cost: RouteCost::Distance,
            attempts_per_point: 30,
            ..LayoutConfig::default()
        };
        let layout = LayoutGenerator::new(config).unwrap().generate().unwrap();
        assert!(!layout.route.is_empty());
        assert_eq!(layout.route.nodes[0], layout.graph.start());
    }

    #[test]
    fn test_cancelled_generation() {
        let generator = LayoutGenerator::new(LayoutConfig::default()).unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(
            generator.generate_with_cancel(&cancel).unwrap_err(),
            NavigationError::Cancelled
        );
    }
}
