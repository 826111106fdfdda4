/*

A* = f(n) = g(n) + h(n)

Where:
    n = a node of the layout graph
    g(n) = accumulated route cost from the start node to n
    h(n) = straight-line distance from n to the goal node
    f(n) = priority used to pick the next node to expand

The default step cost is one per hop while h(n) is measured in world units,
so the heuristic is not admissible and the route is not guaranteed to be the
cheapest. RouteCost::Distance measures g(n) in world units as well.

*/

use crate::graph::{LayoutGraph, NodeId};
use crate::map::point_types::{Point2D, distance, points_equal};

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost charged for following one link of the layout graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteCost {
    /// Every link costs 1.
    #[default]
    Hops,
    /// Every link costs its Euclidean length.
    Distance,
}

impl RouteCost {
    fn step(&self, from: &Point2D, to: &Point2D) -> f64 {
        match self {
            RouteCost::Hops => 1.0,
            RouteCost::Distance => distance(from, to),
        }
    }
}

/// Represents the result of a route search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult<T> {
    /// The computed path from start to goal, if one was found.
    pub path: Option<Vec<T>>,
    /// The accumulated cost of the path.
    pub total_cost: Option<f64>,
    /// The number of nodes expanded during the search.
    pub nodes_explored: usize,
    /// The length of the path (number of waypoints).
    pub path_length: usize,
}

impl<T> PathResult<T> {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Vec<T>, total_cost: f64, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a failed search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path if one was found.
    pub fn into_path(self) -> Option<Vec<T>> {
        self.path
    }
}

impl<T: fmt::Debug> fmt::Display for PathResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0.0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// An ordered start-to-goal route through a layout graph.
///
/// An empty route means the goal is unreachable.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Node ids from start to goal, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Positions of `nodes`, in the same order.
    pub points: Vec<Point2D>,
}

impl Route {
    /// Returns true if no route was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of the straight-line lengths of consecutive waypoints.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
    }
}

#[derive(Copy, Clone, Debug)]
struct State {
    priority: f64,
    node: NodeId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Reversed on priority so the max-heap pops the cheapest state first.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reconstructs the path from a map of `came_from` links.
fn reconstruct_path(came_from: &HashMap<NodeId, NodeId>, mut current: NodeId) -> Vec<NodeId> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Finds a route from `start` to `goal` using unit hop costs.
///
/// # Arguments
/// * `graph` - The layout graph to search.
/// * `start` - Start node.
/// * `goal` - Goal node.
///
/// # Returns
/// * `Route` - The route, empty if the goal cannot be reached.
pub fn find_route(graph: &LayoutGraph, start: NodeId, goal: NodeId) -> Route {
    find_route_with_cost(graph, start, goal, RouteCost::Hops)
}

/// Finds a route from `start` to `goal` with the given step cost.
pub fn find_route_with_cost(
    graph: &LayoutGraph,
    start: NodeId,
    goal: NodeId,
    cost: RouteCost,
) -> Route {
    let Some(nodes) = find_route_detailed(graph, start, goal, cost).into_path() else {
        return Route::default();
    };
    let points = nodes
        .iter()
        .filter_map(|&id| graph.node(id).map(|n| n.position))
        .collect();
    Route { nodes, points }
}

/// Finds a route from `start` to `goal` with detailed results.
///
/// The open node with the lowest `score + straight-line distance to goal` is
/// expanded first. The search ends successfully as soon as an expanded node
/// sits at the goal's position.
///
/// # Arguments
/// * `graph` - The layout graph to search.
/// * `start` - Start node.
/// * `goal` - Goal node.
/// * `cost` - Step cost model.
///
/// # Returns
/// * `PathResult<NodeId>` - Detailed search result with metadata.
pub fn find_route_detailed(
    graph: &LayoutGraph,
    start: NodeId,
    goal: NodeId,
    cost: RouteCost,
) -> PathResult<NodeId> {
    let mut nodes_explored = 0;

    let (Some(start_node), Some(goal_node)) = (graph.node(start), graph.node(goal)) else {
        return PathResult::failure(nodes_explored);
    };
    let goal_position = goal_node.position;

    let mut open_set = BinaryHeap::new();
    let mut closed: HashSet<NodeId> = HashSet::new();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();

    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    g_score.insert(start, 0.0);

    open_set.push(State {
        priority: distance(&start_node.position, &goal_position),
        node: start,
    });

    while let Some(State { node: current, .. }) = open_set.pop() {
        if !closed.insert(current) {
            // Stale entry for a node that was already expanded
            continue;
        }
        nodes_explored += 1;

        let Some(current_node) = graph.node(current) else {
            continue;
        };
        let current_score = *g_score.get(&current).unwrap_or(&0.0);

        if points_equal(&current_node.position, &goal_position) {
            let path = reconstruct_path(&came_from, current);
            return PathResult::success(path, current_score, nodes_explored);
        }

        for &child in current_node.children() {
            if closed.contains(&child) {
                continue;
            }
            let Some(child_node) = graph.node(child) else {
                continue;
            };

            let tentative_score =
                current_score + cost.step(&current_node.position, &child_node.position);

            if tentative_score < *g_score.get(&child).unwrap_or(&f64::INFINITY) {
                came_from.insert(child, current);
                g_score.insert(child, tentative_score);
                open_set.push(State {
                    priority: tentative_score + distance(&child_node.position, &goal_position),
                    node: child,
                });
            }
        }
    }

    PathResult::failure(nodes_explored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::Edge;

    fn chain() -> (Vec<Point2D>, LayoutGraph) {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 1.0),
            Point2D::new(10.0, 0.0),
        ];
        let edges = vec![
            Edge::new(points[0], points[1]),
            Edge::new(points[1], points[2]),
        ];
        let graph = LayoutGraph::build(&points, &edges, points[0], points[2], 1.0).unwrap();
        (points, graph)
    }

    #[test]
    fn test_route_on_chain() {
        let (points, graph) = chain();
        let route = find_route(&graph, graph.start(), graph.goal());

        assert_eq!(route.len(), 3, "Route should visit A, B and C");
        assert_eq!(route.points, points);
        assert_eq!(route.nodes[0], graph.start());
        assert_eq!(*route.nodes.last().unwrap(), graph.goal());
    }

    #[test]
    fn test_unreachable_goal() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 1.0),
            Point2D::new(10.0, 0.0),
        ];
        let edges = vec![Edge::new(points[1], points[2])];
        let graph = LayoutGraph::build(&points, &edges, points[0], points[2], 1.0).unwrap();

        let route = find_route(&graph, graph.start(), graph.goal());
        assert!(route.is_empty(), "No link leaves the start node");

        let result = find_route_detailed(&graph, graph.start(), graph.goal(), RouteCost::Hops);
        assert!(!result.is_success());
        assert_eq!(result.path_length, 0);
        assert!(result.total_cost.is_none());
        assert_eq!(result.nodes_explored, 1);
    }

    #[test]
    fn test_start_is_goal() {
        let (_, graph) = chain();
        let route = find_route(&graph, graph.start(), graph.start());
        assert_eq!(route.nodes, vec![graph.start()]);
    }

    #[test]
    fn test_unknown_node_ids() {
        let (_, graph) = chain();
        let other = LayoutGraph::with_points(
            &(0..10).map(|i| Point2D::new(i as f64, 0.0)).collect::<Vec<_>>(),
            Point2D::new(0.0, 0.0),
            Point2D::new(9.0, 0.0),
        )
        .unwrap();

        let route = find_route(&graph, graph.start(), other.goal());
        assert!(route.is_empty());
    }

    #[test]
    fn test_distance_cost_follows_short_links() {
        // A -> E -> D has fewer hops, A -> B -> C -> D is shorter.
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.1),
            Point2D::new(2.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(1.5, 6.0),
        ];
        let mut graph = LayoutGraph::with_points(&points, points[0], points[3]).unwrap();
        let ids: Vec<NodeId> = points.iter().map(|p| graph.find(p).unwrap()).collect();
        graph.link(ids[0], ids[1]);
        graph.link(ids[1], ids[2]);
        graph.link(ids[2], ids[3]);
        graph.link(ids[0], ids[4]);
        graph.link(ids[4], ids[3]);

        let by_distance = find_route_with_cost(&graph, ids[0], ids[3], RouteCost::Distance);
        assert_eq!(by_distance.nodes, vec![ids[0], ids[1], ids[2], ids[3]]);

        let detailed = find_route_detailed(&graph, ids[0], ids[3], RouteCost::Distance);
        let cost = detailed.total_cost.unwrap();
        assert!((cost - by_distance.length()).abs() < 1e-9);

        let by_hops = find_route_detailed(&graph, ids[0], ids[3], RouteCost::Hops);
        assert!(by_hops.is_success());
        assert!(by_hops.total_cost.unwrap() <= 3.0);
    }

    #[test]
    fn test_path_result_display() {
        let (_, graph) = chain();
        let result = find_route_detailed(&graph, graph.start(), graph.goal(), RouteCost::Hops);
        assert!(result.is_success());
        assert_eq!(result.total_cost, Some(2.0));

        let display_str = format!("{}", result);
        assert!(display_str.contains("success: true"));
        assert!(display_str.contains("nodes_explored"));

        let failed: PathResult<NodeId> = PathResult::failure(4);
        assert!(format!("{}", failed).contains("success: false"));
    }
}
