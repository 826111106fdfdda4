//! Forward-directed adjacency graph over a triangulated point set.
//!
//! Every point becomes a node in a single arena. A triangulation edge between
//! `N` and `M` becomes the link `N → M` only when `M` lies more than
//! `min_advance` further along +x than `N`, so every link makes progress
//! toward the goal side of the region and the graph cannot contain cycles.
//! Links are [`NodeId`] indices into the arena.

#![warn(missing_docs)]

use std::fmt;

use tracing::debug;

use crate::error::NavigationError;
use crate::map::point_types::{Point2D, points_equal};
use crate::triangulation::Edge;

/// Index of a node in a [`LayoutGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the layout graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    /// Layout position of the node.
    pub position: Point2D,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    score: u32,
}

impl GraphNode {
    fn new(position: Point2D) -> Self {
        Self {
            position,
            children: Vec::new(),
            parent: None,
            score: 0,
        }
    }

    /// Nodes reachable from this one in a single forward step, in link order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Most recent node that linked to this one, or the predecessor on the
    /// recorded route once [`LayoutGraph::record_route`] ran.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Hop count from the start along the recorded route, 0 otherwise.
    pub fn score(&self) -> u32 {
        self.score
    }
}

/// Arena of [`GraphNode`]s with designated start and goal nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutGraph {
    nodes: Vec<GraphNode>,
    start: NodeId,
    goal: NodeId,
}

impl LayoutGraph {
    /// Creates one unlinked node per point.
    ///
    /// # Arguments
    /// * `points` - Node positions, in arena order
    /// * `start` - Position of the start node; must be one of `points`
    /// * `goal` - Position of the goal node; must be one of `points`
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The graph, or `MissingEndpoint` if start or goal is not a point
    pub fn with_points(
        points: &[Point2D],
        start: Point2D,
        goal: Point2D,
    ) -> Result<Self, NavigationError> {
        let nodes: Vec<GraphNode> = points.iter().copied().map(GraphNode::new).collect();

        let start = find_in(&nodes, &start)
            .ok_or(NavigationError::MissingEndpoint("start point is not part of the point set"))?;
        let goal = find_in(&nodes, &goal)
            .ok_or(NavigationError::MissingEndpoint("goal point is not part of the point set"))?;

        Ok(Self { nodes, start, goal })
    }

    /// Builds the forward-directed graph from triangulation edges.
    ///
    /// For every node `N`, in arena order, and every edge incident to `N`, in
    /// edge order, the other endpoint `M` becomes a child of `N` when
    /// `M.x - N.x > min_advance` and it is not a child already.
    pub fn build(
        points: &[Point2D],
        edges: &[Edge],
        start: Point2D,
        goal: Point2D,
        min_advance: f64,
    ) -> Result<Self, NavigationError> {
        if !min_advance.is_finite() || min_advance < 0.0 {
            return Err(NavigationError::InvalidParameter(
                "minimum advance must be finite and non-negative",
            ));
        }

        let mut graph = Self::with_points(points, start, goal)?;

        let mut resolved: Vec<(NodeId, NodeId)> = Vec::with_capacity(edges.len());
        for edge in edges {
            match (graph.find(&edge.start), graph.find(&edge.end)) {
                (Some(a), Some(b)) if a != b => resolved.push((a, b)),
                _ => debug!(?edge, "Skipping edge without two distinct graph endpoints"),
            }
        }

        for index in 0..graph.nodes.len() {
            let from = NodeId(index);
            for &(a, b) in &resolved {
                let to = if a == from {
                    b
                } else if b == from {
                    a
                } else {
                    continue;
                };

                let advance = graph.nodes[to.0].position.x - graph.nodes[from.0].position.x;
                if advance > min_advance {
                    graph.link(from, to);
                }
            }
        }

        debug!(
            nodes = graph.len(),
            links = graph.edge_count(),
            min_advance,
            "Layout graph built"
        );
        Ok(graph)
    }

    /// Adds `to` as a child of `from` and makes `from` the parent of `to`.
    ///
    /// Returns false if either id is unknown or the link already exists.
    /// Callers outside [`LayoutGraph::build`] bypass the advance filter, so
    /// this stays crate-private.
    pub(crate) fn link(&mut self, from: NodeId, to: NodeId) -> bool {
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return false;
        }
        if self.nodes[from.0].children.contains(&to) {
            return false;
        }
        self.nodes[from.0].children.push(to);
        self.nodes[to.0].parent = Some(from);
        true
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Ids of all nodes in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// The designated start node.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The designated goal node.
    pub fn goal(&self) -> NodeId {
        self.goal
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of directed links.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Finds the first node at `position`.
    pub fn find(&self, position: &Point2D) -> Option<NodeId> {
        find_in(&self.nodes, position)
    }

    /// Stores the hop count and predecessor of every node on `route` into the
    /// canonical nodes. Other nodes are left untouched.
    pub fn record_route(&mut self, route: &[NodeId]) {
        let mut previous: Option<NodeId> = None;
        for (hops, &id) in route.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id.0) {
                node.score = u32::try_from(hops).unwrap_or(u32::MAX);
                node.parent = previous;
            }
            previous = Some(id);
        }
    }
}

fn find_in(nodes: &[GraphNode], position: &Point2D) -> Option<NodeId> {
    nodes
        .iter()
        .position(|n| points_equal(&n.position, position))
        .map(NodeId)
}
