#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An undirected, weighted edge between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub p1: usize,
    pub p2: usize,
    pub distance: f64,
}

/// A minimum spanning tree grown one row of the mutual reachability matrix at a time.
/// Point 0 seeds the tree. Each new row attaches its point to the nearest point already in
/// the tree, so feeding rows in Prim order yields a minimum spanning tree.
pub(crate) struct SpanningTree {
    in_tree: Vec<bool>,
    vertices: Vec<usize>,
    edges: Vec<Edge>,
}

impl SpanningTree {
    pub(crate) fn new(n_points: usize) -> Self {
        Self {
            in_tree: vec![false; n_points],
            vertices: Vec::with_capacity(n_points),
            edges: Vec::with_capacity(n_points.saturating_sub(1)),
        }
    }

    pub(crate) fn contains(&self, point: usize) -> bool {
        self.in_tree[point]
    }

    /// Adds `point` using its row of distances to every other point. Returns the new edge,
    /// or `None` when the point is already in the tree.
    pub(crate) fn add_row(&mut self, point: usize, distances: &[f64]) -> Option<Edge> {
        if self.vertices.is_empty() {
            self.add_vertex(0);
        }
        if self.in_tree[point] {
            return None;
        }
        // first minimum wins ties
        let nearest = self
            .vertices
            .iter()
            .copied()
            .min_by(|&a, &b| distances[a].total_cmp(&distances[b]))?;
        let edge = Edge {
            p1: nearest,
            p2: point,
            distance: distances[nearest],
        };
        self.add_vertex(point);
        self.edges.push(edge);
        Some(edge)
    }

    pub(crate) fn into_sorted_edges(mut self) -> Vec<Edge> {
        sort_edges(&mut self.edges);
        self.edges
    }

    fn add_vertex(&mut self, point: usize) {
        self.in_tree[point] = true;
        self.vertices.push(point);
    }
}

/// Stable ascending sort by distance.
pub(crate) fn sort_edges(edges: &mut [Edge]) {
    edges.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
