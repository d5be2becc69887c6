use crate::distance::DistanceMetric;
use crate::mst::{sort_edges, Edge, SpanningTree};
use rayon::prelude::*;

/// Mutual reachability distances over a set of points with known core distances:
/// `max(core(a), core(b), dist(a, b))`.
pub(crate) struct MutualReachability<'a, P> {
    points: &'a [P],
    core_distances: &'a [f64],
    metric: DistanceMetric,
}

impl<'a, P: AsRef<[f64]> + Sync> MutualReachability<'a, P> {
    pub(crate) fn new(points: &'a [P], core_distances: &'a [f64], metric: DistanceMetric) -> Self {
        Self {
            points,
            core_distances,
            metric,
        }
    }

    pub(crate) fn distance(&self, a: usize, b: usize) -> f64 {
        let dist = self
            .metric
            .calc_dist(self.points[a].as_ref(), self.points[b].as_ref());
        self.core_distances[a]
            .max(self.core_distances[b])
            .max(dist)
    }

    /// Row `a` of the mutual reachability matrix.
    pub(crate) fn row(&self, a: usize) -> Vec<f64> {
        (0..self.points.len())
            .into_par_iter()
            .map(|b| self.distance(a, b))
            .collect()
    }

    /// Minimum spanning tree of the mutual reachability graph, edges sorted ascending by
    /// distance. Rows are computed one at a time (each row in parallel) and fed to the tree
    /// in Prim order, so the full matrix is never held in memory.
    pub(crate) fn min_spanning_tree(&self) -> Vec<Edge> {
        let n_points = self.points.len();
        let mut tree = SpanningTree::new(n_points);
        let mut best = vec![f64::INFINITY; n_points];
        let mut next = 0;

        for _ in 0..n_points {
            let row = self.row(next);
            tree.add_row(next, &row);

            let mut candidate: Option<usize> = None;
            for point in 0..n_points {
                if tree.contains(point) {
                    continue;
                }
                if row[point] < best[point] {
                    best[point] = row[point];
                }
                match candidate {
                    Some(c) if best[c] <= best[point] => {}
                    _ => candidate = Some(point),
                }
            }
            match candidate {
                Some(point) => next = point,
                None => break,
            }
        }
        tree.into_sorted_edges()
    }

    /// One edge per point to its nearest other point, sorted ascending by distance. The
    /// result is a forest: the two points of a mutual nearest pair contribute the same edge
    /// twice, and later stages ignore the duplicate.
    pub(crate) fn nearest_neighbour_forest(&self) -> Vec<Edge> {
        let n_points = self.points.len();
        let mut edges: Vec<Edge> = (0..n_points)
            .into_par_iter()
            .filter_map(|a| {
                (0..n_points)
                    .filter(|&b| b != a)
                    .map(|b| (b, self.distance(a, b)))
                    .min_by(|x, y| x.1.total_cmp(&y.1))
                    .map(|(b, distance)| Edge { p1: a, p2: b, distance })
            })
            .collect();
        sort_edges(&mut edges);
        edges
    }
}
