use crate::distance::DistanceMetric;
use crate::error::ClusteringError;
use log::warn;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Above this many points the automatic choice switches to the k-d tree
const BRUTE_FORCE_N_SAMPLES_LIMIT: usize = 4096;

/// The nearest neighbour algorithm options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NnAlgorithm {
    /// Selects the nearest neighbour algorithm based on the number of points and the
    /// distance metric
    #[default]
    Auto,
    /// Computes the distance between each point and all others
    BruteForce,
    /// K-dimensional tree algorithm. Only valid for Euclidean and Manhattan distances,
    /// other metrics fall back to brute force.
    KdTree,
}

/// Calculates the core distance of every point: the distance to its k-th nearest
/// neighbour, counting the point itself as the first.
pub(crate) struct CoreDistanceCalculator<'a, P> {
    points: &'a [P],
    nn_algo: NnAlgorithm,
    metric: DistanceMetric,
    k: usize,
}

impl<'a, P: AsRef<[f64]> + Sync> CoreDistanceCalculator<'a, P> {
    pub(crate) fn new(
        points: &'a [P],
        metric: DistanceMetric,
        nn_algo: NnAlgorithm,
        k: usize,
    ) -> Self {
        Self {
            points,
            nn_algo,
            metric,
            k,
        }
    }

    pub(crate) fn calc_core_distances(&self) -> Result<Vec<f64>, ClusteringError> {
        if self.points.is_empty() {
            return Ok(Vec::new());
        }
        if self.k == 0 || self.k > self.points.len() {
            return Err(ClusteringError::NearestNeighbour(format!(
                "cannot find {} neighbours among {} points",
                self.k,
                self.points.len()
            )));
        }
        let n_samples = self.points.len();
        let kd_tree_allowed = self.metric.supports_kd_tree();
        match (self.nn_algo, kd_tree_allowed) {
            (NnAlgorithm::KdTree, true) => {
                KdTree::calc_core_distances(self.points, self.k, self.metric)
            }
            (NnAlgorithm::Auto, true) if n_samples > BRUTE_FORCE_N_SAMPLES_LIMIT => {
                KdTree::calc_core_distances(self.points, self.k, self.metric)
            }
            (NnAlgorithm::KdTree, false) => {
                warn!("K-d tree cannot prune under {:?} distance, using brute force", self.metric);
                Ok(BruteForce::calc_core_distances(self.points, self.k, self.metric))
            }
            _ => Ok(BruteForce::calc_core_distances(self.points, self.k, self.metric)),
        }
    }
}

struct BruteForce;

impl BruteForce {
    fn calc_core_distances<P: AsRef<[f64]> + Sync>(
        points: &[P],
        k: usize,
        metric: DistanceMetric,
    ) -> Vec<f64> {
        points
            .par_iter()
            .map(|point| {
                let mut distances: Vec<f64> = points
                    .iter()
                    .map(|other| metric.calc_dist(point.as_ref(), other.as_ref()))
                    .collect();
                let (_, kth, _) = distances.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
                *kth
            })
            .collect()
    }
}

struct KdTree;

impl KdTree {
    fn calc_core_distances<P: AsRef<[f64]> + Sync>(
        points: &[P],
        k: usize,
        metric: DistanceMetric,
    ) -> Result<Vec<f64>, ClusteringError> {
        let n_dims = points[0].as_ref().len();
        let mut tree: kdtree::KdTree<f64, usize, &[f64]> = kdtree::KdTree::new(n_dims);
        for (n, point) in points.iter().enumerate() {
            tree.add(point.as_ref(), n)
                .map_err(|e| ClusteringError::NearestNeighbour(format!("{e:?}")))?;
        }

        let dist_func = |a: &[f64], b: &[f64]| metric.calc_dist(a, b);
        points
            .par_iter()
            .map(|point| {
                let neighbours = tree
                    .nearest(point.as_ref(), k, &dist_func)
                    .map_err(|e| ClusteringError::NearestNeighbour(format!("{e:?}")))?;
                neighbours
                    .last()
                    .map(|(dist, _)| *dist)
                    .ok_or_else(|| {
                        ClusteringError::NearestNeighbour(String::from("no neighbours found"))
                    })
            })
            .collect()
    }
}
