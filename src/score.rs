use crate::error::ClusteringError;
use crate::hierarchy::ClusterTree;
use crate::reachability::MutualReachability;
use crate::stats::{finite_or_sentinel, generalized_variance};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How candidate clusters are scored, and therefore how the final clusters are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoreMode {
    /// Points per unit of generalized variance. Favours compact clusters.
    #[default]
    Variance,
    /// Classic HDBSCAN stability with excess of mass correction. Favours persistent
    /// clusters.
    Stability,
}

impl FromStr for ScoreMode {
    type Err = ClusteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variance_score" => Ok(Self::Variance),
            "stability_score" => Ok(Self::Stability),
            other => Err(ClusteringError::UnknownScoreMode(other.to_string())),
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variance => write!(f, "variance_score"),
            Self::Stability => write!(f, "stability_score"),
        }
    }
}

/// Scores every cluster of the tree. `data` and `reachability` are indexed by row.
pub(crate) fn score_clusters(
    tree: &mut ClusterTree,
    mode: ScoreMode,
    data: &[Vec<f64>],
    reachability: &MutualReachability<Vec<f64>>,
    min_cluster_size: usize,
) -> Result<(), ClusteringError> {
    match mode {
        ScoreMode::Variance => {
            tree.clusters_mut()
                .par_iter_mut()
                .for_each(|cluster| cluster.score = variance_score(&cluster.points, data));
            Ok(())
        }
        ScoreMode::Stability => {
            for cluster in tree.clusters_mut() {
                let (stability, lambda_birth) =
                    cluster_stability(&cluster.points, reachability, min_cluster_size);
                cluster.stability = stability;
                cluster.lambda_birth = lambda_birth;
                cluster.score = stability;
            }
            apply_excess_of_mass(tree)
        }
    }
}

/// Number of points divided by the generalized variance of the points. Groups with no
/// measurable variance score the largest finite value.
pub(crate) fn variance_score(points: &[usize], data: &[Vec<f64>]) -> f64 {
    let rows: Vec<&[f64]> = points.iter().map(|&p| data[p].as_slice()).collect();
    let variance = generalized_variance(&rows);
    finite_or_sentinel(rows.len() as f64 / variance)
}

/// Returns `(stability, lambda_birth)`. Each point's lambdas are the inverse mutual
/// reachability distances to the other members. The cluster is born at the smallest lambda
/// of any member; a point leaves once fewer than `min_cluster_size` members remain closer.
/// Stability is the mean over points of `death - birth`.
pub(crate) fn cluster_stability<P: AsRef<[f64]> + Sync>(
    points: &[usize],
    reachability: &MutualReachability<P>,
    min_cluster_size: usize,
) -> (f64, f64) {
    let death_rank = points.len().saturating_sub(min_cluster_size);
    let lifetimes: Vec<(f64, f64)> = points
        .par_iter()
        .filter_map(|&p| {
            let mut lambdas: Vec<f64> = points
                .iter()
                .filter(|&&q| q != p)
                .map(|&q| 1.0 / reachability.distance(p, q))
                .filter(|lambda| lambda.is_finite())
                .collect();
            if lambdas.is_empty() {
                return None;
            }
            lambdas.sort_unstable_by(|a, b| a.total_cmp(b));
            let death = lambdas[death_rank.min(lambdas.len() - 1)];
            Some((lambdas[0], death))
        })
        .collect();

    if lifetimes.is_empty() {
        return (0.0, 0.0);
    }
    let lambda_birth = lifetimes
        .iter()
        .map(|&(birth, _)| birth)
        .fold(f64::INFINITY, f64::min);
    let total: f64 = lifetimes.iter().map(|&(_, death)| death - lambda_birth).sum();
    (
        finite_or_sentinel(total / lifetimes.len() as f64),
        finite_or_sentinel(lambda_birth),
    )
}

/// Raises every fork's score to the sum of its two children's scores when that is larger.
/// Visits clusters in ascending id order so children are corrected before their parents.
pub(crate) fn apply_excess_of_mass(tree: &mut ClusterTree) -> Result<(), ClusteringError> {
    for id in tree.ids() {
        let children_score = match tree.binary_children(id)? {
            [left, right] => finite_or_sentinel(tree.score_of(*left) + tree.score_of(*right)),
            _ => continue,
        };
        if tree.score_of(id) < children_score {
            tree.set_score(id, children_score);
        }
    }
    Ok(())
}
