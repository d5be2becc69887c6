//! Hierarchical Density-Based Spatial Clustering of Applications with Noise ("HDBSCAN") in
//! Rust, with a choice of how the final clusters are selected from the hierarchy.
//!
//! Points are linked by mutual reachability distance into a minimum spanning tree, the tree
//! is folded into a single linkage dendrogram and the dendrogram is pruned to candidate
//! clusters of at least a minimum size. Candidates are then scored in one of two ways:
//!  1. Variance scoring, where a cluster's score is its number of points divided by the
//!     log of the generalized variance of its points. Compact groups win over the looser
//!     groups that contain them; and
//!  2. Stability scoring, the classic HDBSCAN measure of how long a cluster persists across
//!     densities, corrected for excess of mass.
//!
//! After selection, points left out of every cluster can be recorded as outliers of their
//! nearest cluster (with a normalised distance), attached to it (Voronoi back-fill), or
//! promoted to clusters of their own. A finished clustering can also assign new data to its
//! clusters.
//!
//! # Examples
//! ```
//!use hdbscan_cluster::{Clustering, ClusteringConfig, DistanceMetric, ScoreMode};
//!
//!let data = vec![
//!    vec![1.0, 2.0, 3.0],
//!    vec![1.0, 2.0, 4.0],
//!    vec![1.0, 2.0, 5.0],
//!    vec![1.0, 3.0, 4.0],
//!    vec![4.0, 5.0, 6.0],
//!    vec![4.0, 5.0, 5.0],
//!    vec![80.0, 85.0, 90.0],
//!    vec![89.0, 90.0, 91.0],
//!    vec![100.0, 100.0, 100.0],
//!    vec![90.0, 90.0, 90.0],
//!    vec![-2400.0, 2000.0, -30.0],
//!];
//!let config = ClusteringConfig::builder()
//!    .outlier_detection(true)
//!    .nearest_neighbor(true)
//!    .build();
//!let mut clustering = Clustering::new(&data, 2).unwrap();
//!clustering.run(DistanceMetric::Euclidean, ScoreMode::Variance, true, config).unwrap();
//!
//!assert_eq!(3, clustering.clusters().len());
//!let outliers: Vec<usize> = clustering
//!    .clusters()
//!    .iter()
//!    .flat_map(|cluster| cluster.outliers().iter().map(|outlier| outlier.index))
//!    .collect();
//!assert_eq!(vec![10], outliers);
//! ```
//!
//! # References
//! * [Campello, R.J.G.B.; Moulavi, D.; Sander, J. Density-based clustering based on hierarchical density estimates.](https://link.springer.com/chapter/10.1007/978-3-642-37456-2_14)
//! * [How HDBSCAN Works](https://hdbscan.readthedocs.io/en/latest/how_hdbscan_works.html)

mod centers;
mod clustering;
mod config;
mod core_distances;
mod dendrogram;
mod distance;
mod error;
mod hierarchy;
mod mst;
mod outliers;
mod reachability;
mod sampling;
mod score;
mod select;
mod stats;
mod union_find;
mod validation;

pub use crate::clustering::Clustering;
pub use crate::config::{ClusteringConfig, ConfigBuilder};
pub use crate::core_distances::NnAlgorithm;
pub use crate::distance::{angular_distance, euclidean_distance, manhattan_distance, DistanceMetric};
pub use crate::error::ClusteringError;
pub use crate::hierarchy::{Cluster, Outlier};
pub use crate::mst::Edge;
pub use crate::score::ScoreMode;
pub use crate::stats::{DistanceDistribution, NormalDistribution};
