use crate::centers::calc_centroid;
use crate::config::ClusteringConfig;
use crate::distance::DistanceMetric;
use crate::hierarchy::{Cluster, Outlier};
use crate::stats::{finite_or_sentinel, DistanceDistribution};
use rayon::prelude::*;

/// The cluster closest to a point, by position in the cluster list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NearestCluster {
    pub(crate) position: usize,
    pub(crate) distance: f64,
}

/// Finds the cluster closest to `point`, measuring either to the cluster's nearest member
/// (rows of `data`) or to its centroid. Ties go to the earlier cluster.
pub(crate) fn nearest_cluster(
    point: &[f64],
    clusters: &[Cluster],
    data: &[Vec<f64>],
    metric: DistanceMetric,
    nearest_neighbor: bool,
) -> Option<NearestCluster> {
    let mut best: Option<NearestCluster> = None;
    for (position, cluster) in clusters.iter().enumerate() {
        let distance = if nearest_neighbor {
            cluster
                .points
                .iter()
                .map(|&p| metric.calc_dist(&data[p], point))
                .fold(f64::INFINITY, f64::min)
        } else {
            match &cluster.centroid {
                Some(centroid) => metric.calc_dist(centroid, point),
                None => continue,
            }
        };
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(NearestCluster { position, distance });
        }
    }
    best
}

/// Fits the distribution of member distances: each member's distance to its nearest other
/// member, or to the centroid.
pub(crate) fn fit_distance_distribution(
    cluster: &Cluster,
    data: &[Vec<f64>],
    metric: DistanceMetric,
    nearest_neighbor: bool,
) -> DistanceDistribution {
    let distances: Vec<f64> = if nearest_neighbor {
        cluster
            .points
            .par_iter()
            .enumerate()
            .filter_map(|(i, &p)| {
                cluster
                    .points
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &q)| metric.calc_dist(&data[p], &data[q]))
                    .reduce(f64::min)
            })
            .collect()
    } else {
        match &cluster.centroid {
            Some(centroid) => cluster
                .points
                .iter()
                .map(|&p| metric.calc_dist(&data[p], centroid))
                .collect(),
            None => Vec::new(),
        }
    };
    DistanceDistribution::fit(&distances)
}

/// Handles every row left out of the clusters. With outlier detection the row becomes an
/// outlier of its nearest cluster, its distance normalised by that cluster's distribution
/// of member distances. With Voronoi back-fill it also joins that cluster. Distributions
/// are fitted to the clusters' members before any row is attached.
pub(crate) fn attach_unclustered(
    clusters: &mut [Cluster],
    data: &[Vec<f64>],
    metric: DistanceMetric,
    config: &ClusteringConfig,
) {
    if clusters.is_empty() || !(config.outlier_detection || config.voronoi) {
        return;
    }
    let mut clustered = vec![false; data.len()];
    for cluster in clusters.iter() {
        for &p in &cluster.points {
            clustered[p] = true;
        }
    }
    let snapshot: &[Cluster] = clusters;
    let nearest: Vec<(usize, NearestCluster)> = (0..data.len())
        .into_par_iter()
        .filter(|&row| !clustered[row])
        .filter_map(|row| {
            nearest_cluster(&data[row], snapshot, data, metric, config.nearest_neighbor)
                .map(|nearest| (row, nearest))
        })
        .collect();

    if config.outlier_detection {
        let distributions: Vec<DistanceDistribution> = clusters
            .par_iter()
            .map(|cluster| {
                fit_distance_distribution(cluster, data, metric, config.nearest_neighbor)
            })
            .collect();
        for (cluster, distribution) in clusters.iter_mut().zip(distributions) {
            cluster.distance_distribution = Some(distribution);
        }
    }

    for (row, nearest) in nearest {
        let cluster = &mut clusters[nearest.position];
        if config.voronoi {
            cluster.points.push(row);
        }
        if let Some(distribution) = cluster
            .distance_distribution
            .filter(|_| config.outlier_detection)
        {
            cluster.outliers.push(Outlier {
                index: row,
                normalized_distance: finite_or_sentinel(distribution.normal.cdf(nearest.distance)),
            });
        }
    }
}

/// Promotes the outliers of every cluster holding at least `min_cluster_size` of them to a
/// new, selected cluster. The cluster at position `i` gives rise to id `max_id + i + 1`.
pub(crate) fn cluster_outliers(
    clusters: &mut Vec<Cluster>,
    min_cluster_size: usize,
    data: &[Vec<f64>],
) {
    let max_id = clusters.iter().map(|c| c.id).max().unwrap_or(0);
    let promoted: Vec<Cluster> = clusters
        .iter()
        .enumerate()
        .filter(|(_, cluster)| cluster.outliers.len() >= min_cluster_size)
        .map(|(position, cluster)| {
            let points: Vec<usize> = cluster.outliers.iter().map(|o| o.index).collect();
            let mut outlier_cluster = Cluster::new(max_id + position + 1, points);
            outlier_cluster.centroid = Some(calc_centroid(data, &outlier_cluster.points));
            outlier_cluster.selected = true;
            outlier_cluster
        })
        .collect();
    clusters.extend(promoted);
}
