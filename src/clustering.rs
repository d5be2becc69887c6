use crate::centers::assign_centroids;
use crate::config::ClusteringConfig;
use crate::core_distances::CoreDistanceCalculator;
use crate::dendrogram::build_dendrogram;
use crate::distance::DistanceMetric;
use crate::error::ClusteringError;
use crate::hierarchy::{Cluster, ClusterTree, Outlier};
use crate::mst::Edge;
use crate::outliers::{
    attach_unclustered, cluster_outliers, fit_distance_distribution, nearest_cluster,
};
use crate::reachability::MutualReachability;
use crate::sampling::sample_rows;
use crate::score::{score_clusters, ScoreMode};
use crate::select::select_clusters;
use crate::stats::{finite_or_sentinel, DistanceDistribution};
use crate::validation::DataValidator;
use log::{debug, info};
use rayon::prelude::*;

/// A clustering of a borrowed data set. Construct with [`Clustering::new`], then call
/// [`Clustering::run`] once. A clustering that has run can label new data with
/// [`Clustering::assign`].
#[derive(Debug, Clone)]
pub struct Clustering<'a> {
    data: &'a [Vec<f64>],
    min_cluster_size: usize,
    metric: DistanceMetric,
    score_mode: ScoreMode,
    config: ClusteringConfig,
    core_distances: Vec<f64>,
    min_spanning_tree: Vec<Edge>,
    hierarchy: ClusterTree,
    clusters: Vec<Cluster>,
    has_run: bool,
}

impl<'a> Clustering<'a> {
    /// Creates a clustering of `data`, validating it first.
    ///
    /// # Parameters
    /// * `data` - the rows to cluster. Every row must have the same number of columns and
    ///            contain only finite values.
    /// * `min_cluster_size` - the smallest number of points that can form a cluster, and the
    ///            neighbour count used for core distances. Must be at least 1 and at most the
    ///            number of rows.
    ///
    /// # Returns
    /// * The clustering, ready to run, or the first validation error found.
    ///
    /// # Examples
    /// ```
    ///use hdbscan_cluster::{Clustering, ClusteringError};
    ///
    ///let data = vec![vec![1.0, 2.0], vec![1.5, 2.5], vec![9.0, 9.5]];
    ///assert!(Clustering::new(&data, 2).is_ok());
    ///assert_eq!(
    ///    Err(ClusteringError::MinClusterSizeTooSmall),
    ///    Clustering::new(&data, 0).map(|_| ())
    ///);
    /// ```
    pub fn new(data: &'a [Vec<f64>], min_cluster_size: usize) -> Result<Self, ClusteringError> {
        DataValidator::new(data, min_cluster_size).validate_input_data()?;
        Ok(Self {
            data,
            min_cluster_size,
            metric: DistanceMetric::Euclidean,
            score_mode: ScoreMode::default(),
            config: ClusteringConfig::default(),
            core_distances: Vec::new(),
            min_spanning_tree: Vec::new(),
            hierarchy: ClusterTree::default(),
            clusters: Vec::new(),
            has_run: false,
        })
    }

    /// Runs the clustering. Core distances, mutual reachability, the spanning tree (or nearest
    /// neighbour forest), the dendrogram and the pruned cluster hierarchy are computed on the
    /// sampled rows; clusters are then scored, selected and post-processed according to
    /// `config`.
    ///
    /// # Parameters
    /// * `metric` - the distance between two rows
    /// * `score_mode` - how clusters are scored and selected
    /// * `use_mst` - build the dendrogram from a minimum spanning tree. When false, each point
    ///               is joined only to its nearest neighbour, which can split the hierarchy into
    ///               several roots.
    /// * `config` - post-processing and sampling options. Implied options are applied first.
    ///
    /// # Returns
    /// * `Ok(())`, or an error. A clustering runs at most once, a second call returns
    ///   [`ClusteringError::AlreadyRun`].
    ///
    /// # Examples
    /// ```
    ///use hdbscan_cluster::{Clustering, ClusteringConfig, DistanceMetric, ScoreMode};
    ///
    ///let data = vec![
    ///    vec![1.0, 2.0, 3.0],
    ///    vec![1.0, 2.0, 4.0],
    ///    vec![1.0, 2.0, 5.0],
    ///    vec![1.0, 3.0, 4.0],
    ///    vec![4.0, 5.0, 6.0],
    ///    vec![4.0, 5.0, 5.0],
    ///    vec![80.0, 85.0, 90.0],
    ///    vec![89.0, 90.0, 91.0],
    ///    vec![100.0, 100.0, 100.0],
    ///    vec![90.0, 90.0, 90.0],
    ///];
    ///let mut clustering = Clustering::new(&data, 2).unwrap();
    ///clustering
    ///    .run(DistanceMetric::Euclidean, ScoreMode::Variance, true, ClusteringConfig::default())
    ///    .unwrap();
    ///assert_eq!(vec![0, 0, 0, 0, 1, 1, 2, 2, 2, 2], clustering.labels());
    /// ```
    pub fn run(
        &mut self,
        metric: DistanceMetric,
        score_mode: ScoreMode,
        use_mst: bool,
        config: ClusteringConfig,
    ) -> Result<(), ClusteringError> {
        if self.has_run {
            return Err(ClusteringError::AlreadyRun);
        }
        self.has_run = true;
        self.metric = metric;
        self.score_mode = score_mode;
        self.config = config.effective();
        if !use_mst {
            self.log_progress("Not using a minimum spanning tree, joining nearest neighbours only");
        }

        let data = self.data;
        let min_cluster_size = self.min_cluster_size;
        let sample = sample_rows(data.len(), &self.config, min_cluster_size)?;
        let points: Vec<&[f64]> = sample.iter().map(|&row| data[row].as_slice()).collect();
        debug!("Clustering {} of {} rows", points.len(), data.len());

        self.log_progress("Calculating core distances");
        let core_distances = CoreDistanceCalculator::new(
            &points,
            metric,
            self.config.nn_algorithm,
            min_cluster_size,
        )
        .calc_core_distances()?;

        self.log_progress("Starting mutual reachability");
        let reachability = MutualReachability::new(&points, &core_distances, metric);
        let edges = if use_mst {
            reachability.min_spanning_tree()
        } else {
            reachability.nearest_neighbour_forest()
        };
        debug!("Built {} edges", edges.len());

        self.log_progress("Building dendrogram");
        let links = build_dendrogram(&edges, points.len());
        self.hierarchy = ClusterTree::from_links(&links, min_cluster_size, &sample);
        debug!(
            "Dendrogram has {} links, {} survive pruning",
            links.len(),
            self.hierarchy.len()
        );

        let mut core_distances_by_row = vec![f64::NAN; data.len()];
        for (&row, &core) in sample.iter().zip(&core_distances) {
            core_distances_by_row[row] = core;
        }
        self.core_distances = core_distances_by_row;
        self.min_spanning_tree = edges
            .iter()
            .map(|edge| Edge {
                p1: sample[edge.p1],
                p2: sample[edge.p2],
                distance: edge.distance,
            })
            .collect();

        self.log_progress("Scoring clusters");
        let row_reachability = MutualReachability::new(data, &self.core_distances, metric);
        score_clusters(
            &mut self.hierarchy,
            score_mode,
            data,
            &row_reachability,
            min_cluster_size,
        )?;
        select_clusters(&mut self.hierarchy, score_mode)?;

        self.clusters = self.hierarchy.selected();
        assign_centroids(&mut self.clusters, data);
        self.log_progress("Attaching unclustered points");
        attach_unclustered(&mut self.clusters, data, metric, &self.config);
        if self.config.outlier_clustering {
            cluster_outliers(&mut self.clusters, min_cluster_size, data);
        }
        self.log_progress(&format!("Found {} clusters", self.clusters.len()));
        Ok(())
    }

    /// Assigns each row of `new_data` to the nearest final cluster of this clustering, by
    /// centroid or nearest member as configured. With outlier detection a row further from
    /// its cluster than any member was becomes an outlier instead, and also joins the
    /// cluster when Voronoi back-fill is on. This clustering is left unchanged.
    ///
    /// # Parameters
    /// * `new_data` - rows with the same number of columns as the clustered data
    ///
    /// # Returns
    /// * A new clustering over `new_data` holding the assigned clusters, which keep their
    ///   ids, centroids and distance distributions. Fails with
    ///   [`ClusteringError::NoClusters`] when this clustering found no clusters.
    pub fn assign<'b>(&self, new_data: &'b [Vec<f64>]) -> Result<Clustering<'b>, ClusteringError> {
        if self.clusters.is_empty() {
            return Err(ClusteringError::NoClusters);
        }
        let mut assigned = Clustering::new(new_data, self.min_cluster_size)?;
        let (source_dims, new_dims) = (self.data[0].len(), new_data[0].len());
        if source_dims != new_dims {
            return Err(ClusteringError::WrongDimension(format!(
                "clustered data has {source_dims} dimensions, but new data has {new_dims}"
            )));
        }
        self.log_progress("Assigning data");
        let config = &self.config;

        let distributions: Vec<DistanceDistribution> = self
            .clusters
            .par_iter()
            .map(|cluster| match cluster.distance_distribution {
                Some(distribution) => distribution,
                None => fit_distance_distribution(
                    cluster,
                    self.data,
                    self.metric,
                    config.nearest_neighbor,
                ),
            })
            .collect();
        let mut clusters: Vec<Cluster> = self
            .clusters
            .iter()
            .zip(distributions)
            .map(|(cluster, distribution)| {
                let mut target = Cluster::new(cluster.id, Vec::new());
                target.centroid = cluster.centroid.clone();
                target.score = cluster.score;
                target.stability = cluster.stability;
                target.lambda_birth = cluster.lambda_birth;
                target.selected = true;
                target.distance_distribution = Some(distribution);
                target
            })
            .collect();

        let nearest: Vec<_> = new_data
            .par_iter()
            .map(|row| {
                nearest_cluster(
                    row,
                    &self.clusters,
                    self.data,
                    self.metric,
                    config.nearest_neighbor,
                )
            })
            .collect();
        for (index, nearest) in nearest.into_iter().enumerate() {
            let Some(nearest) = nearest else { continue };
            let cluster = &mut clusters[nearest.position];
            let outlying = match cluster.distance_distribution {
                Some(distribution)
                    if config.outlier_detection
                        && nearest.distance > distribution.largest_distance =>
                {
                    Some(finite_or_sentinel(distribution.normal.cdf(nearest.distance)))
                }
                _ => None,
            };
            match outlying {
                Some(normalized_distance) => {
                    cluster.outliers.push(Outlier { index, normalized_distance });
                    if config.voronoi {
                        cluster.points.push(index);
                    }
                }
                None => cluster.points.push(index),
            }
        }

        if config.outlier_clustering {
            cluster_outliers(&mut clusters, self.min_cluster_size, new_data);
        }
        assigned.metric = self.metric;
        assigned.score_mode = self.score_mode;
        assigned.config = self.config.clone();
        assigned.clusters = clusters;
        assigned.has_run = true;
        Ok(assigned)
    }

    /// The final clusters.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Every cluster of the pruned hierarchy, in ascending id order, with its score and
    /// selection flag. Empty before a run and for assigned clusterings.
    pub fn hierarchy(&self) -> &[Cluster] {
        self.hierarchy.as_slice()
    }

    /// Core distance of every row. NaN for rows outside the sample.
    pub fn core_distances(&self) -> &[f64] {
        &self.core_distances
    }

    /// Edges used to build the dendrogram, by row index, ascending by distance.
    pub fn min_spanning_tree(&self) -> &[Edge] {
        &self.min_spanning_tree
    }

    /// The rows this clustering was built on.
    pub fn data(&self) -> &'a [Vec<f64>] {
        self.data
    }

    /// The smallest number of points that forms a cluster.
    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    /// The effective configuration of the run.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// How clusters were scored and selected.
    pub fn score_mode(&self) -> ScoreMode {
        self.score_mode
    }

    /// Whether the clustering has run, or was produced by [`Clustering::assign`].
    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// A flat label per row: the position of the row's cluster in [`Clustering::clusters`],
    /// or -1 for rows in no cluster. A row in several clusters takes the last.
    pub fn labels(&self) -> Vec<i32> {
        let mut labels = vec![-1; self.data.len()];
        for (label, cluster) in self.clusters.iter().enumerate() {
            for &p in &cluster.points {
                labels[p] = label as i32;
            }
        }
        labels
    }

    fn log_progress(&self, message: &str) {
        if self.config.verbose {
            info!("{message}");
        }
    }
}
