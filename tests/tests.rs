mod common;

use common::*;
use hdbscan_cluster::{
    euclidean_distance, Clustering, ClusteringConfig, ClusteringError, DistanceMetric, NnAlgorithm,
    ScoreMode,
};
use std::collections::HashSet;

fn run(
    data: &[Vec<f64>],
    mcs: usize,
    score_mode: ScoreMode,
    use_mst: bool,
    config: ClusteringConfig,
) -> Clustering {
    init_logger();
    let mut clustering = Clustering::new(data, mcs).unwrap();
    clustering
        .run(DistanceMetric::Euclidean, score_mode, use_mst, config)
        .unwrap();
    clustering
}

#[test]
fn three_groups_are_found() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Variance, true, ClusteringConfig::default());

    assert_eq!(three_group_sets(), point_sets(&clustering));
    assert!(clustering.clusters().iter().all(|c| c.is_selected()));
    assert_eq!(vec![0, 0, 0, 0, 1, 1, 2, 2, 2, 2], clustering.labels());
}

#[test]
fn verbose_run() {
    let data = three_groups();
    let config = ClusteringConfig::builder().verbose(true).build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config);
    assert_eq!(3, clustering.clusters().len());
}

#[test]
fn nearest_neighbour_forest_finds_the_same_groups() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Variance, false, ClusteringConfig::default());
    assert_eq!(three_group_sets(), point_sets(&clustering));
}

#[test]
fn kd_tree_matches_brute_force() {
    let data = three_groups_with_outlier();
    let kd = run(
        &data,
        2,
        ScoreMode::Variance,
        true,
        ClusteringConfig::builder().nn_algorithm(NnAlgorithm::KdTree).build(),
    );
    let brute = run(
        &data,
        2,
        ScoreMode::Variance,
        true,
        ClusteringConfig::builder().nn_algorithm(NnAlgorithm::BruteForce).build(),
    );
    assert_eq!(brute.core_distances(), kd.core_distances());
    assert_eq!(point_sets(&brute), point_sets(&kd));
}

#[test]
fn far_point_is_an_outlier_of_one_cluster() {
    let data = three_groups_with_outlier();
    let config = ClusteringConfig::builder()
        .outlier_detection(true)
        .nearest_neighbor(true)
        .build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config);

    assert_eq!(3, clustering.clusters().len());
    let holders: Vec<_> = clustering
        .clusters()
        .iter()
        .filter(|c| c.outliers().iter().any(|o| o.index == 10))
        .collect();
    assert_eq!(1, holders.len());
    assert_eq!((0..4).collect::<HashSet<_>>(), holders[0].points().iter().copied().collect());

    for cluster in clustering.clusters() {
        assert!(!cluster.points().contains(&10));
        assert!(cluster.distance_distribution().is_some());
        for outlier in cluster.outliers() {
            assert!(outlier.normalized_distance.is_finite());
            assert!((0.0..=1.0).contains(&outlier.normalized_distance));
        }
    }
    assert_eq!(-1, clustering.labels()[10]);
}

#[test]
fn voronoi_attaches_every_row() {
    let data = three_groups_with_outlier();
    let config = ClusteringConfig::builder()
        .voronoi(true)
        .outlier_detection(true)
        .nearest_neighbor(true)
        .build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config);

    assert!(clustering.labels().iter().all(|&label| label >= 0));
    assert_eq!(clustering.labels()[0], clustering.labels()[10]);
    assert!(is_disjoint(&clustering));
    let outliers: Vec<usize> = clustering
        .clusters()
        .iter()
        .flat_map(|c| c.outliers().iter().map(|o| o.index))
        .collect();
    assert_eq!(vec![10], outliers);
}

#[test]
fn centroids_are_member_means() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Variance, true, ClusteringConfig::default());
    for cluster in clustering.clusters() {
        let centroid = cluster.centroid().unwrap();
        for (dim, &value) in centroid.iter().enumerate() {
            let sum: f64 = cluster.points().iter().map(|&p| data[p][dim]).sum();
            let mean = sum / cluster.size() as f64;
            assert!((value - mean).abs() < 1e-9);
        }
    }
}

#[test]
fn clusters_are_disjoint_and_large_enough() {
    for data in [three_groups(), three_groups_with_outlier(), two_groups_with_scattered_points()] {
        for mcs in 2..=4 {
            for score_mode in [ScoreMode::Variance, ScoreMode::Stability] {
                for use_mst in [true, false] {
                    let config = ClusteringConfig::default();
                    let clustering = run(&data, mcs, score_mode, use_mst, config);
                    assert!(is_disjoint(&clustering));
                    assert!(clustering.clusters().iter().all(|c| c.size() >= mcs));
                }
            }
        }
    }
}

#[test]
fn hierarchy_is_consistent() {
    let data = three_groups_with_outlier();
    let clustering = run(&data, 2, ScoreMode::Variance, true, ClusteringConfig::default());
    let hierarchy = clustering.hierarchy();
    let find = |id: usize| hierarchy.iter().find(|c| c.id() == id).unwrap();

    for cluster in hierarchy {
        assert!(cluster.size() >= 2);
        assert!(cluster.children().len() <= 2);
        assert!(cluster.score().is_finite());
        for &child in cluster.children() {
            let child = find(child);
            assert_eq!(Some(cluster.id()), child.parent());
            assert!(child.points().iter().all(|p| cluster.points().contains(p)));
        }
        if cluster.is_selected() {
            let mut parent = cluster.parent();
            while let Some(id) = parent {
                assert!(!find(id).is_selected());
                parent = find(id).parent();
            }
        }
    }
    let selected: Vec<usize> = hierarchy
        .iter()
        .filter(|c| c.is_selected())
        .map(|c| c.id())
        .collect();
    let final_ids: Vec<usize> = clustering.clusters().iter().map(|c| c.id()).collect();
    assert_eq!(selected, final_ids);
}

#[test]
fn spanning_tree_uses_row_indices() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Variance, true, ClusteringConfig::default());
    let edges = clustering.min_spanning_tree();

    assert_eq!(data.len() - 1, edges.len());
    assert!(edges.windows(2).all(|w| w[0].distance <= w[1].distance));
    let mut touched = HashSet::new();
    for edge in edges {
        touched.insert(edge.p1);
        touched.insert(edge.p2);
        let raw = euclidean_distance(&data[edge.p1], &data[edge.p2]);
        assert!(edge.distance >= raw - 1e-12);
    }
    assert_eq!(data.len(), touched.len());
}

#[test]
fn core_distances() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Variance, true, ClusteringConfig::default());
    assert_eq!(1.0, clustering.core_distances()[0]);
    assert!((clustering.core_distances()[7] - 2.0_f64.sqrt()).abs() < 1e-12);

    let clustering = run(&data, 1, ScoreMode::Variance, true, ClusteringConfig::default());
    assert!(clustering.core_distances().iter().all(|&d| d == 0.0));
}

#[test]
fn stability_scoring() {
    let data = three_groups();
    let clustering = run(&data, 2, ScoreMode::Stability, true, ClusteringConfig::default());

    assert_eq!(ScoreMode::Stability, clustering.score_mode());
    // losing subtrees without a fork of their own contribute no cluster
    assert_eq!(vec![(0..4).collect::<HashSet<_>>()], point_sets(&clustering));
    for cluster in clustering.hierarchy() {
        assert!(cluster.stability() >= 0.0);
        assert!(cluster.score() >= cluster.stability());
        if let [left, right] = cluster.children() {
            let children_score: f64 = clustering
                .hierarchy()
                .iter()
                .filter(|c| c.id() == *left || c.id() == *right)
                .map(|c| c.score())
                .sum();
            assert!(cluster.score() >= children_score - 1e-12);
        }
    }
}

#[test]
fn outliers_become_a_cluster() {
    let data = two_groups_with_scattered_points();
    let config = ClusteringConfig::builder().outlier_clustering(true).build();
    let clustering = run(&data, 3, ScoreMode::Variance, true, config);

    assert!(clustering.config().outlier_detection);
    let clusters = clustering.clusters();
    assert_eq!(3, clusters.len());
    assert_eq!(vec![2, 5, 6], clusters.iter().map(|c| c.id()).collect::<Vec<_>>());

    let promoted = &clusters[2];
    assert_eq!(&[8, 9, 10], promoted.points());
    assert!(promoted.is_selected());
    let expected = -500.0 / 3.0;
    for &value in promoted.centroid().unwrap() {
        assert!((value - expected).abs() < 1e-9);
    }
    assert_eq!(3, clusters[0].outliers().len());
}

#[test]
fn subsample_backfills_unsampled_rows() {
    let data = three_groups_with_outlier();
    let config = ClusteringConfig::builder().subsample(10).build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config);

    assert!(clustering.config().voronoi);
    assert!(clustering.core_distances()[10].is_nan());
    assert_eq!(9, clustering.min_spanning_tree().len());
    assert!(clustering.clusters()[0].points().contains(&10));
    assert!(clustering.labels().iter().all(|&label| label >= 0));
}

#[test]
fn full_random_sample_matches_unsampled_run() {
    let data = three_groups();
    let config = ClusteringConfig::builder().random_sampling(1.0).sample_seed(3).build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config);
    assert_eq!(three_group_sets(), point_sets(&clustering));
}

#[test]
fn seeded_random_samples_are_reproducible() {
    let data: Vec<Vec<f64>> = (0..60)
        .map(|i| vec![(i % 3) as f64 * 50.0 + (i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()])
        .collect();
    let config = ClusteringConfig::builder().random_sampling(0.5).sample_seed(42).build();
    let first = run(&data, 3, ScoreMode::Variance, true, config.clone());
    let second = run(&data, 3, ScoreMode::Variance, true, config);
    assert_eq!(first.labels(), second.labels());
    assert_eq!(first.min_spanning_tree(), second.min_spanning_tree());
}

#[test]
fn empty_sample_is_an_error() {
    let data = three_groups();
    let mut clustering = Clustering::new(&data, 2).unwrap();
    let config = ClusteringConfig::builder().random_sampling(0.0).build();
    let result = clustering.run(DistanceMetric::Euclidean, ScoreMode::Variance, true, config);
    assert_eq!(
        Err(ClusteringError::SampleTooSmall { sample: 0, min_cluster_size: 2 }),
        result
    );
}

#[test]
fn other_metrics_run() {
    let data = three_groups();
    for metric in [DistanceMetric::Manhattan, DistanceMetric::Angular] {
        let mut clustering = Clustering::new(&data, 2).unwrap();
        clustering
            .run(metric, ScoreMode::Variance, true, ClusteringConfig::default())
            .unwrap();
        assert!(is_disjoint(&clustering));
        assert!(clustering.clusters().iter().all(|c| c.size() >= 2));
    }
}

#[test]
fn runs_only_once() {
    let data = three_groups();
    let mut clustering = Clustering::new(&data, 2).unwrap();
    assert!(!clustering.has_run());
    clustering
        .run(DistanceMetric::Euclidean, ScoreMode::Variance, true, ClusteringConfig::default())
        .unwrap();
    assert!(clustering.has_run());
    let again = clustering.run(
        DistanceMetric::Euclidean,
        ScoreMode::Stability,
        true,
        ClusteringConfig::default(),
    );
    assert_eq!(Err(ClusteringError::AlreadyRun), again);
    assert_eq!(ScoreMode::Variance, clustering.score_mode());
}

#[test]
fn construction_errors() {
    let data = three_groups();
    assert_eq!(
        Err(ClusteringError::MinClusterSizeTooSmall),
        Clustering::new(&data, 0).map(|_| ())
    );
    assert_eq!(
        Err(ClusteringError::DataTooShort { len: 10, min_cluster_size: 11 }),
        Clustering::new(&data, 11).map(|_| ())
    );

    let ragged = vec![vec![1.0, 2.0], vec![1.0]];
    assert!(matches!(
        Clustering::new(&ragged, 1),
        Err(ClusteringError::WrongDimension(_))
    ));

    let non_finite = vec![vec![1.0, f64::INFINITY], vec![1.0, 2.0]];
    assert!(matches!(
        Clustering::new(&non_finite, 1),
        Err(ClusteringError::NonFiniteCoordinate(_))
    ));
}

#[test]
fn score_mode_names() {
    assert_eq!(ScoreMode::Variance, "variance_score".parse().unwrap());
    assert_eq!(ScoreMode::Stability, "stability_score".parse().unwrap());
    assert_eq!(
        Err(ClusteringError::UnknownScoreMode(String::from("leaf"))),
        "leaf".parse::<ScoreMode>()
    );
}

#[test]
fn euclidean_distance_contract() {
    let data = three_groups_with_outlier();
    for a in &data {
        assert_eq!(0.0, euclidean_distance(a, a));
        for b in &data {
            assert_eq!(euclidean_distance(a, b), euclidean_distance(b, a));
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn clusters_serialize() {
    let data = three_groups_with_outlier();
    let config = ClusteringConfig::builder().outlier_detection(true).build();
    let clustering = run(&data, 2, ScoreMode::Variance, true, config.clone());

    let json = serde_json::to_string(clustering.clusters()).unwrap();
    let clusters: Vec<hdbscan_cluster::Cluster> = serde_json::from_str(&json).unwrap();
    assert_eq!(clustering.clusters(), clusters.as_slice());

    let json = serde_json::to_string(&config).unwrap();
    let restored: ClusteringConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);
}
