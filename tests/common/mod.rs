#![allow(dead_code)]

use hdbscan_cluster::Clustering;
use std::collections::HashSet;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three well separated groups: rows 0-3, rows 4-5 and rows 6-9.
pub fn three_groups() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 2.0, 3.0],
        vec![1.0, 2.0, 4.0],
        vec![1.0, 2.0, 5.0],
        vec![1.0, 3.0, 4.0],
        vec![4.0, 5.0, 6.0],
        vec![4.0, 5.0, 5.0],
        vec![80.0, 85.0, 90.0],
        vec![89.0, 90.0, 91.0],
        vec![100.0, 100.0, 100.0],
        vec![90.0, 90.0, 90.0],
    ]
}

pub fn three_group_sets() -> Vec<HashSet<usize>> {
    vec![(0..4).collect(), (4..6).collect(), (6..10).collect()]
}

/// The three groups plus one far away point, row 10.
pub fn three_groups_with_outlier() -> Vec<Vec<f64>> {
    let mut data = three_groups();
    data.push(vec![-2400.0, 2000.0, -30.0]);
    data
}

/// Two groups, rows 0-3 and 4-7, and three scattered points (rows 8-10) that all lie
/// closest to the first group.
pub fn two_groups_with_scattered_points() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 2.0, 3.0],
        vec![1.0, 2.0, 4.0],
        vec![1.0, 2.0, 5.0],
        vec![1.0, 3.0, 4.0],
        vec![80.0, 85.0, 90.0],
        vec![89.0, 90.0, 91.0],
        vec![100.0, 100.0, 100.0],
        vec![90.0, 90.0, 90.0],
        vec![-500.0, 0.0, 0.0],
        vec![0.0, -500.0, 0.0],
        vec![0.0, 0.0, -500.0],
    ]
}

pub fn point_sets(clustering: &Clustering) -> Vec<HashSet<usize>> {
    clustering
        .clusters()
        .iter()
        .map(|cluster| cluster.points().iter().copied().collect())
        .collect()
}

/// No row appears in two clusters.
pub fn is_disjoint(clustering: &Clustering) -> bool {
    let mut seen = HashSet::new();
    clustering
        .clusters()
        .iter()
        .flat_map(|cluster| cluster.points().iter())
        .all(|&p| seen.insert(p))
}
