use crate::hierarchy::Cluster;
use num_traits::Float;
use rayon::prelude::*;

/// The elementwise mean of the given rows. Not guaranteed to be an observed data point.
pub(crate) fn calc_centroid<T: Float>(data: &[Vec<T>], points: &[usize]) -> Vec<T> {
    let n_dims = points.first().map_or(0, |&p| data[p].len());
    let mut element_wise_sum = vec![T::zero(); n_dims];
    for &p in points {
        for (sum, &element) in element_wise_sum.iter_mut().zip(data[p].iter()) {
            *sum = *sum + element;
        }
    }
    let n_points = T::from(points.len()).unwrap_or_else(T::one);
    for element in element_wise_sum.iter_mut() {
        *element = *element / n_points;
    }
    element_wise_sum
}

/// Sets the centroid of every cluster from its current members.
pub(crate) fn assign_centroids(clusters: &mut [Cluster], data: &[Vec<f64>]) {
    clusters
        .par_iter_mut()
        .for_each(|cluster| cluster.centroid = Some(calc_centroid(data, &cluster.points)));
}
