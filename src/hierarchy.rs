use crate::dendrogram::Link;
use crate::error::ClusteringError;
use crate::stats::DistanceDistribution;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point that was not part of a cluster's dense core but lies closest to it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outlier {
    /// Row index of the point in the clustered data
    pub index: usize,
    /// Cumulative probability of the point's distance under the cluster's distance
    /// distribution, in `[0, 1]`
    pub normalized_distance: f64,
}

/// A candidate cluster in the hierarchy, and after selection a final cluster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    pub(crate) id: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) points: Vec<usize>,
    pub(crate) centroid: Option<Vec<f64>>,
    pub(crate) outliers: Vec<Outlier>,
    pub(crate) score: f64,
    pub(crate) stability: f64,
    pub(crate) lambda_birth: f64,
    pub(crate) selected: bool,
    pub(crate) distance_distribution: Option<DistanceDistribution>,
}

impl Cluster {
    pub(crate) fn new(id: usize, points: Vec<usize>) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            points,
            centroid: None,
            outliers: Vec::new(),
            score: 0.0,
            stability: 0.0,
            lambda_birth: 0.0,
            selected: false,
            distance_distribution: None,
        }
    }

    /// Identifier, unique within a clustering. Hierarchy clusters take the id of the merge
    /// that formed them; clusters promoted from outliers take ids above every other.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Row indices of the cluster's members.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn centroid(&self) -> Option<&[f64]> {
        self.centroid.as_deref()
    }

    pub fn outliers(&self) -> &[Outlier] {
        &self.outliers
    }

    /// The selection score: variance score or (excess of mass corrected) stability.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Raw stability before excess of mass correction. Zero in variance mode.
    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn lambda_birth(&self) -> f64 {
        self.lambda_birth
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn distance_distribution(&self) -> Option<&DistanceDistribution> {
        self.distance_distribution.as_ref()
    }
}

/// The pruned cluster hierarchy, stored as an arena ordered by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClusterTree {
    clusters: Vec<Cluster>,
    positions: HashMap<usize, usize>,
}

impl ClusterTree {
    pub(crate) fn from_clusters(mut clusters: Vec<Cluster>) -> Self {
        clusters.sort_by_key(|c| c.id);
        let positions = clusters
            .iter()
            .enumerate()
            .map(|(position, c)| (c.id, position))
            .collect();
        Self {
            clusters,
            positions,
        }
    }

    /// Keeps every link with at least `min_cluster_size` points. Children become the
    /// nearest surviving descendants and the parent the nearest surviving ancestor. Link
    /// point indices are local to `sample` and are mapped back to row indices.
    pub(crate) fn from_links(links: &[Link], min_cluster_size: usize, sample: &[usize]) -> Self {
        let survives = |link: &Link| link.points.len() >= min_cluster_size;

        let clusters = links
            .iter()
            .filter(|link| survives(link))
            .map(|link| {
                let points = link.points.iter().map(|&p| sample[p]).collect();
                let mut cluster = Cluster::new(link.id, points);

                let mut parent = link.parent;
                while let Some(p) = parent {
                    if survives(&links[p]) {
                        break;
                    }
                    parent = links[p].parent;
                }
                cluster.parent = parent;

                let mut stack = link.children.clone();
                while let Some(child) = stack.pop() {
                    if survives(&links[child]) {
                        cluster.children.push(child);
                    } else {
                        stack.extend_from_slice(&links[child].children);
                    }
                }
                cluster.children.sort_unstable();
                cluster
            })
            .collect();
        Self::from_clusters(clusters)
    }

    pub(crate) fn len(&self) -> usize {
        self.clusters.len()
    }

    pub(crate) fn as_slice(&self) -> &[Cluster] {
        &self.clusters
    }

    pub(crate) fn clusters_mut(&mut self) -> &mut [Cluster] {
        &mut self.clusters
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: usize) -> Option<&Cluster> {
        self.positions.get(&id).map(|&p| &self.clusters[p])
    }

    fn cluster(&self, id: usize) -> &Cluster {
        &self.clusters[self.positions[&id]]
    }

    fn cluster_mut(&mut self, id: usize) -> &mut Cluster {
        let position = self.positions[&id];
        &mut self.clusters[position]
    }

    pub(crate) fn score_of(&self, id: usize) -> f64 {
        self.cluster(id).score
    }

    pub(crate) fn set_score(&mut self, id: usize, score: f64) {
        self.cluster_mut(id).score = score;
    }

    pub(crate) fn is_selected(&self, id: usize) -> bool {
        self.cluster(id).selected
    }

    pub(crate) fn set_selected(&mut self, id: usize, selected: bool) {
        self.cluster_mut(id).selected = selected;
    }

    pub(crate) fn clear_selection(&mut self) {
        self.clusters.iter_mut().for_each(|c| c.selected = false);
    }

    /// Cluster ids in ascending id order, which visits children before parents.
    pub(crate) fn ids(&self) -> Vec<usize> {
        self.clusters.iter().map(|c| c.id).collect()
    }

    /// Cluster ids ordered by (size, id), smallest first.
    pub(crate) fn ids_bottom_up(&self) -> Vec<usize> {
        let mut order: Vec<(usize, usize)> =
            self.clusters.iter().map(|c| (c.size(), c.id)).collect();
        order.sort_unstable();
        order.into_iter().map(|(_, id)| id).collect()
    }

    pub(crate) fn roots(&self) -> Vec<usize> {
        self.clusters
            .iter()
            .filter(|c| c.parent.is_none())
            .map(|c| c.id)
            .collect()
    }

    /// Children of a cluster, which must number at most two.
    pub(crate) fn binary_children(&self, id: usize) -> Result<&[usize], ClusteringError> {
        let cluster = self.cluster(id);
        if cluster.children.len() > 2 {
            return Err(ClusteringError::NonBinaryFork {
                cluster_id: id,
                children: cluster.children.len(),
            });
        }
        Ok(&cluster.children)
    }

    pub(crate) fn descendants(&self, id: usize) -> Vec<usize> {
        let mut descendants = Vec::new();
        let mut stack = self.cluster(id).children.clone();
        while let Some(child) = stack.pop() {
            descendants.push(child);
            stack.extend_from_slice(&self.cluster(child).children);
        }
        descendants
    }

    pub(crate) fn ancestors(&self, id: usize) -> Vec<usize> {
        let mut ancestors = Vec::new();
        let mut parent = self.cluster(id).parent;
        while let Some(p) = parent {
            ancestors.push(p);
            parent = self.cluster(p).parent;
        }
        ancestors
    }

    pub(crate) fn selected(&self) -> Vec<Cluster> {
        self.clusters.iter().filter(|c| c.selected).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dendrogram::build_dendrogram;
    use crate::mst::Edge;

    fn links() -> Vec<Link> {
        let edges = [
            Edge { p1: 0, p2: 1, distance: 1.0 },
            Edge { p1: 1, p2: 2, distance: 1.0 },
            Edge { p1: 3, p2: 4, distance: 1.0 },
            Edge { p1: 4, p2: 5, distance: 1.0 },
            Edge { p1: 2, p2: 6, distance: 2.0 },
            Edge { p1: 5, p2: 3, distance: 3.0 },
            Edge { p1: 6, p2: 3, distance: 9.0 },
        ];
        build_dendrogram(&edges, 7)
    }

    #[test]
    fn prunes_small_links() {
        let sample: Vec<usize> = (0..7).collect();
        let tree = ClusterTree::from_links(&links(), 3, &sample);

        // {0,1} and {3,4} are too small
        assert_eq!(vec![1, 3, 4, 5], tree.ids());
        assert!(tree.as_slice().iter().all(|c| c.size() >= 3));
        assert!(tree.get(0).is_none());
        assert!(tree.get(1).unwrap().is_leaf());
        assert!(tree.get(3).unwrap().is_leaf());
        assert_eq!(vec![5], tree.roots());
        assert_eq!(&[3, 4], tree.get(5).unwrap().children());
        assert_eq!(&[1], tree.get(4).unwrap().children());
        assert_eq!(Some(5), tree.get(3).unwrap().parent());
        assert_eq!(Some(4), tree.get(1).unwrap().parent());
    }

    #[test]
    fn children_are_subsets_of_parents() {
        let sample: Vec<usize> = (0..7).collect();
        let tree = ClusterTree::from_links(&links(), 2, &sample);
        for cluster in tree.as_slice() {
            for &child in cluster.children() {
                let child = tree.get(child).unwrap();
                assert!(child.points().iter().all(|p| cluster.points().contains(p)));
                assert_eq!(Some(cluster.id()), child.parent());
            }
        }
    }

    #[test]
    fn maps_sample_indices_to_rows() {
        let sample = vec![10, 11, 12, 13, 14, 15, 16];
        let tree = ClusterTree::from_links(&links(), 7, &sample);
        let root = tree.get(5).unwrap();
        assert!(root.points().iter().all(|&p| (10..17).contains(&p)));
        assert_eq!(1, tree.len());
    }

    #[test]
    fn descendants_and_ancestors() {
        let sample: Vec<usize> = (0..7).collect();
        let tree = ClusterTree::from_links(&links(), 2, &sample);
        let mut descendants = tree.descendants(5);
        descendants.sort_unstable();
        assert_eq!(vec![0, 1, 2, 3, 4], descendants);
        assert_eq!(vec![1, 4, 5], tree.ancestors(0));
    }

    #[test]
    fn ids_bottom_up_orders_by_size_then_id() {
        let sample: Vec<usize> = (0..7).collect();
        let tree = ClusterTree::from_links(&links(), 2, &sample);
        assert_eq!(vec![0, 2, 1, 3, 4, 5], tree.ids_bottom_up());
    }

    #[test]
    fn non_binary_fork_is_reported() {
        let mut parent = Cluster::new(9, (0..9).collect());
        parent.children = vec![1, 2, 3];
        let tree = ClusterTree::from_clusters(vec![
            parent,
            Cluster::new(1, vec![0, 1, 2]),
            Cluster::new(2, vec![3, 4, 5]),
            Cluster::new(3, vec![6, 7, 8]),
        ]);
        assert_eq!(
            Err(ClusteringError::NonBinaryFork { cluster_id: 9, children: 3 }),
            tree.binary_children(9)
        );
    }
}
