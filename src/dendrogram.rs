use crate::mst::Edge;
use crate::union_find::UnionFind;

/// A merge in the single linkage hierarchy. Link ids are assigned in creation order, so a
/// link's children always have smaller ids than the link itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Link {
    pub(crate) id: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) points: Vec<usize>,
    pub(crate) distance: f64,
}

/// Folds sorted edges into a single linkage dendrogram.
pub(crate) struct DendrogramBuilder {
    links: Vec<Link>,
    union_find: UnionFind,
}

impl DendrogramBuilder {
    pub(crate) fn new(n_points: usize) -> Self {
        Self {
            links: Vec::with_capacity(n_points.saturating_sub(1)),
            union_find: UnionFind::new(n_points),
        }
    }

    /// Merges the top links (or singleton points) holding the two ends of `edge` into a new
    /// link. Returns the new link id, or `None` when both ends already share a top link.
    pub(crate) fn push_edge(&mut self, edge: &Edge) -> Option<usize> {
        let left_root = self.union_find.find(edge.p1);
        let right_root = self.union_find.find(edge.p2);
        if left_root == right_root {
            return None;
        }

        let id = self.links.len();
        let mut children = Vec::with_capacity(2);
        let mut points = Vec::new();
        for (root, point) in [(left_root, edge.p1), (right_root, edge.p2)] {
            match self.union_find.link_of(root) {
                Some(child) => {
                    self.links[child].parent = Some(id);
                    points.extend_from_slice(&self.links[child].points);
                    children.push(child);
                }
                None => points.push(point),
            }
        }
        self.union_find.union(left_root, right_root);
        self.links.push(Link {
            id,
            parent: None,
            children,
            points,
            distance: edge.distance,
        });
        Some(id)
    }

    /// Links that have not yet been merged into anything larger.
    #[cfg(test)]
    pub(crate) fn top_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|link| link.parent.is_none())
    }

    pub(crate) fn finish(self) -> Vec<Link> {
        self.links
    }
}

pub(crate) fn build_dendrogram(edges: &[Edge], n_points: usize) -> Vec<Link> {
    let mut builder = DendrogramBuilder::new(n_points);
    for edge in edges {
        builder.push_edge(edge);
    }
    builder.finish()
}
