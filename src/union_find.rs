/// Disjoint sets over `n_points` points where every union creates a fresh label. Singletons
/// carry labels `0..n_points` and the k-th union gets label `n_points + k`, so the label of a
/// merged set identifies the link that created it.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    n_points: usize,
    next_label: usize,
}

impl UnionFind {
    pub(crate) fn new(n_points: usize) -> Self {
        let length = (2 * n_points).saturating_sub(1).max(1);
        let parent = (0..length).collect();

        UnionFind {
            parent,
            n_points,
            next_label: n_points,
        }
    }

    /// Merges two roots under a new label, returning that label.
    pub(crate) fn union(&mut self, m: usize, n: usize) -> usize {
        let label = self.next_label;
        self.parent[m] = label;
        self.parent[n] = label;
        self.next_label += 1;
        label
    }

    pub(crate) fn find(&mut self, n: usize) -> usize {
        let mut root = n;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut node = n;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// The index of the link that created `label`, or `None` for a singleton.
    pub(crate) fn link_of(&self, label: usize) -> Option<usize> {
        label.checked_sub(self.n_points)
    }
}
