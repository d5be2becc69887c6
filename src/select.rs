use crate::error::ClusteringError;
use crate::hierarchy::ClusterTree;
use crate::score::ScoreMode;
use std::collections::HashMap;

/// Marks the final clusters of the tree. Any earlier selection is discarded first, so
/// selecting twice gives the same result.
pub(crate) fn select_clusters(
    tree: &mut ClusterTree,
    mode: ScoreMode,
) -> Result<(), ClusteringError> {
    tree.clear_selection();
    match mode {
        ScoreMode::Variance => select_by_variance(tree),
        ScoreMode::Stability => select_by_stability(tree),
    }
}

/// Smallest clusters first: a cluster wins when its score is at least the average score of
/// its children, and a win deselects everything beneath it.
fn select_by_variance(tree: &mut ClusterTree) -> Result<(), ClusteringError> {
    for id in tree.ids_bottom_up() {
        let children = tree.binary_children(id)?;
        let keep = if children.is_empty() {
            true
        } else {
            let n_children = children.len() as f64;
            // divide before summing so large scores cannot overflow
            let average: f64 = children.iter().map(|&c| tree.score_of(c) / n_children).sum();
            tree.score_of(id) >= average
        };
        if keep {
            tree.set_selected(id, true);
            for descendant in tree.descendants(id) {
                tree.set_selected(descendant, false);
            }
        }
    }

    // a selected cluster never sits beneath another selected cluster
    for id in tree.ids() {
        if tree.is_selected(id) {
            for ancestor in tree.ancestors(id) {
                tree.set_selected(ancestor, false);
            }
        }
    }
    Ok(())
}

/// Walks up from the leaves tracking whether each subtree already holds a resolved fork. At
/// a fork the higher scoring child (the lower id on ties) is selected unless a fork beneath
/// it was already resolved. Roots with no fork anywhere beneath them are selected.
fn select_by_stability(tree: &mut ClusterTree) -> Result<(), ClusteringError> {
    let mut has_fork: HashMap<usize, bool> = HashMap::with_capacity(tree.len());
    let resolved =
        |has_fork: &HashMap<usize, bool>, id: usize| has_fork.get(&id).copied().unwrap_or(false);

    for id in tree.ids_bottom_up() {
        let children = tree.binary_children(id)?.to_vec();
        let fork = match children[..] {
            [] => false,
            [only] => resolved(&has_fork, only),
            [left, right] => {
                let (low, high) = if left < right { (left, right) } else { (right, left) };
                let winner = if tree.score_of(high) > tree.score_of(low) { high } else { low };
                if !resolved(&has_fork, winner) {
                    tree.set_selected(winner, true);
                }
                true
            }
            _ => unreachable!("binary_children rejects wider forks"),
        };
        has_fork.insert(id, fork);
    }

    for root in tree.roots() {
        if !resolved(&has_fork, root) {
            tree.set_selected(root, true);
        }
    }
    Ok(())
}
