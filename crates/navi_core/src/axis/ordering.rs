//! Sibling ordering and hierarchical numbering.

use crate::model::node::{NodeId, TreeNode};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Orders siblings: `created_at` ascending, then case-insensitive title,
/// then exact title, then id.
pub fn compare_siblings<N: TreeNode>(left: &N, right: &N) -> Ordering {
    left.created_at()
        .cmp(&right.created_at())
        .then_with(|| {
            left.title()
                .to_lowercase()
                .cmp(&right.title().to_lowercase())
        })
        .then_with(|| left.title().cmp(right.title()))
        .then_with(|| left.id().cmp(&right.id()))
}

/// Sorts a node slice in place by [`compare_siblings`].
pub fn sort_siblings<N: TreeNode>(nodes: &mut [&N]) {
    nodes.sort_by(|left, right| compare_siblings(*left, *right));
}

/// Renders `[2, 1]` + `"Orders"` as `"2.1. Orders"`.
pub fn format_label(numbers: &[usize], title: &str) -> String {
    if numbers.is_empty() {
        return title.to_string();
    }
    let prefix = numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".");
    format!("{prefix}. {title}")
}

/// Precomputed parent links and 1-based sibling positions for one scope.
pub struct Numbering<'a, N: TreeNode> {
    by_id: HashMap<NodeId, &'a N>,
    positions: HashMap<NodeId, usize>,
}

impl<'a, N: TreeNode> Numbering<'a, N> {
    pub fn new(nodes: &'a [N]) -> Self {
        let mut groups: HashMap<Option<NodeId>, Vec<&'a N>> = HashMap::new();
        for node in nodes {
            groups.entry(node.tree_parent()).or_default().push(node);
        }

        let mut positions = HashMap::with_capacity(nodes.len());
        for siblings in groups.values_mut() {
            sort_siblings(siblings);
            for (index, node) in siblings.iter().enumerate() {
                positions.insert(node.id(), index + 1);
            }
        }

        Self {
            by_id: nodes.iter().map(|node| (node.id(), node)).collect(),
            positions,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&'a N> {
        self.by_id.get(&id).copied()
    }

    /// Sibling positions from the top-level ancestor down to `id`.
    ///
    /// The upward walk stops at a top-level node, at a parent missing from
    /// the scope, or when a parent is revisited.
    pub fn number_path(&self, id: NodeId) -> Vec<usize> {
        let mut numbers = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            if !visited.insert(node.id()) {
                break;
            }
            numbers.push(self.positions.get(&node.id()).copied().unwrap_or(1));
            cursor = node.tree_parent().and_then(|parent_id| self.get(parent_id));
        }
        numbers.reverse();
        numbers
    }

    /// Numbered label of `node` within this scope.
    pub fn label(&self, node: &N) -> String {
        format_label(&self.number_path(node.id()), node.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::SpaceNode;

    #[test]
    fn format_label_joins_with_trailing_dot() {
        assert_eq!(format_label(&[2, 1], "Orders"), "2.1. Orders");
        assert_eq!(format_label(&[], "Orders"), "Orders");
    }

    #[test]
    fn equal_timestamps_fall_back_to_case_insensitive_title() {
        let beta = SpaceNode::new(None, "beta", 5);
        let alpha = SpaceNode::new(None, "Alpha", 5);
        assert_eq!(compare_siblings(&alpha, &beta), Ordering::Less);
        assert_eq!(compare_siblings(&beta, &alpha), Ordering::Greater);
    }

    #[test]
    fn created_at_dominates_title() {
        let late = SpaceNode::new(None, "A", 9);
        let early = SpaceNode::new(None, "Z", 1);
        assert_eq!(compare_siblings(&early, &late), Ordering::Less);
    }

    #[test]
    fn number_path_stops_on_cycle() {
        let mut a = SpaceNode::new(None, "A", 1);
        let b = SpaceNode::new(Some(a.id), "B", 2);
        a.parent_id = Some(b.id);
        let nodes = vec![a.clone(), b];

        let numbering = Numbering::new(&nodes);
        assert_eq!(numbering.number_path(a.id).len(), 2);
    }
}
