//! Axis model builder shared by the Space and Journal trees.
//!
//! # Invariants
//! - An empty path selects the first top-level node by sibling order.
//! - Level-1 journals never offer "back": their parent is a Space.

use crate::axis::ordering::{sort_siblings, Numbering};
use crate::model::node::{JournalNode, NodeId, SpaceId, SpaceNode, TreeNode};
use serde::Serialize;

/// Which tree an axis is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScope {
    /// Space tree; top-level nodes are root spaces.
    Spaces,
    /// Journals of one space; top-level nodes are level-1 journals.
    Journals { space_id: SpaceId },
}

impl AxisScope {
    /// Parent reported for top-level nodes.
    fn top_parent(self) -> Option<NodeId> {
        match self {
            Self::Spaces => None,
            Self::Journals { space_id } => Some(space_id),
        }
    }
}

/// One selectable node in an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisEntry {
    pub id: NodeId,
    pub title: String,
    /// Numbered title, e.g. `"2.1. Orders"`.
    pub label: String,
    pub child_count: u32,
}

impl AxisEntry {
    fn from_node<N: TreeNode>(node: &N, numbering: &Numbering<'_, N>) -> Self {
        Self {
            id: node.id(),
            title: node.title().to_string(),
            label: numbering.label(node),
            child_count: node.child_count(),
        }
    }
}

/// Computed view of one tree at one path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisModel {
    /// Effective path; equals `[active_id]` when the input path was empty.
    pub path: Vec<NodeId>,
    pub active_id: Option<NodeId>,
    /// `None` when the scope is empty or the path points at a missing node;
    /// `siblings` is then empty too.
    pub active: Option<AxisEntry>,
    /// In-tree parent, or the owning space for level-1 journals.
    pub parent_id: Option<NodeId>,
    pub siblings: Vec<AxisEntry>,
    pub children: Vec<AxisEntry>,
    pub can_go_prev: bool,
    /// Path to navigate to on "back".
    pub parent_path: Vec<NodeId>,
    /// Active node is a root space or a level-1 journal.
    pub is_top_level: bool,
}

impl AxisModel {
    pub fn children_count(&self) -> usize {
        self.children.len()
    }
}

/// Builds the Space axis for `path`.
pub fn build_space_axis(nodes: &[SpaceNode], path: &[NodeId]) -> AxisModel {
    build_axis(nodes, path, AxisScope::Spaces)
}

/// Builds the Journal axis for `path`, limited to journals of `space_id`.
pub fn build_journal_axis(nodes: &[JournalNode], path: &[NodeId], space_id: SpaceId) -> AxisModel {
    let scoped: Vec<JournalNode> = nodes
        .iter()
        .filter(|node| node.space_id == space_id)
        .cloned()
        .collect();
    build_axis(&scoped, path, AxisScope::Journals { space_id })
}

/// Builds an axis over nodes already limited to `scope`.
pub fn build_axis<N: TreeNode>(nodes: &[N], path: &[NodeId], scope: AxisScope) -> AxisModel {
    let numbering = Numbering::new(nodes);
    let mut path = path.to_vec();

    let mut active_id = path.last().copied();
    if active_id.is_none() {
        let mut top_level: Vec<&N> = nodes
            .iter()
            .filter(|node| node.tree_parent().is_none())
            .collect();
        sort_siblings(&mut top_level);
        if let Some(first) = top_level.first() {
            active_id = Some(first.id());
            path = vec![first.id()];
        }
    }

    let active = active_id.and_then(|id| numbering.get(id));
    let tree_parent = active.and_then(|node| node.tree_parent());
    let parent_id = active.and_then(|node| node.tree_parent().or(scope.top_parent()));
    let is_top_level = active.is_some_and(|node| node.tree_parent().is_none());

    let siblings = match active {
        Some(_) => sorted_entries(nodes, &numbering, |node| node.tree_parent() == tree_parent),
        None => Vec::new(),
    };
    let children = match active_id {
        Some(id) => sorted_entries(nodes, &numbering, |node| node.tree_parent() == Some(id)),
        None => Vec::new(),
    };

    let can_go_prev = path.len() > 1
        && match scope {
            AxisScope::Spaces => true,
            AxisScope::Journals { .. } => !is_top_level,
        };
    let parent_path = if path.len() > 1 {
        path[..path.len() - 1].to_vec()
    } else {
        path.clone()
    };

    AxisModel {
        active: active.map(|node| AxisEntry::from_node(node, &numbering)),
        path,
        active_id,
        parent_id,
        siblings,
        children,
        can_go_prev,
        parent_path,
        is_top_level,
    }
}

fn sorted_entries<N: TreeNode>(
    nodes: &[N],
    numbering: &Numbering<'_, N>,
    predicate: impl Fn(&N) -> bool,
) -> Vec<AxisEntry> {
    let mut matched: Vec<&N> = nodes.iter().filter(|node| predicate(*node)).collect();
    sort_siblings(&mut matched);
    matched
        .into_iter()
        .map(|node| AxisEntry::from_node(node, numbering))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_has_no_active_node() {
        let model = build_space_axis(&[], &[]);
        assert!(model.active.is_none());
        assert!(model.path.is_empty());
        assert!(model.siblings.is_empty());
        assert!(!model.can_go_prev);
    }

    #[test]
    fn parent_path_of_single_element_path_is_itself() {
        let root = SpaceNode::new(None, "Root", 1);
        let model = build_space_axis(std::slice::from_ref(&root), &[root.id]);
        assert_eq!(model.parent_path, vec![root.id]);
        assert!(model.is_top_level);
    }

    #[test]
    fn stale_path_has_no_siblings() {
        let root = SpaceNode::new(None, "Root", 1);
        let model = build_space_axis(std::slice::from_ref(&root), &[uuid::Uuid::new_v4()]);
        assert!(model.active.is_none());
        assert!(model.siblings.is_empty());
        assert!(model.children.is_empty());
    }
}
