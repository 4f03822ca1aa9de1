//! Whole-collection tree stores for Spaces and Journals.
//!
//! # Responsibility
//! - Provide CRUD over a flat node list persisted as one key/value entry.
//! - Keep `child_count` consistent with the live parent graph.
//!
//! # Invariants
//! - Every mutation is exactly one load, in-memory edit, and save.
//! - Nodes with children cannot be removed by single delete.
//! - Bulk deletes rebuild every survivor's `child_count` from scratch.
//! - A Journal's `space_id` matches its ownership chain at write time.

use crate::model::node::{
    JournalId, JournalNode, JournalParent, NodeId, SpaceId, SpaceNode, TreeNode,
};
use crate::repo::kv_repo::{KvError, KvStore};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key/value entry holding the full Space node array.
pub const SPACES_KEY: &str = "spaces_nodes_v2";
/// Key/value entry holding the full Journal node array.
pub const JOURNALS_KEY: &str = "journals_nodes_v2";

/// Result type used by tree store operations.
pub type TreeStoreResult<T> = Result<T, TreeStoreError>;

/// Errors from tree store operations.
#[derive(Debug)]
pub enum TreeStoreError {
    /// Referenced node or parent does not exist.
    NotFound(NodeId),
    /// Single delete attempted on a node that still has children.
    HasChildren(NodeId),
    /// Required argument missing or malformed.
    InvalidArgument(String),
    /// Stored data contradicts a tree invariant.
    InvariantViolation(String),
    /// Underlying key/value failure.
    Kv(KvError),
}

impl Display for TreeStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "node not found: {id}"),
            Self::HasChildren(id) => write!(f, "node has children: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvariantViolation(message) => write!(f, "tree invariant violated: {message}"),
            Self::Kv(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for TreeStoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Outcome of a subtree delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtreeDeletion {
    /// Whether the requested root existed.
    pub root_existed: bool,
    /// Root plus every transitive descendant that was removed.
    pub deleted_ids: Vec<NodeId>,
}

/// Flat node list persisted under one key.
pub struct TreeStore<'kv, N: TreeNode, K: KvStore> {
    kv: &'kv K,
    key: &'static str,
    _node: PhantomData<N>,
}

/// Store over the Space tree.
pub type SpaceStore<'kv, K> = TreeStore<'kv, SpaceNode, K>;
/// Store over the Journal tree.
pub type JournalStore<'kv, K> = TreeStore<'kv, JournalNode, K>;

impl<'kv, N: TreeNode, K: KvStore> TreeStore<'kv, N, K> {
    /// Creates a store persisting under a caller-chosen key.
    pub fn with_key(kv: &'kv K, key: &'static str) -> Self {
        Self {
            kv,
            key,
            _node: PhantomData,
        }
    }

    /// Key this store reads and writes.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the full node list. Order is not significant.
    pub fn list_all(&self) -> TreeStoreResult<Vec<N>> {
        self.load()
    }

    /// Loads one node by id.
    pub fn get(&self, id: NodeId) -> TreeStoreResult<Option<N>> {
        Ok(self.load()?.into_iter().find(|node| node.id() == id))
    }

    /// Lists direct in-tree children of `parent_id`, unordered.
    pub fn list_children(&self, parent_id: NodeId) -> TreeStoreResult<Vec<N>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|node| node.tree_parent() == Some(parent_id))
            .collect())
    }

    /// Deletes one leaf node.
    ///
    /// Returns `Ok(false)` when `id` does not exist.
    ///
    /// # Errors
    /// - `HasChildren` when the node still owns children.
    pub fn delete(&self, id: NodeId) -> TreeStoreResult<bool> {
        ensure_id(id, "id")?;
        let mut nodes = self.load()?;
        let Some(index) = position_of(&nodes, id) else {
            return Ok(false);
        };
        if nodes[index].child_count() > 0 {
            return Err(TreeStoreError::HasChildren(id));
        }

        let removed = nodes.remove(index);
        if let Some(parent_id) = removed.tree_parent() {
            if let Some(parent_index) = position_of(&nodes, parent_id) {
                let parent = &mut nodes[parent_index];
                parent.set_child_count(parent.child_count().saturating_sub(1));
            }
        }

        self.save(&nodes)?;
        debug!(
            "event=node_delete module=tree kind={} status=ok id={id}",
            N::KIND
        );
        Ok(true)
    }

    /// Deletes `root_id` and every transitive descendant in one write.
    ///
    /// Nothing is written when the root does not exist.
    pub fn delete_subtree(&self, root_id: NodeId) -> TreeStoreResult<SubtreeDeletion> {
        ensure_id(root_id, "root_id")?;
        let nodes = self.load()?;
        if position_of(&nodes, root_id).is_none() {
            return Ok(SubtreeDeletion::default());
        }

        let doomed = collect_subtree(&nodes, root_id);
        let mut kept: Vec<N> = nodes
            .into_iter()
            .filter(|node| !doomed.contains(&node.id()))
            .collect();
        recompute_child_counts(&mut kept);
        self.save(&kept)?;

        let mut deleted_ids: Vec<NodeId> = doomed.into_iter().collect();
        deleted_ids.sort();
        debug!(
            "event=subtree_delete module=tree kind={} status=ok root={root_id} deleted={}",
            N::KIND,
            deleted_ids.len()
        );
        Ok(SubtreeDeletion {
            root_existed: true,
            deleted_ids,
        })
    }

    fn load(&self) -> TreeStoreResult<Vec<N>> {
        Ok(self.kv.get::<Vec<N>>(self.key)?.unwrap_or_default())
    }

    fn save(&self, nodes: &[N]) -> TreeStoreResult<()> {
        self.kv.set(self.key, &nodes)?;
        Ok(())
    }

    /// Appends a node built from its parent and bumps the parent's count.
    fn insert_child(
        &self,
        parent_id: NodeId,
        build: impl FnOnce(&N, i64) -> TreeStoreResult<N>,
    ) -> TreeStoreResult<N> {
        ensure_id(parent_id, "parent_id")?;
        let mut nodes = self.load()?;
        let parent_index =
            position_of(&nodes, parent_id).ok_or(TreeStoreError::NotFound(parent_id))?;

        let node = build(&nodes[parent_index], next_created_at(&nodes))?;
        let parent = &mut nodes[parent_index];
        parent.set_child_count(parent.child_count() + 1);
        nodes.push(node.clone());

        self.save(&nodes)?;
        debug!(
            "event=node_create module=tree kind={} status=ok id={} parent={parent_id}",
            N::KIND,
            node.id()
        );
        Ok(node)
    }

    /// Appends a node without an in-tree parent.
    fn insert_top_level(&self, build: impl FnOnce(i64) -> TreeStoreResult<N>) -> TreeStoreResult<N> {
        let mut nodes = self.load()?;
        let node = build(next_created_at(&nodes))?;
        nodes.push(node.clone());

        self.save(&nodes)?;
        debug!(
            "event=node_create module=tree kind={} status=ok id={} parent=none",
            N::KIND,
            node.id()
        );
        Ok(node)
    }
}

impl<'kv, K: KvStore> TreeStore<'kv, SpaceNode, K> {
    /// Creates the Space store over its default key.
    pub fn new(kv: &'kv K) -> Self {
        Self::with_key(kv, SPACES_KEY)
    }

    /// Lists spaces without a parent.
    pub fn list_roots(&self) -> TreeStoreResult<Vec<SpaceNode>> {
        Ok(self.load()?.into_iter().filter(SpaceNode::is_root).collect())
    }

    /// Creates one root space.
    pub fn create_root(&self, title: &str) -> TreeStoreResult<SpaceNode> {
        self.insert_top_level(|created_at| Ok(SpaceNode::new(None, title, created_at)))
    }

    /// Creates one subspace under an existing space.
    ///
    /// # Errors
    /// - `NotFound` when `parent_id` does not resolve.
    pub fn create_child(&self, parent_id: SpaceId, title: &str) -> TreeStoreResult<SpaceNode> {
        self.insert_child(parent_id, |parent, created_at| {
            Ok(SpaceNode::new(Some(parent.id), title, created_at))
        })
    }
}

impl<'kv, K: KvStore> TreeStore<'kv, JournalNode, K> {
    /// Creates the Journal store over its default key.
    pub fn new(kv: &'kv K) -> Self {
        Self::with_key(kv, JOURNALS_KEY)
    }

    /// Lists journals attached directly to `space_id`.
    pub fn list_level1(&self, space_id: SpaceId) -> TreeStoreResult<Vec<JournalNode>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|node| node.parent == JournalParent::Space(space_id))
            .collect())
    }

    /// Lists every journal owned by `space_id`, at any depth.
    pub fn list_in_space(&self, space_id: SpaceId) -> TreeStoreResult<Vec<JournalNode>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|node| node.space_id == space_id)
            .collect())
    }

    /// Creates a level-1 journal directly under `space_id`.
    ///
    /// The Space tree is not consulted; callers verify the space exists.
    pub fn create_level1(
        &self,
        space_id: SpaceId,
        template_id: &str,
        title: &str,
    ) -> TreeStoreResult<JournalNode> {
        ensure_id(space_id, "space_id")?;
        self.insert_top_level(|created_at| {
            let node = JournalNode::level1(space_id, template_id, title, created_at);
            ensure_consistent_owner(&node)?;
            Ok(node)
        })
    }

    /// Creates a sub-journal under an existing journal.
    ///
    /// # Errors
    /// - `NotFound` when `parent_id` does not resolve.
    /// - `InvariantViolation` when the parent's ownership is inconsistent.
    pub fn create_sub_journal(
        &self,
        parent_id: JournalId,
        template_id: &str,
        title: &str,
    ) -> TreeStoreResult<JournalNode> {
        self.insert_child(parent_id, |parent, created_at| {
            ensure_consistent_owner(parent)?;
            let node = JournalNode::child_of(parent, template_id, title, created_at);
            ensure_consistent_owner(&node)?;
            Ok(node)
        })
    }

    /// Creates a journal under either a Space or a Journal.
    pub fn create_child(
        &self,
        parent: JournalParent,
        template_id: &str,
        title: &str,
    ) -> TreeStoreResult<JournalNode> {
        match parent {
            JournalParent::Space(space_id) => self.create_level1(space_id, template_id, title),
            JournalParent::Journal(parent_id) => {
                self.create_sub_journal(parent_id, template_id, title)
            }
        }
    }

    /// Removes every journal whose owning space is in `owner_ids`.
    ///
    /// Returns the number of removed journals. Nothing is written when no
    /// journal matches.
    pub fn delete_by_owner(&self, owner_ids: &[SpaceId]) -> TreeStoreResult<usize> {
        let owners: HashSet<SpaceId> = owner_ids.iter().copied().collect();
        if owners.is_empty() {
            return Ok(0);
        }

        let nodes = self.load()?;
        let before = nodes.len();
        let mut kept: Vec<JournalNode> = nodes
            .into_iter()
            .filter(|node| !owners.contains(&node.space_id))
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        recompute_child_counts(&mut kept);
        self.save(&kept)?;
        debug!(
            "event=journal_owner_delete module=tree status=ok owners={} removed={removed}",
            owners.len()
        );
        Ok(removed)
    }
}

/// Rebuilds `child_count` of every node from the in-tree parent links.
pub fn recompute_child_counts<N: TreeNode>(nodes: &mut [N]) {
    let mut counts: HashMap<NodeId, u32> = HashMap::with_capacity(nodes.len());
    for node in nodes.iter() {
        if let Some(parent_id) = node.tree_parent() {
            *counts.entry(parent_id).or_default() += 1;
        }
    }
    for node in nodes.iter_mut() {
        node.set_child_count(counts.get(&node.id()).copied().unwrap_or(0));
    }
}

/// Collects `root_id` and all transitive descendants.
///
/// Uses an explicit stack; the visited set stops traversal on any cycle.
pub fn collect_subtree<N: TreeNode>(nodes: &[N], root_id: NodeId) -> HashSet<NodeId> {
    let mut by_parent: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.tree_parent() {
            by_parent.entry(parent_id).or_default().push(node.id());
        }
    }

    let mut visited = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(children) = by_parent.get(&id) {
            stack.extend(children.iter().copied());
        }
    }
    visited
}

fn position_of<N: TreeNode>(nodes: &[N], id: NodeId) -> Option<usize> {
    nodes.iter().position(|node| node.id() == id)
}

/// Creation timestamp that is strictly newer than any existing node.
fn next_created_at<N: TreeNode>(nodes: &[N]) -> i64 {
    let newest = nodes.iter().map(|node| node.created_at()).max().unwrap_or(i64::MIN);
    now_epoch_ms().max(newest.saturating_add(1))
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn ensure_id(id: NodeId, name: &str) -> TreeStoreResult<()> {
    if id.is_nil() {
        return Err(TreeStoreError::InvalidArgument(format!("{name} is required")));
    }
    Ok(())
}

fn ensure_consistent_owner(node: &JournalNode) -> TreeStoreResult<()> {
    if node.has_consistent_owner() {
        return Ok(());
    }
    Err(TreeStoreError::InvariantViolation(format!(
        "journal {} is not owned by space {}",
        node.id, node.space_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn space(parent: Option<NodeId>, created_at: i64) -> SpaceNode {
        SpaceNode::new(parent, "s", created_at)
    }

    #[test]
    fn recompute_counts_only_direct_children() {
        let root = space(None, 1);
        let child = space(Some(root.id), 2);
        let grandchild = space(Some(child.id), 3);
        let mut nodes = vec![root, child, grandchild];
        nodes[0].child_count = 7;

        recompute_child_counts(&mut nodes);
        assert_eq!(nodes[0].child_count, 1);
        assert_eq!(nodes[1].child_count, 1);
        assert_eq!(nodes[2].child_count, 0);
    }

    #[test]
    fn collect_subtree_survives_cycles() {
        let mut a = space(None, 1);
        let b = space(Some(a.id), 2);
        a.parent_id = Some(b.id);

        let collected = collect_subtree(&[a.clone(), b.clone()], a.id);
        assert_eq!(collected.len(), 2);
        assert!(collected.contains(&a.id));
        assert!(collected.contains(&b.id));
    }

    #[test]
    fn collect_subtree_of_unknown_root_is_root_only() {
        let unknown = Uuid::new_v4();
        let collected = collect_subtree::<SpaceNode>(&[space(None, 1)], unknown);
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn next_created_at_is_strictly_increasing() {
        let future = now_epoch_ms() + 60_000;
        let nodes = vec![space(None, future)];
        assert_eq!(next_created_at(&nodes), future + 1);
    }

    #[test]
    fn journal_child_counts_ignore_space_parents() {
        let space_id = Uuid::new_v4();
        let level1 = JournalNode::level1(space_id, "", "L1", 1);
        let sub = JournalNode::child_of(&level1, "", "Sub", 2);
        let mut nodes = vec![level1, sub];

        recompute_child_counts(&mut nodes);
        assert_eq!(nodes[0].child_count, 1);
        assert_eq!(nodes[1].child_count, 0);
    }
}
