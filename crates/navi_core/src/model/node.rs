//! Space and Journal tree nodes.
//!
//! # Invariants
//! - `child_count` mirrors the number of nodes whose in-tree parent is this node.
//! - `JournalNode::space_id` equals the parent id for level-1 journals and is
//!   inherited unchanged by every sub-journal.
//! - `title` is never blank; blank input is replaced by [`UNTITLED`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier shared by both trees.
pub type NodeId = Uuid;
/// Identifier of a Space node.
pub type SpaceId = NodeId;
/// Identifier of a Journal node.
pub type JournalId = NodeId;

/// Placeholder title used when a caller supplies a blank one.
pub const UNTITLED: &str = "Untitled";

/// Behavior shared by nodes of both trees.
///
/// `tree_parent` is the parent *inside the same tree*: `None` for root
/// Spaces and for level-1 Journals (whose owner lives in the Space tree).
pub trait TreeNode: Clone + Serialize + DeserializeOwned {
    /// Short kind tag used in log events and error messages.
    const KIND: &'static str;

    fn id(&self) -> NodeId;
    fn title(&self) -> &str;
    fn created_at(&self) -> i64;
    fn tree_parent(&self) -> Option<NodeId>;
    fn child_count(&self) -> u32;
    fn set_child_count(&mut self, count: u32);
}

/// Node in the primary Space hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceNode {
    pub id: SpaceId,
    pub title: String,
    /// `None` marks a root space.
    pub parent_id: Option<SpaceId>,
    #[serde(default)]
    pub child_count: u32,
    /// Epoch ms. Only used for deterministic sibling ordering.
    #[serde(default)]
    pub created_at: i64,
}

impl SpaceNode {
    /// Creates a space node with a generated id and no children.
    pub fn new(parent_id: Option<SpaceId>, title: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(title),
            parent_id,
            child_count: 0,
            created_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl TreeNode for SpaceNode {
    const KIND: &'static str = "space";

    fn id(&self) -> NodeId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn tree_parent(&self) -> Option<NodeId> {
        self.parent_id
    }

    fn child_count(&self) -> u32 {
        self.child_count
    }

    fn set_child_count(&mut self, count: u32) {
        self.child_count = count;
    }
}

/// Owner reference of a journal: either its Space or another Journal.
///
/// Serialized as `{"kind": "space" | "journal", "id": "<uuid>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum JournalParent {
    /// Level-1 journal owned directly by a Space.
    Space(SpaceId),
    /// Sub-journal owned by another Journal.
    Journal(JournalId),
}

impl JournalParent {
    /// Raw id regardless of which tree it points into.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Space(id) | Self::Journal(id) => *id,
        }
    }
}

/// Node in the secondary Journal hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalNode {
    pub id: JournalId,
    pub title: String,
    /// Catalog template used at creation. May be empty.
    #[serde(default)]
    pub template_id: String,
    pub parent: JournalParent,
    /// Owning space. Immutable after creation.
    pub space_id: SpaceId,
    #[serde(default)]
    pub child_count: u32,
    #[serde(default)]
    pub created_at: i64,
}

impl JournalNode {
    /// Creates a level-1 journal owned by `space_id`.
    pub fn level1(space_id: SpaceId, template_id: &str, title: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(title),
            template_id: template_id.trim().to_string(),
            parent: JournalParent::Space(space_id),
            space_id,
            child_count: 0,
            created_at,
        }
    }

    /// Creates a sub-journal that inherits `space_id` from `parent`.
    pub fn child_of(parent: &JournalNode, template_id: &str, title: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(title),
            template_id: template_id.trim().to_string(),
            parent: JournalParent::Journal(parent.id),
            space_id: parent.space_id,
            child_count: 0,
            created_at,
        }
    }

    pub fn is_level1(&self) -> bool {
        matches!(self.parent, JournalParent::Space(_))
    }

    /// Checks the ownership invariant that can be verified on the node alone.
    pub fn has_consistent_owner(&self) -> bool {
        match self.parent {
            JournalParent::Space(space_id) => space_id == self.space_id,
            JournalParent::Journal(parent_id) => parent_id != self.id,
        }
    }
}

impl TreeNode for JournalNode {
    const KIND: &'static str = "journal";

    fn id(&self) -> NodeId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn tree_parent(&self) -> Option<NodeId> {
        match self.parent {
            JournalParent::Space(_) => None,
            JournalParent::Journal(id) => Some(id),
        }
    }

    fn child_count(&self) -> u32 {
        self.child_count
    }

    fn set_child_count(&mut self, count: u32) {
        self.child_count = count;
    }
}

/// Trims a title and substitutes [`UNTITLED`] when nothing remains.
pub fn normalize_title(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
