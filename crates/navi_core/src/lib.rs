//! Core navigation logic for Navi.
//!
//! Two loosely coupled hierarchies live here: Spaces, and Journals scoped to
//! one Space. This crate owns their tree invariants, the axis view models,
//! and the dual-path cursor that ties them together.

pub mod axis;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use axis::builder::{
    build_axis, build_journal_axis, build_space_axis, AxisEntry, AxisModel, AxisScope,
};
pub use axis::ordering::{compare_siblings, format_label};
pub use config::NavConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cursor::{NavCursor, NavHistoryEntry};
pub use model::node::{
    JournalId, JournalNode, JournalParent, NodeId, SpaceId, SpaceNode, TreeNode, UNTITLED,
};
pub use model::template::JournalTemplate;
pub use repo::kv_repo::{KvError, KvResult, KvStore, SqliteKvStore};
pub use repo::nav_memory_repo::{NavMemory, NavMemoryRepository};
pub use repo::tree_repo::{
    JournalStore, SpaceStore, SubtreeDeletion, TreeStore, TreeStoreError, TreeStoreResult,
};
pub use service::navigation_service::{NavError, NavResult, NavState, NavView, NavigationService};
pub use service::session::{NavCommand, NavPresenter, NavSession};
pub use service::template_catalog::{StaticTemplateCatalog, TemplateCatalog};
