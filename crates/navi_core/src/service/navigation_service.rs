//! Dual-axis navigation orchestrator.
//!
//! # Responsibility
//! - Apply Space/Journal store mutations as navigation transitions.
//! - Keep both path cursors valid against the latest snapshot.
//! - Persist the cursor and a bounded history after every transition.
//!
//! # Invariants
//! - Transitions take the current [`NavState`] by reference and return a new
//!   one; a failed transition persists nothing and leaves the input intact.
//! - Any Space switch clears the Journal path.
//! - The Journal path only ever references journals of the active Space.

use crate::axis::builder::{build_journal_axis, build_space_axis, AxisModel};
use crate::axis::ordering::sort_siblings;
use crate::config::NavConfig;
use crate::model::cursor::{NavCursor, NavHistoryEntry};
use crate::model::node::{JournalId, JournalNode, JournalParent, NodeId, SpaceId, SpaceNode};
use crate::model::template::JournalTemplate;
use crate::repo::kv_repo::{KvError, KvStore};
use crate::repo::nav_memory_repo::{NavMemory, NavMemoryRepository};
use crate::repo::tree_repo::{now_epoch_ms, JournalStore, SpaceStore, TreeStoreError};
use crate::service::template_catalog::TemplateCatalog;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type NavResult<T> = Result<T, NavError>;

/// Errors surfaced by navigation transitions.
#[derive(Debug)]
pub enum NavError {
    /// Tree store rejected the mutation.
    Tree(TreeStoreError),
    /// Cursor or history persistence failed.
    Kv(KvError),
    /// Required id missing or inconsistent with the current selection.
    InvalidArgument(String),
}

impl NavError {
    /// Whether the failure refers to a node that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Tree(TreeStoreError::NotFound(_)))
    }
}

impl Display for NavError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "{err}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for NavError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::InvalidArgument(_) => None,
        }
    }
}

impl From<TreeStoreError> for NavError {
    fn from(value: TreeStoreError) -> Self {
        match value {
            TreeStoreError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Tree(other),
        }
    }
}

impl From<KvError> for NavError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Application state handed to presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavState {
    pub space_nodes: Vec<SpaceNode>,
    pub journal_nodes: Vec<JournalNode>,
    pub space_path: Vec<SpaceId>,
    pub journal_path: Vec<JournalId>,
    /// Last element of `space_path`.
    pub space_id: Option<SpaceId>,
}

impl NavState {
    pub fn cursor(&self) -> NavCursor {
        NavCursor::new(self.space_path.clone(), self.journal_path.clone())
    }
}

/// Both axis models for one state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavView {
    pub space_axis: AxisModel,
    pub journal_axis: AxisModel,
}

/// Navigation use-case service.
pub struct NavigationService<K: KvStore, T: TemplateCatalog> {
    kv: K,
    templates: T,
    config: NavConfig,
}

impl<K: KvStore, T: TemplateCatalog> NavigationService<K, T> {
    pub fn new(kv: K, templates: T) -> Self {
        Self::with_config(kv, templates, NavConfig::default())
    }

    pub fn with_config(kv: K, templates: T, config: NavConfig) -> Self {
        Self {
            kv,
            templates,
            config,
        }
    }

    /// Space tree store over this service's key/value store.
    pub fn spaces(&self) -> SpaceStore<'_, K> {
        SpaceStore::new(&self.kv)
    }

    /// Journal tree store over this service's key/value store.
    pub fn journals(&self) -> JournalStore<'_, K> {
        JournalStore::new(&self.kv)
    }

    fn memory(&self) -> NavMemoryRepository<'_, K> {
        NavMemoryRepository::with_limit(&self.kv, self.config.history_limit)
    }

    pub fn templates(&self) -> Vec<JournalTemplate> {
        self.templates.list()
    }

    /// Loads persisted last location and history.
    pub fn load_memory(&self) -> NavResult<NavMemory> {
        Ok(self.memory().load()?)
    }

    /// Prepares the first state: ensures a root space exists and restores
    /// the last persisted cursor when one is readable.
    pub fn bootstrap(&self) -> NavResult<NavState> {
        let started_at = Instant::now();
        if self.spaces().list_roots()?.is_empty() {
            let space = self.spaces().create_root(&self.config.first_space_title)?;
            info!(
                "event=default_space_create module=nav status=ok id={}",
                space.id
            );
        }

        let cursor = match self.memory().load_location() {
            Ok(cursor) => cursor.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "event=nav_restore module=nav status=error error_code=cursor_unreadable error={err}"
                );
                NavCursor::default()
            }
        };

        let state = self.snapshot(cursor)?;
        info!(
            "event=nav_bootstrap module=nav status=ok duration_ms={} space_depth={} journal_depth={}",
            started_at.elapsed().as_millis(),
            state.space_path.len(),
            state.journal_path.len()
        );
        Ok(state)
    }

    /// Reloads both trees and repairs `cursor` against them.
    ///
    /// Each path is cut at its first id that no longer resolves. An empty
    /// space path falls back to the first root space; an empty journal path
    /// stays empty.
    pub fn snapshot(&self, cursor: NavCursor) -> NavResult<NavState> {
        let space_nodes = self.spaces().list_all()?;
        let journal_nodes = self.journals().list_all()?;

        let space_ids: HashSet<SpaceId> = space_nodes.iter().map(|node| node.id).collect();
        let mut space_path = valid_prefix(cursor.space_path, &space_ids);
        if space_path.is_empty() {
            let mut roots: Vec<&SpaceNode> =
                space_nodes.iter().filter(|node| node.is_root()).collect();
            sort_siblings(&mut roots);
            if let Some(first) = roots.first() {
                space_path = vec![first.id];
            }
        }
        let space_id = space_path.last().copied();

        let journal_ids: HashSet<JournalId> = journal_nodes
            .iter()
            .filter(|node| Some(node.space_id) == space_id)
            .map(|node| node.id)
            .collect();
        let journal_path = valid_prefix(cursor.journal_path, &journal_ids);

        Ok(NavState {
            space_nodes,
            journal_nodes,
            space_path,
            journal_path,
            space_id,
        })
    }

    /// Computes both axis models for presentation.
    pub fn view(&self, state: &NavState) -> NavView {
        let space_axis = build_space_axis(&state.space_nodes, &state.space_path);
        let journal_axis = match state.space_id {
            Some(space_id) => {
                build_journal_axis(&state.journal_nodes, &state.journal_path, space_id)
            }
            None => AxisModel::default(),
        };
        NavView {
            space_axis,
            journal_axis,
        }
    }

    /// Switches the space path. The journal path is always cleared.
    pub fn navigate_space(&self, state: &NavState, path: Vec<SpaceId>) -> NavResult<NavState> {
        self.commit(state, "navigate_space", |cursor| {
            cursor.space_path = path;
            cursor.journal_path.clear();
            Ok(())
        })
    }

    /// Switches the journal path only.
    pub fn navigate_journal(
        &self,
        state: &NavState,
        path: Vec<JournalId>,
    ) -> NavResult<NavState> {
        self.commit(state, "navigate_journal", |cursor| {
            cursor.journal_path = path;
            Ok(())
        })
    }

    /// Creates a space next to the current one.
    ///
    /// Without `parent_id` a root space is created and becomes the whole path.
    /// Otherwise the path is cut after `parent_id` and the new space appended,
    /// or reset to the new space when `parent_id` is not on the path.
    pub fn create_sibling_space(
        &self,
        state: &NavState,
        parent_id: Option<SpaceId>,
        title: &str,
    ) -> NavResult<NavState> {
        let title = title_or(title, &self.config.new_space_title);
        self.commit(state, "create_sibling_space", |cursor| {
            match parent_id {
                None => {
                    let space = self.spaces().create_root(&title)?;
                    cursor.space_path = vec![space.id];
                }
                Some(parent_id) => {
                    let space = self.spaces().create_child(parent_id, &title)?;
                    cursor.space_path = splice_after(&cursor.space_path, parent_id, space.id);
                }
            }
            cursor.journal_path.clear();
            Ok(())
        })
    }

    /// Creates a subspace and appends it to the space path.
    pub fn create_child_space(
        &self,
        state: &NavState,
        parent_id: SpaceId,
        title: &str,
    ) -> NavResult<NavState> {
        let title = title_or(title, &self.config.new_subspace_title);
        self.commit(state, "create_child_space", |cursor| {
            let space = self.spaces().create_child(parent_id, &title)?;
            cursor.space_path.push(space.id);
            cursor.journal_path.clear();
            Ok(())
        })
    }

    /// Deletes a space subtree and every journal owned by a deleted space.
    ///
    /// Both paths are reset; the snapshot re-selects the first root space.
    pub fn delete_space_subtree(&self, state: &NavState, space_id: SpaceId) -> NavResult<NavState> {
        self.commit(state, "delete_space_subtree", |cursor| {
            let deletion = self.spaces().delete_subtree(space_id)?;
            if !deletion.deleted_ids.is_empty() {
                let removed = self.journals().delete_by_owner(&deletion.deleted_ids)?;
                info!(
                    "event=space_subtree_delete module=nav status=ok root={space_id} spaces={} journals={removed}",
                    deletion.deleted_ids.len()
                );
            }
            cursor.space_path.clear();
            cursor.journal_path.clear();
            Ok(())
        })
    }

    /// Creates a journal on the level whose parent is `parent_id`.
    ///
    /// `parent_id == space_id` creates a level-1 journal and makes it the
    /// whole journal path. Any other `parent_id` must be a journal of the same
    /// space; the path is cut after it and the new journal appended.
    /// `space_id` defaults to the active space.
    pub fn create_level_journal(
        &self,
        state: &NavState,
        space_id: Option<SpaceId>,
        parent_id: NodeId,
        template_id: &str,
        index: Option<&str>,
    ) -> NavResult<NavState> {
        let space_id = space_id
            .or(state.space_id)
            .ok_or_else(|| NavError::InvalidArgument("space_id is required".to_string()))?;
        let parent = if parent_id == space_id {
            JournalParent::Space(space_id)
        } else {
            JournalParent::Journal(parent_id)
        };
        let title = self.journal_title(template_id, index);

        self.commit(state, "create_level_journal", |cursor| {
            let journal = self.create_journal_in_space(space_id, parent, template_id, &title)?;
            cursor.journal_path = match parent {
                JournalParent::Space(_) => vec![journal.id],
                JournalParent::Journal(parent_id) => {
                    splice_after(&cursor.journal_path, parent_id, journal.id)
                }
            };
            Ok(())
        })
    }

    /// Creates a sub-journal of the active journal and appends it to the path.
    ///
    /// Without an active journal a level-1 journal is created in the active
    /// space instead.
    pub fn create_child_journal(
        &self,
        state: &NavState,
        active_journal_id: Option<JournalId>,
        template_id: &str,
        index: Option<&str>,
    ) -> NavResult<NavState> {
        let space_id = state
            .space_id
            .ok_or_else(|| NavError::InvalidArgument("no active space".to_string()))?;
        let title = self.journal_title(template_id, index);

        self.commit(state, "create_child_journal", |cursor| {
            match active_journal_id {
                None => {
                    let journal = self.create_journal_in_space(
                        space_id,
                        JournalParent::Space(space_id),
                        template_id,
                        &title,
                    )?;
                    cursor.journal_path = vec![journal.id];
                }
                Some(parent_id) => {
                    let journal = self.create_journal_in_space(
                        space_id,
                        JournalParent::Journal(parent_id),
                        template_id,
                        &title,
                    )?;
                    cursor.journal_path.push(journal.id);
                }
            }
            Ok(())
        })
    }

    /// Deletes a journal subtree and clears the journal path.
    pub fn delete_journal_subtree(
        &self,
        state: &NavState,
        journal_id: JournalId,
    ) -> NavResult<NavState> {
        self.commit(state, "delete_journal_subtree", |cursor| {
            self.journals().delete_subtree(journal_id)?;
            cursor.journal_path.clear();
            Ok(())
        })
    }

    /// Display title from the template catalog plus optional `" (index)"`.
    pub fn journal_title(&self, template_id: &str, index: Option<&str>) -> String {
        let base = self
            .templates
            .get_by_id(template_id)
            .map(|template| template.title)
            .unwrap_or_else(|| self.config.fallback_journal_title.clone());
        match index.map(str::trim).filter(|value| !value.is_empty()) {
            Some(index) => format!("{base} ({index})"),
            None => base,
        }
    }

    /// Creates a journal after checking it lands in `space_id`.
    fn create_journal_in_space(
        &self,
        space_id: SpaceId,
        parent: JournalParent,
        template_id: &str,
        title: &str,
    ) -> NavResult<JournalNode> {
        match parent {
            JournalParent::Space(_) => {
                if self.spaces().get(space_id)?.is_none() {
                    return Err(TreeStoreError::NotFound(space_id).into());
                }
            }
            JournalParent::Journal(parent_id) => {
                let owner = self
                    .journals()
                    .get(parent_id)?
                    .ok_or(TreeStoreError::NotFound(parent_id))?;
                if owner.space_id != space_id {
                    return Err(NavError::InvalidArgument(format!(
                        "journal {parent_id} belongs to space {}, not {space_id}",
                        owner.space_id
                    )));
                }
            }
        }
        Ok(self.journals().create_child(parent, template_id, title)?)
    }

    /// Runs one transition: mutate stores and cursor, persist the cursor,
    /// record history, reload the snapshot.
    fn commit(
        &self,
        state: &NavState,
        op: &'static str,
        mutate: impl FnOnce(&mut NavCursor) -> NavResult<()>,
    ) -> NavResult<NavState> {
        let started_at = Instant::now();
        let mut cursor = state.cursor();

        if let Err(err) = mutate(&mut cursor) {
            error!(
                "event=nav_commit module=nav op={op} status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        let memory = self.memory();
        memory.save_location(&cursor)?;
        if let Err(err) = memory.push_history(NavHistoryEntry::from_cursor(now_epoch_ms(), &cursor))
        {
            warn!("event=nav_history_push module=nav op={op} status=error error={err}");
        }

        let next = self.snapshot(cursor)?;
        info!(
            "event=nav_commit module=nav op={op} status=ok duration_ms={} space_depth={} journal_depth={}",
            started_at.elapsed().as_millis(),
            next.space_path.len(),
            next.journal_path.len()
        );
        Ok(next)
    }
}

/// Longest prefix of `path` whose ids are all in `known`.
fn valid_prefix(path: Vec<NodeId>, known: &HashSet<NodeId>) -> Vec<NodeId> {
    path.into_iter().take_while(|id| known.contains(id)).collect()
}

/// `path` up to and including `parent_id`, then `new_id`; `[new_id]` when
/// `parent_id` is not on the path.
fn splice_after(path: &[NodeId], parent_id: NodeId, new_id: NodeId) -> Vec<NodeId> {
    match path.iter().position(|id| *id == parent_id) {
        Some(index) => {
            let mut spliced = path[..=index].to_vec();
            spliced.push(new_id);
            spliced
        }
        None => vec![new_id],
    }
}

fn title_or(title: &str, fallback: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn splice_cuts_after_parent() {
        let (a, b, c, new) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(splice_after(&[a, b, c], a, new), vec![a, new]);
        assert_eq!(splice_after(&[a, b], Uuid::new_v4(), new), vec![new]);
    }

    #[test]
    fn valid_prefix_stops_at_first_missing_id() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let known: HashSet<NodeId> = [a, c].into_iter().collect();
        assert_eq!(valid_prefix(vec![a, b, c], &known), vec![a]);
    }

    #[test]
    fn blank_title_uses_fallback() {
        assert_eq!(title_or("  ", "New space"), "New space");
        assert_eq!(title_or(" Ops ", "New space"), "Ops");
    }
}
