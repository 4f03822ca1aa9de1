//! Persisted dual-path navigation cursor and history records.

use crate::model::node::{JournalId, SpaceId};
use serde::{Deserialize, Serialize};

/// Current location in both trees, outermost id first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavCursor {
    #[serde(default)]
    pub space_path: Vec<SpaceId>,
    #[serde(default)]
    pub journal_path: Vec<JournalId>,
}

impl NavCursor {
    pub fn new(space_path: Vec<SpaceId>, journal_path: Vec<JournalId>) -> Self {
        Self {
            space_path,
            journal_path,
        }
    }
}

/// One timestamped snapshot in the navigation history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavHistoryEntry {
    /// Epoch ms when the transition committed.
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(default)]
    pub space_path: Vec<SpaceId>,
    #[serde(default)]
    pub journal_path: Vec<JournalId>,
}

impl NavHistoryEntry {
    pub fn from_cursor(timestamp: i64, cursor: &NavCursor) -> Self {
        Self {
            timestamp,
            space_path: cursor.space_path.clone(),
            journal_path: cursor.journal_path.clone(),
        }
    }
}
