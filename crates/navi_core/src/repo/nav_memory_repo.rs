//! Persisted navigation memory: last location and bounded history.
//!
//! # Invariants
//! - History holds at most `limit` entries; the oldest are evicted first.
//! - Reads clamp over-long stored history instead of failing.
//! - A stored history of the wrong shape reads as empty and is replaced on
//!   the next push.

use crate::model::cursor::{NavCursor, NavHistoryEntry};
use crate::repo::kv_repo::{KvError, KvResult, KvStore};
use log::warn;

/// Key/value entry holding the last committed cursor.
pub const LAST_LOCATION_KEY: &str = "nav_last_loc_v2";
/// Key/value entry holding the navigation history log.
pub const HISTORY_KEY: &str = "nav_history_v2";
/// Default history capacity.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Last location plus history, as restored at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavMemory {
    pub last: Option<NavCursor>,
    pub history: Vec<NavHistoryEntry>,
}

/// Reads and writes navigation memory through a key/value store.
pub struct NavMemoryRepository<'kv, K: KvStore> {
    kv: &'kv K,
    limit: usize,
}

impl<'kv, K: KvStore> NavMemoryRepository<'kv, K> {
    pub fn new(kv: &'kv K) -> Self {
        Self::with_limit(kv, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates repository with a custom history capacity (minimum 1).
    pub fn with_limit(kv: &'kv K, limit: usize) -> Self {
        Self {
            kv,
            limit: limit.max(1),
        }
    }

    /// Loads last location and clamped history.
    pub fn load(&self) -> KvResult<NavMemory> {
        Ok(NavMemory {
            last: self.load_location()?,
            history: self.load_history()?,
        })
    }

    pub fn load_location(&self) -> KvResult<Option<NavCursor>> {
        self.kv.get(LAST_LOCATION_KEY)
    }

    pub fn save_location(&self, cursor: &NavCursor) -> KvResult<()> {
        self.kv.set(LAST_LOCATION_KEY, cursor)
    }

    pub fn load_history(&self) -> KvResult<Vec<NavHistoryEntry>> {
        Ok(clamp_history(self.read_history()?, self.limit))
    }

    /// Appends one entry and evicts the oldest beyond capacity.
    pub fn push_history(&self, entry: NavHistoryEntry) -> KvResult<()> {
        let mut history = self.read_history()?;
        history.push(entry);
        self.kv.set(HISTORY_KEY, &clamp_history(history, self.limit))
    }

    fn read_history(&self) -> KvResult<Vec<NavHistoryEntry>> {
        match self.kv.get::<Vec<NavHistoryEntry>>(HISTORY_KEY) {
            Ok(history) => Ok(history.unwrap_or_default()),
            Err(KvError::InvalidData { message, .. }) => {
                warn!(
                    "event=nav_history_read module=nav status=error error_code=history_malformed error={message}"
                );
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

fn clamp_history(mut history: Vec<NavHistoryEntry>, limit: usize) -> Vec<NavHistoryEntry> {
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    history
}
