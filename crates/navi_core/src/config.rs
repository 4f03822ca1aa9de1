//! Navigation behavior settings.

use crate::repo::nav_memory_repo::DEFAULT_HISTORY_LIMIT;

/// Tunables for [`NavigationService`](crate::NavigationService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavConfig {
    /// Maximum persisted history entries; oldest are evicted first.
    pub history_limit: usize,
    /// Title of the root space created when none exists at startup.
    pub first_space_title: String,
    /// Title for a new root or sibling space when input is blank.
    pub new_space_title: String,
    /// Title for a new child space when input is blank.
    pub new_subspace_title: String,
    /// Journal title when the template id does not resolve.
    pub fallback_journal_title: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            first_space_title: "Space 1".to_string(),
            new_space_title: "New space".to_string(),
            new_subspace_title: "New subspace".to_string(),
            fallback_journal_title: "Journal".to_string(),
        }
    }
}
