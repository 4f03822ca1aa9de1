//! Journal template metadata.

use serde::{Deserialize, Serialize};

/// Catalog entry used to title newly created journals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTemplate {
    pub id: String,
    pub title: String,
}

impl JournalTemplate {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
