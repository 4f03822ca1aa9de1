//! SQLite backing for the navigation key/value table.
//!
//! The database holds a single `nav_config` table. Its layout version lives in
//! `PRAGMA user_version`; files stamped by a newer build are refused.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::SCHEMA_VERSION;

pub type DbResult<T> = Result<T, DbError>;

/// Failures below the key/value layer.
#[derive(Debug)]
pub enum DbError {
    /// Opening or configuring the connection failed.
    Connect(rusqlite::Error),
    /// Creating `nav_config` or stamping its version failed.
    Schema(rusqlite::Error),
    /// Reading or writing one `nav_config` row failed.
    Row {
        key: String,
        source: rusqlite::Error,
    },
    /// File layout is newer than this build understands.
    NewerSchema { found: u32, supported: u32 },
}

impl DbError {
    /// Wraps a row-level failure with the key it touched.
    pub fn row(key: &str, source: rusqlite::Error) -> Self {
        Self::Row {
            key: key.to_string(),
            source,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "cannot open navigation database: {err}"),
            Self::Schema(err) => write!(f, "cannot prepare nav_config table: {err}"),
            Self::Row { key, source } => write!(f, "nav_config row `{key}` failed: {source}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "navigation database layout {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect(err) | Self::Schema(err) => Some(err),
            Self::Row { source, .. } => Some(source),
            Self::NewerSchema { .. } => None,
        }
    }
}
