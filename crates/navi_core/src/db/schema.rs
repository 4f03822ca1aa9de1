//! `nav_config` table creation and layout versioning.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Layout version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const NAV_CONFIG_SQL: &str = include_str!("nav_config.sql");

/// Creates `nav_config` on a fresh file and stamps the layout version.
///
/// Files already at [`SCHEMA_VERSION`] are left alone.
pub(crate) fn ensure_schema(conn: &Connection) -> DbResult<()> {
    let found = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .map_err(DbError::Schema)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::NewerSchema {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(&format!(
        "BEGIN;\n{NAV_CONFIG_SQL}\nPRAGMA user_version = {SCHEMA_VERSION};\nCOMMIT;"
    ))
    .map_err(DbError::Schema)
}
