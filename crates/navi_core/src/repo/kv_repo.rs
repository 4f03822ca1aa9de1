//! Key/value store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist named JSON values, one row per key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set` is atomic per key (single UPSERT statement).
//! - A missing key and a stored JSON `null` both read back as `None`.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Errors from key/value persistence.
#[derive(Debug)]
pub enum KvError {
    /// SQLite failure, tagged with the row key.
    Db(DbError),
    /// Value could not be encoded to or decoded from JSON.
    Json(serde_json::Error),
    /// Stored value exists but does not match the expected shape.
    InvalidData { key: String, message: String },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid stored value for `{key}`: {message}")
            }
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for KvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Named-value store used by every navigation collection.
pub trait KvStore {
    /// Loads the raw JSON value stored under `key`.
    fn get_json(&self, key: &str) -> KvResult<Option<Value>>;
    /// Replaces the value stored under `key`.
    fn set_json(&self, key: &str, value: &Value) -> KvResult<()>;

    /// Loads and decodes a typed value.
    fn get<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get_json(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| KvError::InvalidData {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
        }
    }

    /// Encodes and stores a typed value.
    fn set<T: Serialize>(&self, key: &str, value: &T) -> KvResult<()>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set_json(key, &value)
    }
}

impl<K: KvStore> KvStore for &K {
    fn get_json(&self, key: &str) -> KvResult<Option<Value>> {
        (**self).get_json(key)
    }

    fn set_json(&self, key: &str, value: &Value) -> KvResult<()> {
        (**self).set_json(key, value)
    }
}

/// SQLite-backed key/value store over the `nav_config` table.
#[derive(Clone, Copy)]
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Creates store from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get_json(&self, key: &str) -> KvResult<Option<Value>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT value_json FROM nav_config WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| DbError::row(key, err))?;

        match text {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|err| KvError::InvalidData {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
        }
    }

    fn set_json(&self, key: &str, value: &Value) -> KvResult<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO nav_config (key, value_json, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value_json = excluded.value_json,
                updated_at = excluded.updated_at;",
            params![key, text],
        )
        .map_err(|err| DbError::row(key, err))?;
        Ok(())
    }
}
