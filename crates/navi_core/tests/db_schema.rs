use navi_core::db::{open_db, open_db_in_memory, DbError, SCHEMA_VERSION};
use navi_core::{KvStore, SpaceStore, SqliteKvStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_nav_config_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    let columns = table_columns(&conn, "nav_config");
    assert!(columns.contains(&"key".to_string()));
    assert!(columns.contains(&"value_json".to_string()));
    assert!(columns.contains(&"updated_at".to_string()));
}

#[test]
fn file_database_keeps_nodes_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("navi.db");

    let root_id = {
        let conn = open_db(&path).unwrap();
        let kv = SqliteKvStore::new(&conn);
        SpaceStore::new(&kv).create_root("Archive").unwrap().id
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    let kv = SqliteKvStore::new(&conn);
    let reloaded = SpaceStore::new(&kv).get(root_id).unwrap().unwrap();
    assert_eq!(reloaded.title, "Archive");
    assert!(kv.get_json("spaces_nodes_v2").unwrap().is_some());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let name: String = row.get(1).unwrap();
        columns.push(name);
    }
    columns
}
