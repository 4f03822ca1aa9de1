use navi_core::db::{open_db, open_db_in_memory, DbError};
use navi_core::{
    KvError, KvResult, KvStore, NavConfig, NavCursor, NavHistoryEntry, NavMemoryRepository,
    NavigationService, SqliteKvStore, StaticTemplateCatalog,
};
use serde_json::{json, Value};
use uuid::Uuid;

#[test]
fn cursor_survives_reopen_and_restores_on_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("navi.db");

    let (child, journal) = {
        let conn = open_db(&path).unwrap();
        let service =
            NavigationService::new(SqliteKvStore::new(&conn), StaticTemplateCatalog::builtin());
        let state = service.bootstrap().unwrap();
        let root = state.space_id.unwrap();
        let state = service.create_child_space(&state, root, "Archive").unwrap();
        let child = state.space_id.unwrap();
        let state = service
            .create_level_journal(&state, None, child, "tmpl_in", None)
            .unwrap();
        (child, state.journal_path[0])
    };

    let conn = open_db(&path).unwrap();
    let service =
        NavigationService::new(SqliteKvStore::new(&conn), StaticTemplateCatalog::builtin());
    let restored = service.bootstrap().unwrap();
    assert_eq!(restored.space_id, Some(child));
    assert_eq!(restored.space_path.len(), 2);
    assert_eq!(restored.journal_path, vec![journal]);
    assert_eq!(restored.space_nodes.len(), 2);
}

#[test]
fn restored_cursor_is_truncated_at_deleted_node() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let service = NavigationService::new(kv, StaticTemplateCatalog::builtin());

    let state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();
    let state = service.create_child_space(&state, root, "A").unwrap();
    let a = state.space_id.unwrap();
    let state = service.create_child_space(&state, a, "B").unwrap();
    let b = state.space_id.unwrap();
    service
        .create_level_journal(&state, None, b, "tmpl_out", None)
        .unwrap();

    // Remove `a` behind the orchestrator's back; the stored cursor still names it.
    service.spaces().delete_subtree(a).unwrap();
    let stored = service.load_memory().unwrap().last.unwrap();
    assert_eq!(stored.space_path, vec![root, a, b]);

    let restored = service.bootstrap().unwrap();
    assert_eq!(restored.space_path, vec![root]);
    assert!(restored.journal_path.is_empty());
}

#[test]
fn unreadable_cursor_falls_back_to_first_root() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    kv.set_json("nav_last_loc_v2", &json!({ "spacePath": "not-a-list" }))
        .unwrap();

    let service = NavigationService::new(kv, StaticTemplateCatalog::builtin());
    let state = service.bootstrap().unwrap();
    assert_eq!(state.space_path.len(), 1);
    assert_eq!(state.space_id, Some(state.space_nodes[0].id));
}

#[test]
fn every_transition_appends_history() {
    let conn = open_db_in_memory().unwrap();
    let service =
        NavigationService::new(SqliteKvStore::new(&conn), StaticTemplateCatalog::builtin());

    let state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();
    let state = service.create_child_space(&state, root, "A").unwrap();
    service.navigate_space(&state, vec![root]).unwrap();

    let memory = service.load_memory().unwrap();
    assert_eq!(memory.history.len(), 2);
    assert_eq!(memory.history[1].space_path, vec![root]);
    assert!(memory.history[0].timestamp <= memory.history[1].timestamp);
    assert_eq!(memory.last.unwrap(), NavCursor::new(vec![root], Vec::new()));
}

#[test]
fn history_is_capped_at_one_hundred_entries() {
    let conn = open_db_in_memory().unwrap();
    let service =
        NavigationService::new(SqliteKvStore::new(&conn), StaticTemplateCatalog::builtin());
    let mut state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();

    for _ in 0..105 {
        state = service.navigate_space(&state, vec![root]).unwrap();
    }

    let history = service.load_memory().unwrap().history;
    assert_eq!(history.len(), 100);
}

#[test]
fn configured_history_limit_evicts_oldest() {
    let conn = open_db_in_memory().unwrap();
    let config = NavConfig {
        history_limit: 3,
        ..NavConfig::default()
    };
    let service = NavigationService::with_config(
        SqliteKvStore::new(&conn),
        StaticTemplateCatalog::builtin(),
        config,
    );
    let mut state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();
    let mut created = Vec::new();
    for index in 0..5 {
        state = service
            .create_child_space(&state, root, &format!("S{index}"))
            .unwrap();
        created.push(state.space_id.unwrap());
        state = service.navigate_space(&state, vec![root]).unwrap();
    }

    let history = service.load_memory().unwrap().history;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].space_path, vec![root]);
    assert_eq!(history[1].space_path, vec![root, created[4]]);
    assert_eq!(history[2].space_path, vec![root]);
}

#[test]
fn history_entries_use_compact_timestamp_key() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let memory = NavMemoryRepository::new(&kv);
    let space_id = Uuid::new_v4();

    memory
        .push_history(NavHistoryEntry::from_cursor(
            42,
            &NavCursor::new(vec![space_id], Vec::new()),
        ))
        .unwrap();

    let raw = kv.get_json("nav_history_v2").unwrap().unwrap();
    assert_eq!(raw[0]["t"], json!(42));
    assert_eq!(raw[0]["spacePath"], json!([space_id.to_string()]));
    assert_eq!(raw[0]["journalPath"], json!([]));
}

#[test]
fn oversized_stored_history_is_clamped_on_read() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let entries: Vec<_> = (0..8)
        .map(|t| json!({ "t": t, "spacePath": [], "journalPath": [] }))
        .collect();
    kv.set_json("nav_history_v2", &json!(entries)).unwrap();

    let history = NavMemoryRepository::with_limit(&kv, 5).load_history().unwrap();
    let stamps: Vec<i64> = history.iter().map(|entry| entry.timestamp).collect();
    assert_eq!(stamps, vec![3, 4, 5, 6, 7]);
}

#[test]
fn malformed_history_is_replaced_on_next_transition() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    kv.set_json("nav_history_v2", &json!({ "garbage": true }))
        .unwrap();

    let service = NavigationService::new(kv, StaticTemplateCatalog::builtin());
    assert!(service.load_memory().unwrap().history.is_empty());

    let mut state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();
    for _ in 0..3 {
        state = service.navigate_space(&state, vec![root]).unwrap();
    }

    let history = service.load_memory().unwrap().history;
    assert_eq!(history.len(), 3);
    assert!(kv.get_json("nav_history_v2").unwrap().unwrap().is_array());
}

/// Store whose history writes always fail.
struct BrokenHistoryKv<'conn> {
    inner: SqliteKvStore<'conn>,
}

impl KvStore for BrokenHistoryKv<'_> {
    fn get_json(&self, key: &str) -> KvResult<Option<Value>> {
        self.inner.get_json(key)
    }

    fn set_json(&self, key: &str, value: &Value) -> KvResult<()> {
        if key == "nav_history_v2" {
            return Err(KvError::Db(DbError::row(key, rusqlite::Error::InvalidQuery)));
        }
        self.inner.set_json(key, value)
    }
}

#[test]
fn history_write_failure_does_not_abort_transition() {
    let conn = open_db_in_memory().unwrap();
    let inner = SqliteKvStore::new(&conn);
    let service = NavigationService::new(
        BrokenHistoryKv { inner },
        StaticTemplateCatalog::builtin(),
    );

    let state = service.bootstrap().unwrap();
    let root = state.space_id.unwrap();
    let state = service.create_child_space(&state, root, "Archive").unwrap();
    let child = state.space_id.unwrap();

    assert_eq!(state.space_path, vec![root, child]);
    assert!(service.spaces().get(child).unwrap().is_some());
    let last = NavMemoryRepository::new(&inner).load_location().unwrap().unwrap();
    assert_eq!(last.space_path, vec![root, child]);
    assert!(inner.get_json("nav_history_v2").unwrap().is_none());
}
