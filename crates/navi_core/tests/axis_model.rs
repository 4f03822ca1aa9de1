use navi_core::db::open_db_in_memory;
use navi_core::{
    build_journal_axis, build_space_axis, JournalNode, JournalStore, SpaceNode, SpaceStore,
    SqliteKvStore,
};
use uuid::Uuid;

fn space(title: &str, parent: Option<&SpaceNode>, created_at: i64) -> SpaceNode {
    SpaceNode::new(parent.map(|node| node.id), title, created_at)
}

fn with_counts(mut nodes: Vec<SpaceNode>) -> Vec<SpaceNode> {
    navi_core::repo::tree_repo::recompute_child_counts(&mut nodes);
    nodes
}

#[test]
fn nested_space_label_uses_sibling_positions() {
    let a = space("A", None, 1);
    let b = space("B", None, 2);
    let a1 = space("A1", Some(&a), 1);
    let nodes = with_counts(vec![b.clone(), a1.clone(), a.clone()]);

    let axis = build_space_axis(&nodes, &[a.id, a1.id]);

    let active = axis.active.unwrap();
    assert_eq!(active.id, a1.id);
    assert_eq!(active.label, "1.1. A1");
    assert_eq!(axis.parent_id, Some(a.id));
    assert!(axis.can_go_prev);
    assert_eq!(axis.parent_path, vec![a.id]);
    assert!(!axis.is_top_level);
    assert_eq!(axis.siblings.len(), 1);
    assert!(axis.children.is_empty());
}

#[test]
fn root_siblings_are_labelled_in_creation_order() {
    let a = space("A", None, 1);
    let b = space("B", None, 2);
    let a1 = space("A1", Some(&a), 3);
    let nodes = with_counts(vec![b.clone(), a1.clone(), a.clone()]);

    let axis = build_space_axis(&nodes, &[b.id]);

    let labels: Vec<&str> = axis.siblings.iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, vec!["1. A", "2. B"]);
    assert_eq!(axis.siblings[0].child_count, 1);
    assert_eq!(axis.active.unwrap().label, "2. B");
    assert!(!axis.can_go_prev);
    assert!(axis.is_top_level);
    assert_eq!(axis.parent_id, None);
    assert_eq!(axis.parent_path, vec![b.id]);
}

#[test]
fn equal_timestamps_fall_back_to_title_order() {
    let beta = space("beta", None, 5);
    let alpha = space("Alpha", None, 5);
    let nodes = vec![beta.clone(), alpha.clone()];

    let axis = build_space_axis(&nodes, &[]);

    let titles: Vec<&str> = axis.siblings.iter().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "beta"]);
}

#[test]
fn ordering_is_stable_when_siblings_are_added() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let spaces = SpaceStore::new(&kv);

    let root = spaces.create_root("Root").unwrap();
    let first = spaces.create_child(root.id, "Zeta").unwrap();
    let second = spaces.create_child(root.id, "Alpha").unwrap();

    let before = build_space_axis(&spaces.list_all().unwrap(), &[root.id, first.id]);
    spaces.create_child(root.id, "Middle").unwrap();
    let after = build_space_axis(&spaces.list_all().unwrap(), &[root.id, first.id]);

    assert_eq!(before.active.as_ref().unwrap().label, "1.1. Zeta");
    assert_eq!(after.active.as_ref().unwrap().label, "1.1. Zeta");
    assert_eq!(after.siblings[1].id, second.id);
    assert_eq!(after.siblings.len(), 3);
    assert_eq!(after.siblings[2].label, "1.3. Middle");
}

#[test]
fn empty_path_selects_first_root() {
    let a = space("A", None, 10);
    let b = space("B", None, 20);
    let nodes = vec![b.clone(), a.clone()];

    let axis = build_space_axis(&nodes, &[]);

    assert_eq!(axis.active_id, Some(a.id));
    assert_eq!(axis.path, vec![a.id]);
    assert!(!axis.can_go_prev);
}

#[test]
fn empty_tree_yields_empty_axis() {
    let axis = build_space_axis(&[], &[]);

    assert_eq!(axis.active_id, None);
    assert!(axis.active.is_none());
    assert!(axis.siblings.is_empty());
    assert!(axis.children.is_empty());
    assert!(!axis.can_go_prev);
}

#[test]
fn active_children_are_listed_with_labels() {
    let a = space("A", None, 1);
    let a1 = space("A1", Some(&a), 2);
    let a2 = space("A2", Some(&a), 3);
    let nodes = with_counts(vec![a2.clone(), a.clone(), a1.clone()]);

    let axis = build_space_axis(&nodes, &[a.id]);

    let labels: Vec<&str> = axis.children.iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, vec!["1.1. A1", "1.2. A2"]);
    assert_eq!(axis.children_count(), 2);
    assert_eq!(axis.active.unwrap().child_count, 2);
}

#[test]
fn level1_journal_cannot_go_back() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let spaces = SpaceStore::new(&kv);
    let journals = JournalStore::new(&kv);

    let office = spaces.create_root("Office").unwrap();
    let incoming = journals.create_level1(office.id, "tmpl_in", "Incoming").unwrap();
    let nodes = journals.list_all().unwrap();

    let axis = build_journal_axis(&nodes, &[incoming.id], office.id);

    assert_eq!(axis.active.as_ref().unwrap().label, "1. Incoming");
    assert_eq!(axis.parent_id, Some(office.id));
    assert!(axis.is_top_level);
    assert!(!axis.can_go_prev);
}

#[test]
fn nested_journal_can_go_back_to_its_parent() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let spaces = SpaceStore::new(&kv);
    let journals = JournalStore::new(&kv);

    let office = spaces.create_root("Office").unwrap();
    journals.create_level1(office.id, "tmpl_in", "Incoming").unwrap();
    let orders = journals.create_level1(office.id, "tmpl_ord", "Orders").unwrap();
    let nested = journals
        .create_sub_journal(orders.id, "tmpl_note", "Memos")
        .unwrap();
    let nodes = journals.list_all().unwrap();

    let axis = build_journal_axis(&nodes, &[orders.id, nested.id], office.id);

    assert_eq!(axis.active.as_ref().unwrap().label, "2.1. Memos");
    assert_eq!(axis.parent_id, Some(orders.id));
    assert!(axis.can_go_prev);
    assert_eq!(axis.parent_path, vec![orders.id]);
}

#[test]
fn journal_axis_ignores_other_spaces() {
    let office = space("Office", None, 1);
    let home = space("Home", None, 2);
    let office_journal = JournalNode::level1(office.id, "tmpl_in", "Incoming", 1);
    let home_journal = JournalNode::level1(home.id, "tmpl_out", "Outgoing", 2);
    let nodes = vec![office_journal.clone(), home_journal.clone()];

    let axis = build_journal_axis(&nodes, &[], home.id);

    assert_eq!(axis.active_id, Some(home_journal.id));
    assert_eq!(axis.siblings.len(), 1);
    assert_eq!(axis.active.unwrap().label, "1. Outgoing");

    let empty = build_journal_axis(&nodes, &[], Uuid::new_v4());
    assert_eq!(empty.active_id, None);
    assert!(empty.siblings.is_empty());
}
