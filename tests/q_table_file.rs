//! Q-table text files written and read back

use std::fs;

use marl::{
    StateId,
    identifiers::ActionId,
    q_learning::{QEntry, QStore, TABLE_HEADER},
};
use tempfile::TempDir;

#[test]
fn save_then_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q.txt");

    let store = QStore::from_entries([
        QEntry::new(StateId::new(0), ActionId::new(0), 0.123456789012345, 0.01),
        QEntry::new(StateId::new(0), ActionId::new(1), -2.5, 0.0),
        QEntry::new(StateId::new(4), ActionId::new(7), 1.0, 3.2),
    ]);
    store.save(&path).expect("Failed to save");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(TABLE_HEADER));
    assert!(text.contains("0 0 0.123456789012345 0.010000000000000"));

    let loaded = QStore::load(&path);
    assert_eq!(loaded, store);
}

#[test]
fn scan_stops_at_malformed_line() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q.txt");
    fs::write(
        &path,
        "# comment\n0 0 1.5 0.1\n\n1 1 2.5 0.2\n1 two 3.5 0.3\n2 2 4.5 0.4\n",
    )
    .unwrap();

    let loaded = QStore::load(&path);
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get(StateId::new(1), ActionId::new(1)).unwrap().value,
        2.5
    );
    assert!(loaded.get(StateId::new(2), ActionId::new(2)).is_none());
}

#[test]
fn bare_header_line_is_skipped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q.txt");
    fs::write(&path, "state action value confidence\n0 0 1.5 0.1\n1 1 2.5 0.2\n").unwrap();

    let loaded = QStore::load(&path);
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get(StateId::new(0), ActionId::new(0)).unwrap().value,
        1.5
    );
}

#[test]
fn missing_file_gives_empty_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let loaded = QStore::load(temp_dir.path().join("absent.txt"));
    assert!(loaded.is_empty());
}
