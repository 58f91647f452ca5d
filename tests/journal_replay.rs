use serde_json::json;

use libcatalog::{
    config::CatalogConfig,
    core::catalog::{Catalog, CatalogError, CatalogSnapshotV1},
    member::Member,
    op::{OP_FORMAT_VERSION, StoredOpEnvelope},
};

fn busy_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_book("B1", "The Hobbit", "J.R.R. Tolkien").unwrap();
    catalog.add_book("B2", "1984", "George Orwell").unwrap();
    catalog.add_book("B3", "Emma", "Jane Austen").unwrap();
    catalog.register_member("U1", "Alice").unwrap();
    catalog.register_member("U2", "Bob").unwrap();
    catalog.borrow_book("U1", "B1").unwrap();
    catalog.borrow_book("U2", "B2").unwrap();
    catalog.return_book("U1", "B1").unwrap();
    catalog.borrow_book("U1", "B2").unwrap_err();
    catalog.remove_book("B3").unwrap();
    catalog.undo().unwrap();
    catalog
}

#[test]
fn replaying_json_journal_rebuilds_same_state() {
    let mut source = busy_catalog();
    let lines: Vec<String> = source
        .drain_pending_ops()
        .into_iter()
        .map(|stored| StoredOpEnvelope::new(stored).to_json().unwrap())
        .collect();

    let mut replica = Catalog::new();
    for line in &lines {
        let envelope = StoredOpEnvelope::from_json(line).unwrap();
        assert_eq!(envelope.format_version, OP_FORMAT_VERSION);
        replica.apply_replayed_op(envelope.stored).unwrap();
    }

    assert_eq!(replica.export_snapshot(), source.export_snapshot());
    assert_eq!(replica.undo_len(), 0);
    replica.check_invariants().unwrap();
}

#[test]
fn snapshot_restores_holders_and_counters() {
    let source = busy_catalog();
    let snapshot = source.export_snapshot();

    let mut restored = Catalog::from_snapshot(snapshot.clone(), CatalogConfig::default()).unwrap();

    assert_eq!(restored.export_snapshot(), snapshot);
    assert_eq!(restored.holder_of("B2").map(|m| m.id.as_str()), Some("U2"));
    let op = restored.return_book("U2", "B2").unwrap();
    assert_eq!(op.seq, snapshot.next_op_seq);
}

#[test]
fn snapshot_with_unheld_issued_book_is_rejected() {
    let mut snapshot = busy_catalog().export_snapshot();
    snapshot.members.retain(|m| m.id != "U2");

    assert!(matches!(
        Catalog::from_snapshot(snapshot, CatalogConfig::default()),
        Err(CatalogError::InvariantViolation(_))
    ));
}

#[test]
fn snapshot_over_limit_is_rejected() {
    let books: Vec<_> = (1..=4)
        .map(|i| json!({ "id": format!("B{i}"), "title": "T", "author": "A", "available": false }))
        .collect();
    let snapshot: CatalogSnapshotV1 = serde_json::from_value(json!({
        "next_op_seq": 10,
        "books": books,
        "members": [{ "id": "U1", "name": "Alice", "borrowed": ["B1", "B2", "B3", "B4"] }],
    }))
    .unwrap();

    assert_eq!(
        Catalog::from_snapshot(snapshot, CatalogConfig::default()).unwrap_err(),
        CatalogError::LimitExceeded {
            member: "U1".to_string(),
            limit: 3
        }
    );
}

#[test]
fn snapshot_with_duplicate_member_is_rejected() {
    let snapshot = CatalogSnapshotV1 {
        next_op_seq: 1,
        books: vec![],
        members: vec![Member::new("U1", "Alice"), Member::new("U1", "Bob")],
    };

    assert_eq!(
        Catalog::from_snapshot(snapshot, CatalogConfig::default()).unwrap_err(),
        CatalogError::DuplicateMember("U1".to_string())
    );
}
