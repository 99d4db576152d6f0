// Integration tests for seed parsing and import

use revfeed_core::model::{FieldValue, Revision};
use revfeed_core::upstream::{Catalog, ContainerPath, SnapshotSource};
use revfeed_store::seed::{import_seed, import_seed_str, parse_seed_file, provenance};
use revfeed_store::SqliteUpstream;
use rusqlite::Connection;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn migrated_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = revfeed_store::db::open_migrated(dir.path().join("feed.db")).unwrap();
    (dir, conn)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn test_parse_fixture() {
    // Given: The requirements fixture
    let seed = parse_seed_file(&fixture("requirements.yaml")).unwrap();

    // Then: Every section is read
    assert_eq!(seed.project.id, "ACME");
    assert_eq!(seed.containers.len(), 2);
    assert_eq!(seed.link_roles.len(), 2);
    assert_eq!(seed.items.len(), 5);
    assert!(seed.items.iter().any(|i| i.removed));
}

#[test]
fn test_import_writes_catalog_and_histories() {
    // Given: A migrated database
    let (_dir, mut conn) = migrated_db();

    // When: The fixture is imported
    let summary = import_seed(&fixture("requirements.yaml"), &mut conn).unwrap();

    // Then: The summary reflects the seed
    assert_eq!(summary.digest.len(), 64);
    assert_eq!(summary.items, 5);
    assert_eq!(summary.snapshots, 8);
    assert_eq!(summary.latest_revision, Revision::new(12));

    // And: Rows landed in every table
    assert_eq!(count(&conn, "containers"), 2);
    assert_eq!(count(&conn, "items"), 5);
    assert_eq!(count(&conn, "snapshots"), 8);

    // And: Provenance is recorded under the digest
    let events = provenance::events_for(&conn, &summary.digest).unwrap();
    assert_eq!(events.first().map(String::as_str), Some("seed_import_started"));
    assert_eq!(events.last().map(String::as_str), Some("seed_import_completed"));
    assert_eq!(events.len(), 7);
}

#[test]
fn test_reimport_is_idempotent() {
    // Given: A database holding the fixture
    let (_dir, mut conn) = migrated_db();
    let first = import_seed(&fixture("requirements.yaml"), &mut conn).unwrap();

    // When: The same seed is imported again
    let second = import_seed(&fixture("requirements.yaml"), &mut conn).unwrap();

    // Then: Nothing is duplicated and the digest is unchanged
    assert_eq!(first.digest, second.digest);
    assert_eq!(count(&conn, "items"), 5);
    assert_eq!(count(&conn, "snapshots"), 8);
}

#[test]
fn test_later_seed_extends_history_and_raises_latest() {
    // Given: A database holding the fixture
    let (_dir, mut conn) = migrated_db();
    import_seed(&fixture("requirements.yaml"), &mut conn).unwrap();

    // When: A follow-up seed rewrites WI-4 and references the existing container and role
    let follow_up = r#"
schema_version: 0
project: { id: ACME }
items:
  - id: WI-4
    container: c-req
    type: requirement
    snapshots:
      - { revision: 12, fields: { title: Logout } }
      - { revision: 15, fields: { title: Sign out }, links: [{ target: WI-1, role: relates_to }] }
"#;
    let summary = import_seed_str(follow_up, &mut conn).unwrap();

    // Then: The latest revision moves forward and the history is replaced
    assert_eq!(summary.latest_revision, Revision::new(15));
    let upstream = SqliteUpstream::new(conn);
    let container = upstream
        .resolve_container(&ContainerPath::new("ACME", "_default", "Requirements"))
        .unwrap();
    let item = upstream
        .list_items(&container, &["requirement".to_string()])
        .unwrap()
        .into_iter()
        .find(|i| i.id == "WI-4")
        .unwrap();
    assert_eq!(item.last_revision, Revision::new(15));

    let history = upstream.snapshot_history(&item).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].fields["title"], FieldValue::text("Sign out"));
}

#[test]
fn test_older_seed_does_not_lower_latest() {
    // Given: A database holding the fixture (latest 12)
    let (_dir, mut conn) = migrated_db();
    import_seed(&fixture("requirements.yaml"), &mut conn).unwrap();

    // When: A seed with only old revisions is imported
    let old = r#"
schema_version: 0
project: { id: ACME }
items:
  - { id: WI-5, container: c-req, type: task, last_revision: 2 }
"#;
    let summary = import_seed_str(old, &mut conn).unwrap();

    // Then: The latest revision stays put
    assert_eq!(summary.latest_revision, Revision::new(12));
}

#[test]
fn test_invalid_seed_writes_nothing() {
    // Given: A migrated database
    let (_dir, mut conn) = migrated_db();

    // When: A seed with an undefined role is imported
    let invalid = r#"
schema_version: 0
project: { id: ACME }
containers:
  - { id: c1, space: s, document: d }
items:
  - id: WI-1
    container: c1
    type: task
    snapshots:
      - { revision: 1, links: [{ target: WI-2, role: duplicates }] }
"#;
    let err = import_seed_str(invalid, &mut conn).unwrap_err();

    // Then: The import is rejected before any row is written
    assert_eq!(err.code(), "ERR_INVALID_INPUT");
    assert_eq!(count(&conn, "items"), 0);
    assert_eq!(count(&conn, "provenance_events"), 0);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let (_dir, mut conn) = migrated_db();
    let err = import_seed(&fixture("does-not-exist.yaml"), &mut conn).unwrap_err();
    assert_eq!(err.code(), "ERR_IO");
}
