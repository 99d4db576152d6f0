// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = revfeed_store::migrations::apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    // And: The feed tables exist
    let tables = get_table_names(&conn);
    for expected_table in [
        "schema_version",
        "projects",
        "containers",
        "link_roles",
        "items",
        "snapshots",
        "meta",
        "provenance_events",
    ] {
        assert!(
            tables.contains(&expected_table.to_string()),
            "Missing table: {}",
            expected_table
        );
    }
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let mut conn = setup_test_db();
    revfeed_store::migrations::apply_migrations(&mut conn).unwrap();

    // When: Migrations are applied again
    let result = revfeed_store::migrations::apply_migrations(&mut conn);

    // Then: Nothing is re-applied
    assert!(result.is_ok());
    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, 1);
}

#[test]
fn test_checksums_recorded() {
    // Given: A migrated database
    let mut conn = setup_test_db();
    revfeed_store::migrations::apply_migrations(&mut conn).unwrap();

    // Then: Every applied migration carries a SHA-256 checksum
    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = '001_feed_schema'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64);
}

#[test]
fn test_open_migrated_file_database() {
    // Given: A fresh database file
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.db");

    // When: It is opened twice through the migrating helper
    drop(revfeed_store::db::open_migrated(&path).unwrap());
    let conn = revfeed_store::db::open_migrated(&path).unwrap();

    // Then: The schema is present exactly once
    assert_eq!(
        revfeed_store::migrations::applied_migrations(&conn).unwrap(),
        vec!["001_feed_schema"]
    );
}
