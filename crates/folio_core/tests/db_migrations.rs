use folio_core::db::migrations::latest_version;
use folio_core::db::{open_db, open_db_in_memory, verify_schema, DbError, REQUIRED_TABLES};
use folio_core::{RecordRepository, RepoError, SqliteRecordRepository};
use rusqlite::Connection;

const V1_SCHEMA: &str = include_str!("../src/db/migrations/0001_init.sql");

#[test]
fn fresh_store_has_every_record_and_page_table() {
    let conn = open_db_in_memory().unwrap();

    verify_schema(&conn).unwrap();
    for table in REQUIRED_TABLES {
        let columns = column_names(&conn, table);
        assert!(!columns.is_empty(), "table `{table}` has no columns");
    }
    assert_eq!(
        column_names(&conn, "record_sections"),
        vec!["record_id", "position", "block_type", "content"]
    );
}

#[test]
fn v1_store_upgrades_in_place_and_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(V1_SCHEMA).unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 1;
         INSERT INTO records (id, title, group_key) VALUES (7, 'Kiln log', 'Process');
         INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (7, 0, 'text', 'cone 6');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    verify_schema(&conn).unwrap();
    let record = SqliteRecordRepository::try_new(&conn)
        .unwrap()
        .fetch_record(7)
        .unwrap()
        .unwrap();
    assert_eq!(record.title, "Kiln log");
    assert_eq!(record.sections[0].content, "cone 6");
    assert_eq!(record.catalog_group(), "process");
}

#[test]
fn store_written_by_newer_binary_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let future = latest_version() + 1;

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {future};"))
        .unwrap();
    drop(conn);

    assert!(matches!(
        open_db(&path),
        Err(DbError::UnsupportedSchemaVersion { db_version, latest_supported })
            if db_version == future && latest_supported == latest_version()
    ));
}

#[test]
fn repository_refuses_connection_opened_without_migrations() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteRecordRepository::try_new(&conn) {
        Err(RepoError::Db(DbError::SchemaVersionMismatch { expected, actual })) => {
            assert_eq!(expected, latest_version());
            assert_eq!(actual, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be refused"),
    }
}

#[test]
fn verify_schema_names_the_dropped_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE page_texts;").unwrap();

    assert!(matches!(
        verify_schema(&conn),
        Err(DbError::MissingTable("page_texts"))
    ));
}

#[test]
fn sections_reject_orphans_duplicate_positions_and_unknown_types() {
    let conn = open_db_in_memory().unwrap();
    let orphan = conn.execute(
        "INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (404, 0, 'text', 'x');",
        [],
    );
    assert!(orphan.is_err(), "foreign keys must be enforced");

    conn.execute("INSERT INTO records (id, title) VALUES (1, 'Bowl');", [])
        .unwrap();
    conn.execute(
        "INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (1, 0, 'text', 'glaze');",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (1, 0, 'code', 'again');",
        [],
    );
    assert!(duplicate.is_err());
    let video = conn.execute(
        "INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (1, 1, 'video', 'clip.mp4');",
        [],
    );
    assert!(video.is_err());
}

#[test]
fn human_profile_holds_a_single_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO human_profile (id, content) VALUES (1, 'hi');", [])
        .unwrap();
    let second = conn.execute("INSERT INTO human_profile (id, content) VALUES (2, 'x');", []);
    assert!(second.is_err());
}

#[test]
fn group_lookups_use_the_group_index() {
    let conn = open_db_in_memory().unwrap();
    let indexed: String = conn
        .query_row(
            "SELECT tbl_name FROM sqlite_master
             WHERE type = 'index' AND name = 'idx_records_group_key';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexed, "records");
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}
