//! Schema checks run before a repository accepts a connection.

use super::migrations::{current_user_version, latest_version};
use super::{DbError, DbResult};
use log::warn;
use rusqlite::Connection;

/// Tables every repository relies on.
pub const REQUIRED_TABLES: &[&str] = &["records", "record_sections", "page_texts", "human_profile"];

/// Confirms `conn` is at the latest schema version with all tables present.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    let actual = current_user_version(conn)?;
    let expected = latest_version();
    if actual != expected {
        warn!(
            "event=schema_verify module=db status=rejected expected_version={expected} actual_version={actual}"
        );
        return Err(DbError::SchemaVersionMismatch { expected, actual });
    }
    for &table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            warn!("event=schema_verify module=db status=rejected missing_table={table}");
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

/// Whether a table named `table` exists in the main schema.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
