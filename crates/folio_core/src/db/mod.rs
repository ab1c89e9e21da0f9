//! Folio SQLite store: connection bootstrap, migrations and schema checks.
//!
//! # Responsibility
//! - Hand out connections whose schema matches this binary.
//! - Let repositories refuse connections that were not opened through here.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection passes `verify_schema` only at the latest version with
//!   every record and page table present.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{table_exists, verify_schema, REQUIRED_TABLES};

pub type DbResult<T> = Result<T, DbError>;

/// Store bootstrap and schema errors.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection is not at the latest migration (usually never migrated).
    SchemaVersionMismatch { expected: u32, actual: u32 },
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "folio store schema {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaVersionMismatch { expected, actual } => write!(
                f,
                "folio store schema is at version {actual}, expected {expected}"
            ),
            Self::MissingTable(table) => write!(f, "folio store is missing table `{table}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
