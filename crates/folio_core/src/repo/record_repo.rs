//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide fetch and whole-record replace APIs over `records` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before SQL mutations.
//! - `persist_record` replaces scalar fields and the full section list in one
//!   transaction; a failure leaves the stored record untouched.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{verify_schema, DbError};
use crate::model::block::{parse_block_type, BlockType, ContentBlock};
use crate::model::record::{normalize_optional, Record, RecordId, RecordValidationError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    tags,
    date,
    image,
    files,
    group_key,
    is_file
FROM records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(RecordId),
    AlreadyExists(RecordId),
    /// Target id and record id disagree on a whole-record replace.
    IdMismatch {
        target_id: RecordId,
        record_id: RecordId,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "record already exists: {id}"),
            Self::IdMismatch {
                target_id,
                record_id,
            } => write!(
                f,
                "record id {record_id} does not match target id {target_id}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for detail records.
pub trait RecordRepository {
    /// Reads one record; `None` when no record has this id.
    fn fetch_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    /// Replaces the stored record `id` with `record`, including sections.
    fn persist_record(&self, id: RecordId, record: &Record) -> RepoResult<()>;
    fn create_record(&self, record: &Record) -> RepoResult<RecordId>;
    /// Lists all records ordered by id.
    fn list_records(&self) -> RepoResult<Vec<Record>>;
}

impl<T: RecordRepository + ?Sized> RecordRepository for &T {
    fn fetch_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        (**self).fetch_record(id)
    }

    fn persist_record(&self, id: RecordId, record: &Record) -> RepoResult<()> {
        (**self).persist_record(id, record)
    }

    fn create_record(&self, record: &Record) -> RepoResult<RecordId> {
        (**self).create_record(record)
    }

    fn list_records(&self) -> RepoResult<Vec<Record>> {
        (**self).list_records()
    }
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_schema(conn)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn fetch_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let record = stmt
            .query_row([id], |row| Ok(parse_record_row(row)))
            .optional()?;
        match record {
            Some(parsed) => {
                let mut record = parsed?;
                record.sections = load_sections(self.conn, id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn persist_record(&self, id: RecordId, record: &Record) -> RepoResult<()> {
        if record.id() != id {
            return Err(RepoError::IdMismatch {
                target_id: id,
                record_id: record.id(),
            });
        }
        record.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE records
             SET
                title = ?2,
                description = ?3,
                category = ?4,
                tags = ?5,
                date = ?6,
                image = ?7,
                files = ?8,
                group_key = ?9,
                is_file = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                record.title.as_str(),
                record.description.as_str(),
                encode_list(&record.category)?,
                encode_list(&record.tags)?,
                record.date.as_str(),
                record.image.as_deref(),
                record.files.as_deref(),
                record.group.as_deref(),
                record.is_file,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.execute("DELETE FROM record_sections WHERE record_id = ?1;", [id])?;
        insert_sections(&tx, id, &record.sections)?;
        if let Err(err) = tx.commit() {
            error!(
                "event=record_persist module=repo status=error record_id={id} error={err}"
            );
            return Err(err.into());
        }

        info!(
            "event=record_persist module=repo status=ok record_id={id} sections={}",
            record.sections.len()
        );
        Ok(())
    }

    fn create_record(&self, record: &Record) -> RepoResult<RecordId> {
        record.validate()?;
        let id = record.id();

        let tx = self.conn.unchecked_transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM records WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists == 1 {
            return Err(RepoError::AlreadyExists(id));
        }

        tx.execute(
            "INSERT INTO records (
                id,
                title,
                description,
                category,
                tags,
                date,
                image,
                files,
                group_key,
                is_file
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id,
                record.title.as_str(),
                record.description.as_str(),
                encode_list(&record.category)?,
                encode_list(&record.tags)?,
                record.date.as_str(),
                record.image.as_deref(),
                record.files.as_deref(),
                record.group.as_deref(),
                record.is_file,
            ],
        )?;
        insert_sections(&tx, id, &record.sections)?;
        tx.commit()?;

        info!("event=record_create module=repo status=ok record_id={id}");
        Ok(id)
    }

    fn list_records(&self) -> RepoResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = parse_record_row(row)?;
            record.sections = load_sections(self.conn, record.id())?;
            records.push(record);
        }
        Ok(records)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id: RecordId = row.get("id")?;
    let mut record = Record::new(id)?;
    record.title = row.get("title")?;
    record.description = row.get("description")?;
    record.category = decode_list(id, "category", &row.get::<_, String>("category")?)?;
    record.tags = decode_list(id, "tags", &row.get::<_, String>("tags")?)?;
    record.date = row.get("date")?;
    record.image = normalize_optional(row.get("image")?);
    record.files = normalize_optional(row.get("files")?);
    record.group = normalize_optional(row.get("group_key")?);
    record.is_file = match row.get::<_, i64>("is_file")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_file value `{other}` in records.is_file for id {id}"
            )));
        }
    };
    record.validate()?;
    Ok(record)
}

fn load_sections(conn: &Connection, record_id: RecordId) -> RepoResult<Vec<ContentBlock>> {
    let mut stmt = conn.prepare(
        "SELECT block_type, content
         FROM record_sections
         WHERE record_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([record_id])?;
    let mut sections = Vec::new();
    while let Some(row) = rows.next()? {
        let type_text: String = row.get("block_type")?;
        let kind: BlockType = parse_block_type(&type_text).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid block type `{type_text}` in record_sections for id {record_id}"
            ))
        })?;
        sections.push(ContentBlock::new(kind, row.get::<_, String>("content")?));
    }
    Ok(sections)
}

fn insert_sections(
    tx: &Transaction<'_>,
    record_id: RecordId,
    sections: &[ContentBlock],
) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO record_sections (record_id, position, block_type, content)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, block) in sections.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| RepoError::InvalidData(format!("section position {position} overflows")))?;
        stmt.execute(params![
            record_id,
            position,
            block.kind().as_str(),
            block.content.as_str()
        ])?;
    }
    Ok(())
}

fn encode_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode list: {err}")))
}

fn decode_list(id: RecordId, column: &str, raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid JSON list in records.{column} for id {id}: {err}"
        ))
    })
}
