//! Detail page use-case service.
//!
//! # Responsibility
//! - Load one record into an edit session.
//! - Route session saves and record creation through the repository.
//!
//! # Invariants
//! - A missing record yields a viewing session with editing disabled, not an
//!   error.
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::auth::AuthCapability;
use crate::editor::session::{EditSession, SessionError};
use crate::model::record::{Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Detail service errors.
#[derive(Debug)]
pub enum DetailServiceError {
    InvalidId(RecordId),
    Repo(RepoError),
}

impl Display for DetailServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "invalid record id: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DetailServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidId(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for DetailServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service for the record detail page.
pub struct DetailService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> DetailService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Fetches record `id` and wraps it in a viewing session.
    ///
    /// # Contract
    /// - Absent record: session has no committed record and `can_edit()` is
    ///   `false`.
    /// - Storage failures are returned; they are not treated as absence.
    pub fn open_session<A: AuthCapability>(
        &self,
        id: RecordId,
        auth: A,
    ) -> Result<EditSession<A>, DetailServiceError> {
        if id <= 0 {
            return Err(DetailServiceError::InvalidId(id));
        }
        let record = self.repo.fetch_record(id)?;
        match &record {
            Some(found) => info!(
                "event=detail_open module=service status=ok record_id={id} sections={}",
                found.sections.len()
            ),
            None => warn!("event=detail_open module=service status=not_found record_id={id}"),
        }
        Ok(EditSession::new(record, auth))
    }

    /// Saves the session draft through the owned repository.
    pub fn save<'s, A: AuthCapability>(
        &self,
        session: &'s mut EditSession<A>,
    ) -> Result<&'s Record, SessionError> {
        session.save(&self.repo)
    }

    /// Creates a new record.
    pub fn create(&self, record: &Record) -> Result<RecordId, DetailServiceError> {
        Ok(self.repo.create_record(record)?)
    }
}
