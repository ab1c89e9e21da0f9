//! Committed value plus staged working copy.
//!
//! # Responsibility
//! - Hold the committed value shown on the read-only path.
//! - While editing, hold an independent draft and a frozen rollback snapshot.
//!
//! # Invariants
//! - Draft and snapshot exist together or not at all.
//! - Draft and snapshot are separate owned clones; mutating one never
//!   changes the other.
//! - The snapshot is never handed out mutably.
//! - `commit` replaces the committed value in one assignment or not at all.

use crate::model::record::{Record, RecordId, RecordValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Draft store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Committed state is absent, so editing cannot start.
    NoRecord,
    /// A working copy already exists.
    AlreadyEditing,
    /// No working copy exists.
    NotEditing,
    /// Draft id diverged from the snapshot id.
    IdChanged { expected: RecordId, actual: RecordId },
    /// Draft addresses a different page slot than the snapshot.
    KeyChanged { expected: String, actual: String },
    /// Draft failed record validation.
    Invalid(RecordValidationError),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecord => write!(f, "no committed record to edit"),
            Self::AlreadyEditing => write!(f, "record is already being edited"),
            Self::NotEditing => write!(f, "record is not being edited"),
            Self::IdChanged { expected, actual } => {
                write!(f, "draft id {actual} does not match record id {expected}")
            }
            Self::KeyChanged { expected, actual } => {
                write!(f, "draft key `{actual}` does not match `{expected}`")
            }
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for DraftError {
    fn from(value: RecordValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Value that can be staged, edited and committed.
pub trait Draftable: Clone {
    /// Checks that `draft` may replace the committed value captured in `snapshot`.
    fn check_commit(draft: &Self, snapshot: &Self) -> Result<(), DraftError>;

    /// Stable `key=value` label used in log events; never carries content.
    fn edit_key(&self) -> String;
}

impl Draftable for Record {
    fn check_commit(draft: &Self, snapshot: &Self) -> Result<(), DraftError> {
        if draft.id() != snapshot.id() {
            return Err(DraftError::IdChanged {
                expected: snapshot.id(),
                actual: draft.id(),
            });
        }
        draft.validate()?;
        Ok(())
    }

    fn edit_key(&self) -> String {
        format!("record_id={}", self.id())
    }
}

/// Produces `(draft, snapshot)`, two independent copies of `value`.
pub fn begin_edit_copies<T: Clone>(value: Option<&T>) -> Result<(T, T), DraftError> {
    let value = value.ok_or(DraftError::NoRecord)?;
    Ok((value.clone(), value.clone()))
}

/// Returns `draft` as the new committed value once it passes `check_commit`.
pub fn commit_draft<T: Draftable>(draft: T, snapshot: &T) -> Result<T, DraftError> {
    T::check_commit(&draft, snapshot)?;
    Ok(draft)
}

/// Returns `snapshot` verbatim as the restored committed value.
pub fn discard_to<T>(snapshot: T) -> T {
    snapshot
}

#[derive(Debug, Clone)]
struct WorkingCopy<T> {
    draft: T,
    snapshot: T,
}

/// Committed value with an optional in-progress working copy.
#[derive(Debug, Clone)]
pub struct DraftStore<T = Record> {
    committed: Option<T>,
    working: Option<WorkingCopy<T>>,
}

impl<T> Default for DraftStore<T> {
    fn default() -> Self {
        Self {
            committed: None,
            working: None,
        }
    }
}

impl<T: Draftable> DraftStore<T> {
    /// Creates a store from loaded state; `None` means nothing was found.
    pub fn new(committed: Option<T>) -> Self {
        Self {
            committed,
            working: None,
        }
    }

    pub fn committed(&self) -> Option<&T> {
        self.committed.as_ref()
    }

    pub fn draft(&self) -> Option<&T> {
        self.working.as_ref().map(|working| &working.draft)
    }

    pub fn snapshot(&self) -> Option<&T> {
        self.working.as_ref().map(|working| &working.snapshot)
    }

    pub fn is_editing(&self) -> bool {
        self.working.is_some()
    }

    /// Starts editing by cloning the committed value into draft + snapshot.
    pub fn begin_edit(&mut self) -> Result<&T, DraftError> {
        if self.working.is_some() {
            return Err(DraftError::AlreadyEditing);
        }
        let (draft, snapshot) = begin_edit_copies(self.committed.as_ref())?;
        let working = self.working.insert(WorkingCopy { draft, snapshot });
        Ok(&working.draft)
    }

    /// Replaces the draft through a whole-value transformation.
    ///
    /// The closure sees the current draft and returns its successor; on error
    /// the draft is left untouched.
    pub fn update_draft<E>(
        &mut self,
        update: impl FnOnce(&T) -> Result<T, E>,
    ) -> Result<Result<&T, E>, DraftError> {
        let working = self.working.as_mut().ok_or(DraftError::NotEditing)?;
        Ok(match update(&working.draft) {
            Ok(next) => {
                working.draft = next;
                Ok(&working.draft)
            }
            Err(err) => Err(err),
        })
    }

    /// Promotes the draft to committed state and leaves editing.
    pub fn commit(&mut self) -> Result<&T, DraftError> {
        let working = self.working.as_ref().ok_or(DraftError::NotEditing)?;
        let committed = commit_draft(working.draft.clone(), &working.snapshot)?;
        self.working = None;
        Ok(self.committed.insert(committed))
    }

    /// Restores the snapshot as committed state and leaves editing.
    pub fn discard(&mut self) -> Result<&T, DraftError> {
        let working = self.working.take().ok_or(DraftError::NotEditing)?;
        Ok(self.committed.insert(discard_to(working.snapshot)))
    }
}
