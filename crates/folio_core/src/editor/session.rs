//! Edit session state machine for one editable value.
//!
//! # Responsibility
//! - Govern `Viewing <-> Editing` transitions for a single record or page
//!   text.
//! - Route draft mutations through the section editor and draft store.
//! - Run the save (commit) and cancel (discard) protocols.
//!
//! # Invariants
//! - Editing can only start for an authenticated operator and present
//!   committed state.
//! - While viewing there is no draft and no snapshot.
//! - At most one save is in flight; while it is pending, cancel, save and
//!   draft mutations are rejected.
//! - Every failure resolves to `Editing` with an intact draft or `Viewing`
//!   with a valid committed record.

use crate::asset::{AssetRef, AssetTarget, AssetUploader, UploadError};
use crate::auth::AuthCapability;
use crate::editor::draft_store::{commit_draft, DraftError, DraftStore, Draftable};
use crate::editor::section_editor;
use crate::model::block::{BlockType, SectionError};
use crate::model::record::{split_list_input, Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
}

/// Persistence collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistFailure {
    /// The store answered but refused the write.
    Rejected(String),
    /// The store could not be reached or failed mid-write.
    Transport(String),
}

impl Display for PersistFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "save rejected: {message}"),
            Self::Transport(message) => write!(f, "save transport failed: {message}"),
        }
    }
}

impl Error for PersistFailure {}

impl From<RepoError> for PersistFailure {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Transport(err.to_string()),
            other => Self::Rejected(other.to_string()),
        }
    }
}

/// Edit session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Caller lacks the editing capability.
    NotAuthenticated,
    /// No committed record; editing is disabled.
    NotFound,
    AlreadyEditing,
    NotEditing,
    /// A save submission is still in flight.
    SavePending,
    /// `finish_save` without a matching `begin_save`.
    NoPendingSave,
    /// Bad section index or block type.
    InvalidInput(SectionError),
    /// Draft violates record invariants and cannot be committed.
    InvalidDraft(DraftError),
    UploadFailure(UploadError),
    PersistFailure(PersistFailure),
}

impl SessionError {
    /// Operator-facing message for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Log in to edit".to_string(),
            Self::NotFound => "Nothing to edit".to_string(),
            Self::AlreadyEditing => "Already editing".to_string(),
            Self::NotEditing | Self::NoPendingSave => "Not editing".to_string(),
            Self::SavePending => "Save in progress".to_string(),
            Self::InvalidInput(err) => err.to_string(),
            Self::InvalidDraft(err) => err.to_string(),
            Self::UploadFailure(err) => err.user_message(),
            Self::PersistFailure(PersistFailure::Rejected(_)) => "Failed to update".to_string(),
            Self::PersistFailure(PersistFailure::Transport(_)) => {
                "Error updating content".to_string()
            }
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "editing requires an authenticated operator"),
            Self::NotFound => write!(f, "record not found; editing is disabled"),
            Self::AlreadyEditing => write!(f, "session is already editing"),
            Self::NotEditing => write!(f, "session is not editing"),
            Self::SavePending => write!(f, "a save is already in flight"),
            Self::NoPendingSave => write!(f, "no save is in flight"),
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::InvalidDraft(err) => write!(f, "invalid draft: {err}"),
            Self::UploadFailure(err) => write!(f, "{err}"),
            Self::PersistFailure(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::InvalidDraft(err) => Some(err),
            Self::UploadFailure(err) => Some(err),
            Self::PersistFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SectionError> for SessionError {
    fn from(value: SectionError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<DraftError> for SessionError {
    fn from(value: DraftError) -> Self {
        match value {
            DraftError::NoRecord => Self::NotFound,
            DraftError::AlreadyEditing => Self::AlreadyEditing,
            DraftError::NotEditing => Self::NotEditing,
            other => Self::InvalidDraft(other),
        }
    }
}

/// Owned copy of the draft handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave<T = Record> {
    pub value: T,
}

impl PendingSave<Record> {
    pub fn record_id(&self) -> RecordId {
        self.value.id()
    }
}

/// View/edit state machine for one committed value.
pub struct EditSession<A: AuthCapability, T: Draftable = Record> {
    auth: A,
    store: DraftStore<T>,
    save_pending: bool,
}

impl<A: AuthCapability, T: Draftable> EditSession<A, T> {
    /// Creates a viewing session; `None` means nothing was found.
    pub fn new(committed: Option<T>, auth: A) -> Self {
        Self {
            auth,
            store: DraftStore::new(committed),
            save_pending: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.store.is_editing() {
            SessionState::Editing
        } else {
            SessionState::Viewing
        }
    }

    pub fn is_editing(&self) -> bool {
        self.state() == SessionState::Editing
    }

    pub fn is_save_pending(&self) -> bool {
        self.save_pending
    }

    /// Whether `start_edit` would currently succeed.
    pub fn can_edit(&self) -> bool {
        !self.is_editing() && self.store.committed().is_some() && self.auth.is_authenticated()
    }

    /// Committed value shown on the read-only path.
    pub fn committed(&self) -> Option<&T> {
        self.store.committed()
    }

    pub fn draft(&self) -> Option<&T> {
        self.store.draft()
    }

    pub fn snapshot(&self) -> Option<&T> {
        self.store.snapshot()
    }

    /// Value currently on screen: the draft while editing, else committed.
    pub fn current(&self) -> Option<&T> {
        self.store.draft().or_else(|| self.store.committed())
    }

    /// `Viewing -> Editing`.
    pub fn start_edit(&mut self) -> Result<&T, SessionError> {
        if !self.auth.is_authenticated() {
            warn!("event=edit_start module=session status=denied reason=not_authenticated");
            return Err(SessionError::NotAuthenticated);
        }
        let draft = self.store.begin_edit()?;
        info!(
            "event=edit_start module=session status=ok {}",
            draft.edit_key()
        );
        Ok(draft)
    }

    /// `Editing -> Viewing`, restoring the pre-edit snapshot.
    pub fn cancel(&mut self) -> Result<&T, SessionError> {
        if self.save_pending {
            return Err(SessionError::SavePending);
        }
        let restored = self.store.discard()?;
        info!(
            "event=edit_cancel module=session status=ok {}",
            restored.edit_key()
        );
        Ok(restored)
    }

    /// Marks a save as in flight and returns the draft to submit.
    ///
    /// The draft is validated first; an invalid draft never reaches the store.
    pub fn begin_save(&mut self) -> Result<PendingSave<T>, SessionError> {
        if self.save_pending {
            warn!("event=edit_save module=session status=rejected reason=save_pending");
            return Err(SessionError::SavePending);
        }
        let draft = self.store.draft().ok_or(SessionError::NotEditing)?;
        let snapshot = self.store.snapshot().ok_or(SessionError::NotEditing)?;
        let value = commit_draft(draft.clone(), snapshot)?;
        self.save_pending = true;
        info!(
            "event=edit_save module=session status=start {}",
            value.edit_key()
        );
        Ok(PendingSave { value })
    }

    /// Resolves an in-flight save.
    ///
    /// Success commits the draft and returns to viewing. Failure keeps the
    /// session editing with the draft intact.
    pub fn finish_save(
        &mut self,
        outcome: Result<(), PersistFailure>,
    ) -> Result<&T, SessionError> {
        if !self.save_pending {
            return Err(SessionError::NoPendingSave);
        }
        self.save_pending = false;

        if let Err(failure) = outcome {
            error!(
                "event=edit_save module=session status=error {} error={}",
                self.edit_key(),
                failure
            );
            return Err(SessionError::PersistFailure(failure));
        }

        let committed = self.store.commit()?;
        info!(
            "event=edit_save module=session status=ok {}",
            committed.edit_key()
        );
        Ok(committed)
    }

    fn edit_key(&self) -> String {
        self.store
            .committed()
            .map(Draftable::edit_key)
            .unwrap_or_default()
    }

    pub(crate) fn ensure_mutable(&self) -> Result<(), SessionError> {
        if !self.store.is_editing() {
            return Err(SessionError::NotEditing);
        }
        if self.save_pending {
            return Err(SessionError::SavePending);
        }
        Ok(())
    }

    /// Runs `uploader` while editing; the draft is not touched here.
    pub(crate) fn upload(
        &self,
        uploader: &impl AssetUploader,
        target: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AssetRef, SessionError> {
        self.ensure_mutable()?;
        uploader.upload_asset(file_name, bytes).map_err(|err| {
            warn!(
                "event=asset_attach module=session status=error {} target={target} error={err}",
                self.edit_key()
            );
            SessionError::UploadFailure(err)
        })
    }

    pub(crate) fn mutate_draft(
        &mut self,
        operation: &'static str,
        update: impl FnOnce(&T) -> Result<T, SessionError>,
    ) -> Result<&T, SessionError> {
        self.ensure_mutable()?;
        let key = self.edit_key();
        match self.store.update_draft(update)? {
            Ok(draft) => Ok(draft),
            Err(err) => {
                warn!(
                    "event=draft_update module=session status=rejected {key} op={operation} error={err}"
                );
                Err(err)
            }
        }
    }
}

impl<A: AuthCapability> EditSession<A, Record> {
    pub fn record_id(&self) -> Option<RecordId> {
        self.store.committed().map(Record::id)
    }

    /// Replaces the draft title.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&Record, SessionError> {
        let title = title.into();
        self.mutate_draft("set_title", |draft| {
            let mut next = draft.clone();
            next.title = title;
            Ok(next)
        })
    }

    /// Replaces the draft markdown description.
    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<&Record, SessionError> {
        let description = description.into();
        self.mutate_draft("set_description", |draft| {
            let mut next = draft.clone();
            next.description = description;
            Ok(next)
        })
    }

    /// Replaces the free-text draft date.
    pub fn set_date(&mut self, date: impl Into<String>) -> Result<&Record, SessionError> {
        let date = date.into();
        self.mutate_draft("set_date", |draft| {
            let mut next = draft.clone();
            next.date = date;
            Ok(next)
        })
    }

    /// Replaces draft categories from comma-separated operator input.
    pub fn set_category_input(&mut self, input: &str) -> Result<&Record, SessionError> {
        let category = split_list_input(input);
        self.mutate_draft("set_category", |draft| {
            let mut next = draft.clone();
            next.category = category;
            Ok(next)
        })
    }

    /// Replaces draft tags from comma-separated operator input.
    pub fn set_tags_input(&mut self, input: &str) -> Result<&Record, SessionError> {
        let tags = split_list_input(input);
        self.mutate_draft("set_tags", |draft| {
            let mut next = draft.clone();
            next.tags = tags;
            Ok(next)
        })
    }

    /// Appends an empty block of `kind` to the draft sections.
    pub fn append_section(&mut self, kind: BlockType) -> Result<&Record, SessionError> {
        self.mutate_draft("append_section", |draft| {
            let mut next = draft.clone();
            next.sections = section_editor::append(&draft.sections, kind);
            Ok(next)
        })
    }

    /// Appends an empty block from a type name; unknown names are rejected.
    pub fn append_section_named(&mut self, kind: &str) -> Result<&Record, SessionError> {
        self.mutate_draft("append_section", |draft| {
            let mut next = draft.clone();
            next.sections = section_editor::append_named(&draft.sections, kind)?;
            Ok(next)
        })
    }

    /// Removes the draft block at `index`.
    pub fn remove_section(&mut self, index: usize) -> Result<&Record, SessionError> {
        self.mutate_draft("remove_section", |draft| {
            let mut next = draft.clone();
            next.sections = section_editor::remove(&draft.sections, index)?;
            Ok(next)
        })
    }

    /// Replaces the content of the draft block at `index`.
    pub fn set_section_content(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<&Record, SessionError> {
        let content = content.into();
        self.mutate_draft("set_section_content", |draft| {
            let mut next = draft.clone();
            next.sections = section_editor::set_content(&draft.sections, index, content)?;
            Ok(next)
        })
    }

    /// Uploads `bytes` and writes the returned reference into the draft.
    ///
    /// Section targets are checked before the upload runs, so a bad index
    /// never leaves an orphaned asset behind.
    pub fn attach_asset(
        &mut self,
        uploader: &impl AssetUploader,
        target: AssetTarget,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AssetRef, SessionError> {
        self.ensure_mutable()?;
        if let AssetTarget::SectionImage(index) = target {
            let draft = self.store.draft().ok_or(SessionError::NotEditing)?;
            section_editor::expect_kind(&draft.sections, index, BlockType::Image)?;
        }

        let asset = self.upload(uploader, &format!("{target:?}"), file_name, bytes)?;
        let url = asset.url.clone();
        self.mutate_draft("attach_asset", |draft| {
            let mut next = draft.clone();
            match target {
                AssetTarget::Image => next.image = Some(url),
                AssetTarget::Files => next.files = Some(url),
                AssetTarget::SectionImage(index) => {
                    next.sections = section_editor::set_content(&draft.sections, index, url)?;
                }
            }
            Ok(next)
        })?;
        Ok(asset)
    }

    /// Submits the draft to `repo` and resolves the save in one step.
    pub fn save<R>(&mut self, repo: &R) -> Result<&Record, SessionError>
    where
        R: RecordRepository + ?Sized,
    {
        let pending = self.begin_save()?;
        let outcome = repo
            .persist_record(pending.record_id(), &pending.value)
            .map_err(PersistFailure::from);
        self.finish_save(outcome)
    }
}
