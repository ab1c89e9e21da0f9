//! Landing page editing on top of `EditSession`.
//!
//! Page texts and the human profile reuse the record session's draft,
//! snapshot and single-flight save protocol; only setters and the save
//! target differ.

use crate::asset::{AssetRef, AssetUploader};
use crate::auth::AuthCapability;
use crate::editor::draft_store::Draftable;
use crate::editor::session::{EditSession, PersistFailure, SessionError};
use crate::model::page::{HumanProfile, PageText};
use crate::repo::page_repo::{PageContent, PageRepository};

impl<A: AuthCapability> EditSession<A, PageText> {
    /// Replaces the draft text.
    pub fn set_text(&mut self, content: impl Into<String>) -> Result<&PageText, SessionError> {
        let content = content.into();
        self.mutate_draft("set_text", |draft| {
            let mut next = draft.clone();
            next.content = content;
            Ok(next)
        })
    }
}

impl<A: AuthCapability> EditSession<A, HumanProfile> {
    /// Replaces the draft profile text.
    pub fn set_profile_text(
        &mut self,
        content: impl Into<String>,
    ) -> Result<&HumanProfile, SessionError> {
        let content = content.into();
        self.mutate_draft("set_profile_text", |draft| {
            let mut next = draft.clone();
            next.content = content;
            Ok(next)
        })
    }

    /// Uploads a portrait and writes its reference into the draft.
    pub fn attach_portrait(
        &mut self,
        uploader: &impl AssetUploader,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AssetRef, SessionError> {
        let asset = self.upload(uploader, "portrait", file_name, bytes)?;
        let url = asset.url.clone();
        self.mutate_draft("attach_portrait", |draft| {
            let mut next = draft.clone();
            next.image = Some(url);
            Ok(next)
        })?;
        Ok(asset)
    }
}

impl<A, T> EditSession<A, T>
where
    A: AuthCapability,
    T: Draftable + PageContent,
{
    /// Submits the draft to `repo` and resolves the save in one step.
    pub fn save_content<R>(&mut self, repo: &R) -> Result<&T, SessionError>
    where
        R: PageRepository + ?Sized,
    {
        let pending = self.begin_save()?;
        let outcome = pending.value.persist_to(repo).map_err(PersistFailure::from);
        self.finish_save(outcome)
    }
}
