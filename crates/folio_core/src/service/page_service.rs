//! Landing page content use-case service.
//!
//! # Responsibility
//! - Open edit sessions for one tab text or the human profile.
//! - Read all texts of a slot for the landing page tabs.
//!
//! # Invariants
//! - Never-saved content opens as an empty editable value, not as absence.

use crate::auth::AuthCapability;
use crate::editor::draft_store::Draftable;
use crate::editor::session::{EditSession, SessionError};
use crate::model::page::{HumanProfile, PageTab, PageText, TextSlot};
use crate::repo::page_repo::{PageContent, PageRepository};
use crate::repo::record_repo::RepoResult;
use log::info;
use std::collections::BTreeMap;

/// Use-case service for landing page texts.
pub struct PageService<R: PageRepository> {
    repo: R,
}

impl<R: PageRepository> PageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Wraps the stored `slot` text of `tab` in a viewing session.
    pub fn open_text<A: AuthCapability>(
        &self,
        slot: TextSlot,
        tab: PageTab,
        auth: A,
    ) -> RepoResult<EditSession<A, PageText>> {
        let text = self
            .repo
            .fetch_text(slot, tab)?
            .unwrap_or_else(|| PageText::new(slot, tab, ""));
        info!(
            "event=page_open module=service status=ok slot={} tab={tab}",
            slot.as_str()
        );
        Ok(EditSession::new(Some(text), auth))
    }

    /// Wraps the stored human profile in a viewing session.
    pub fn open_human<A: AuthCapability>(
        &self,
        auth: A,
    ) -> RepoResult<EditSession<A, HumanProfile>> {
        let profile = self.repo.fetch_human()?.unwrap_or_default();
        info!("event=page_open module=service status=ok page=human");
        Ok(EditSession::new(Some(profile), auth))
    }

    /// Every tab's `slot` text; tabs never saved map to an empty string.
    pub fn texts(&self, slot: TextSlot) -> RepoResult<BTreeMap<PageTab, String>> {
        let mut texts = self.repo.list_texts(slot)?;
        for tab in PageTab::ALL {
            texts.entry(tab).or_default();
        }
        Ok(texts)
    }

    /// Saves the session draft through the owned repository.
    pub fn save<'s, A, T>(&self, session: &'s mut EditSession<A, T>) -> Result<&'s T, SessionError>
    where
        A: AuthCapability,
        T: Draftable + PageContent,
    {
        session.save_content(&self.repo)
    }
}
