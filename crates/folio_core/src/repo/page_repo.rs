//! Landing page content repository.
//!
//! # Responsibility
//! - Read and upsert per-tab main/footer texts.
//! - Read and upsert the single `human` profile row.
//!
//! # Invariants
//! - Writes are upserts; a missing row is never an error.
//! - Unknown tab names in storage surface as `InvalidData`.

use crate::db::verify_schema;
use crate::model::page::{parse_page_tab, HumanProfile, PageTab, PageText, TextSlot};
use crate::model::record::normalize_optional;
use crate::repo::record_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Repository interface for landing page content.
pub trait PageRepository {
    /// Reads one text; `None` when it was never saved.
    fn fetch_text(&self, slot: TextSlot, tab: PageTab) -> RepoResult<Option<PageText>>;
    fn persist_text(&self, text: &PageText) -> RepoResult<()>;
    /// Reads every saved text of `slot`, keyed by tab.
    fn list_texts(&self, slot: TextSlot) -> RepoResult<BTreeMap<PageTab, String>>;
    fn fetch_human(&self) -> RepoResult<Option<HumanProfile>>;
    fn persist_human(&self, profile: &HumanProfile) -> RepoResult<()>;
}

impl<T: PageRepository + ?Sized> PageRepository for &T {
    fn fetch_text(&self, slot: TextSlot, tab: PageTab) -> RepoResult<Option<PageText>> {
        (**self).fetch_text(slot, tab)
    }

    fn persist_text(&self, text: &PageText) -> RepoResult<()> {
        (**self).persist_text(text)
    }

    fn list_texts(&self, slot: TextSlot) -> RepoResult<BTreeMap<PageTab, String>> {
        (**self).list_texts(slot)
    }

    fn fetch_human(&self) -> RepoResult<Option<HumanProfile>> {
        (**self).fetch_human()
    }

    fn persist_human(&self, profile: &HumanProfile) -> RepoResult<()> {
        (**self).persist_human(profile)
    }
}

/// Page value that knows which repository call stores it.
pub trait PageContent {
    fn persist_to<R: PageRepository + ?Sized>(&self, repo: &R) -> RepoResult<()>;
}

impl PageContent for PageText {
    fn persist_to<R: PageRepository + ?Sized>(&self, repo: &R) -> RepoResult<()> {
        repo.persist_text(self)
    }
}

impl PageContent for HumanProfile {
    fn persist_to<R: PageRepository + ?Sized>(&self, repo: &R) -> RepoResult<()> {
        repo.persist_human(self)
    }
}

/// SQLite-backed page repository.
pub struct SqlitePageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePageRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_schema(conn)?;
        Ok(Self { conn })
    }
}

impl PageRepository for SqlitePageRepository<'_> {
    fn fetch_text(&self, slot: TextSlot, tab: PageTab) -> RepoResult<Option<PageText>> {
        let content = self
            .conn
            .query_row(
                "SELECT content FROM page_texts WHERE slot = ?1 AND tab = ?2;",
                params![slot.as_str(), tab.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(content.map(|content| PageText::new(slot, tab, content)))
    }

    fn persist_text(&self, text: &PageText) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO page_texts (slot, tab, content)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (slot, tab) DO UPDATE SET
                content = excluded.content,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![text.slot().as_str(), text.tab().as_str(), text.content.as_str()],
        )?;
        info!(
            "event=page_persist module=repo status=ok slot={} tab={}",
            text.slot().as_str(),
            text.tab()
        );
        Ok(())
    }

    fn list_texts(&self, slot: TextSlot) -> RepoResult<BTreeMap<PageTab, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tab, content FROM page_texts WHERE slot = ?1;")?;
        let mut rows = stmt.query([slot.as_str()])?;
        let mut texts = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let tab_text: String = row.get("tab")?;
            let tab = parse_page_tab(&tab_text).map_err(|_| {
                RepoError::InvalidData(format!("invalid tab `{tab_text}` in page_texts"))
            })?;
            texts.insert(tab, row.get::<_, String>("content")?);
        }
        Ok(texts)
    }

    fn fetch_human(&self) -> RepoResult<Option<HumanProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT content, image FROM human_profile WHERE id = 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;
        Ok(profile.map(|(content, image)| HumanProfile::new(content, image)))
    }

    fn persist_human(&self, profile: &HumanProfile) -> RepoResult<()> {
        let image = normalize_optional(profile.image.clone());
        self.conn.execute(
            "INSERT INTO human_profile (id, content, image)
             VALUES (1, ?1, ?2)
             ON CONFLICT (id) DO UPDATE SET
                content = excluded.content,
                image = excluded.image,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![profile.content.as_str(), image.as_deref()],
        )?;
        info!(
            "event=page_persist module=repo status=ok page=human has_image={}",
            image.is_some()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRepository, SqlitePageRepository};
    use crate::db::open_db_in_memory;
    use crate::model::page::{HumanProfile, PageTab, PageText, TextSlot};

    #[test]
    fn persist_text_upserts_by_slot_and_tab() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqlitePageRepository::try_new(&conn).unwrap();
        assert!(repo
            .fetch_text(TextSlot::Main, PageTab::Files)
            .unwrap()
            .is_none());

        repo.persist_text(&PageText::new(TextSlot::Main, PageTab::Files, "first"))
            .unwrap();
        repo.persist_text(&PageText::new(TextSlot::Main, PageTab::Files, "second"))
            .unwrap();
        repo.persist_text(&PageText::new(TextSlot::Footer, PageTab::Files, "foot"))
            .unwrap();

        let main = repo.list_texts(TextSlot::Main).unwrap();
        assert_eq!(main.len(), 1);
        assert_eq!(main[&PageTab::Files], "second");
        assert_eq!(
            repo.fetch_text(TextSlot::Footer, PageTab::Files)
                .unwrap()
                .unwrap()
                .content,
            "foot"
        );
    }

    #[test]
    fn human_profile_blank_image_reads_back_as_none() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqlitePageRepository::try_new(&conn).unwrap();
        assert!(repo.fetch_human().unwrap().is_none());

        let mut profile = HumanProfile::new("hello", None);
        profile.image = Some(" ".to_string());
        repo.persist_human(&profile).unwrap();

        let stored = repo.fetch_human().unwrap().unwrap();
        assert_eq!(stored.content, "hello");
        assert_eq!(stored.image, None);
    }
}
