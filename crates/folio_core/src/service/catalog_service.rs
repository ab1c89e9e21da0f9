//! Catalog listing use-case service.
//!
//! # Responsibility
//! - Project stored records into catalog entries with previews.
//! - Group and filter entries for the listing pages.
//!
//! # Invariants
//! - Entries within a group keep repository order (ascending id).
//! - Category and tag filters match whole entries, ignoring case.

use crate::model::record::{Record, RecordId};
use crate::render::record_preview;
use crate::repo::record_repo::{RecordRepository, RepoResult};
use log::debug;
use std::collections::BTreeMap;

/// Catalog card projection of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: RecordId,
    pub title: String,
    pub group: String,
    pub date: String,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
    pub has_download: bool,
}

impl From<&Record> for CatalogEntry {
    fn from(record: &Record) -> Self {
        let preview = record_preview(record);
        Self {
            id: record.id(),
            title: record.title.clone(),
            group: record.catalog_group(),
            date: record.date.clone(),
            preview_text: preview.text,
            preview_image: preview.image,
            has_download: record.has_download(),
        }
    }
}

/// Use-case service for catalog listings.
pub struct CatalogService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all entries.
    pub fn entries(&self) -> RepoResult<Vec<CatalogEntry>> {
        Ok(self
            .repo
            .list_records()?
            .iter()
            .map(CatalogEntry::from)
            .collect())
    }

    /// Lists entries keyed by catalog group.
    pub fn grouped(&self) -> RepoResult<BTreeMap<String, Vec<CatalogEntry>>> {
        let mut groups: BTreeMap<String, Vec<CatalogEntry>> = BTreeMap::new();
        for entry in self.entries()? {
            groups.entry(entry.group.clone()).or_default().push(entry);
        }
        debug!(
            "event=catalog_group module=service status=ok groups={}",
            groups.len()
        );
        Ok(groups)
    }

    /// Lists entries whose categories contain `name`.
    pub fn by_category(&self, name: &str) -> RepoResult<Vec<CatalogEntry>> {
        self.filtered(|record| contains_ignore_case(&record.category, name))
    }

    /// Lists entries whose tags contain `name`.
    pub fn by_tag(&self, name: &str) -> RepoResult<Vec<CatalogEntry>> {
        self.filtered(|record| contains_ignore_case(&record.tags, name))
    }

    fn filtered(&self, keep: impl Fn(&Record) -> bool) -> RepoResult<Vec<CatalogEntry>> {
        Ok(self
            .repo
            .list_records()?
            .iter()
            .filter(|record| keep(record))
            .map(CatalogEntry::from)
            .collect())
    }
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && values.iter().any(|value| value.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::contains_ignore_case;

    #[test]
    fn contains_ignore_case_matches_whole_entries() {
        let values = vec!["Ceramics".to_string(), "Web".to_string()];
        assert!(contains_ignore_case(&values, " ceramics "));
        assert!(!contains_ignore_case(&values, "cera"));
        assert!(!contains_ignore_case(&values, ""));
    }

    #[test]
    fn contains_ignore_case_folds_non_ascii_letters() {
        let values = vec!["Céramique".to_string()];
        assert!(contains_ignore_case(&values, "céramique"));
        assert!(contains_ignore_case(&values, "CÉRAMIQUE"));
    }
}
