//! Core domain logic for Folio.
//! This crate owns the record and page models and the in-place editing state
//! machine.

pub mod asset;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use asset::{AssetRef, AssetTarget, AssetUploader, LocalAssetStore, UploadError};
pub use auth::{AuthCapability, StaticAuth};
pub use clock::{format_ist_time, ClockTicker};
pub use config::{ConfigError, FolioConfig};
pub use editor::draft_store::{DraftError, DraftStore, Draftable};
pub use editor::section_editor::SectionOp;
pub use editor::session::{EditSession, PendingSave, PersistFailure, SessionError, SessionState};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::block::{BlockType, ContentBlock, SectionError};
pub use model::page::{HumanProfile, PageError, PageTab, PageText, TextSlot};
pub use model::record::{Record, RecordId, RecordValidationError};
pub use render::{render_record, CommonMarkRenderer, MarkdownRenderer, RenderedRecord};
pub use repo::page_repo::{PageContent, PageRepository, SqlitePageRepository};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::catalog_service::{CatalogEntry, CatalogService};
pub use service::detail_service::{DetailService, DetailServiceError};
pub use service::page_service::PageService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
