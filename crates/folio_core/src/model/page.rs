//! Landing page content model.
//!
//! # Responsibility
//! - Define the per-tab main and footer texts shown beside the catalog.
//! - Define the single `human` profile (text plus portrait image).
//!
//! # Invariants
//! - A page text's `(slot, tab)` key is fixed at creation and has no setter.
//! - A blank profile image is represented as `None`.

use crate::editor::draft_store::{DraftError, Draftable};
use crate::model::record::normalize_optional;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Catalog tab a page text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTab {
    Process,
    Project,
    Files,
    Human,
}

impl PageTab {
    /// Tabs in landing page order.
    pub const ALL: [PageTab; 4] = [Self::Process, Self::Project, Self::Files, Self::Human];

    /// Stable string id used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Project => "project",
            Self::Files => "files",
            Self::Human => "human",
        }
    }
}

impl Display for PageTab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one tab name, ignoring case and surrounding whitespace.
pub fn parse_page_tab(value: &str) -> Result<PageTab, PageError> {
    let normalized = value.trim().to_lowercase();
    PageTab::ALL
        .into_iter()
        .find(|tab| tab.as_str() == normalized)
        .ok_or_else(|| PageError::UnknownTab(value.trim().to_string()))
}

/// Which text of a tab is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSlot {
    /// Text above the tab's catalog list.
    Main,
    /// Text below the tab's catalog list.
    Footer,
}

impl TextSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Footer => "footer",
        }
    }
}

/// Parses a slot name (`main` or `footer`).
pub fn parse_text_slot(value: &str) -> Result<TextSlot, PageError> {
    match value.trim() {
        "main" => Ok(TextSlot::Main),
        "footer" => Ok(TextSlot::Footer),
        other => Err(PageError::UnknownSlot(other.to_string())),
    }
}

/// Page content parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    UnknownTab(String),
    UnknownSlot(String),
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTab(value) => write!(f, "unknown page tab `{value}`"),
            Self::UnknownSlot(value) => write!(f, "unknown text slot `{value}`"),
        }
    }
}

impl Error for PageError {}

/// One editable main or footer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    slot: TextSlot,
    #[serde(rename = "section")]
    tab: PageTab,
    pub content: String,
}

impl PageText {
    pub fn new(slot: TextSlot, tab: PageTab, content: impl Into<String>) -> Self {
        Self {
            slot,
            tab,
            content: content.into(),
        }
    }

    pub fn slot(&self) -> TextSlot {
        self.slot
    }

    pub fn tab(&self) -> PageTab {
        self.tab
    }
}

impl Draftable for PageText {
    fn check_commit(draft: &Self, snapshot: &Self) -> Result<(), DraftError> {
        if (draft.slot, draft.tab) != (snapshot.slot, snapshot.tab) {
            return Err(DraftError::KeyChanged {
                expected: format!("{}/{}", snapshot.slot.as_str(), snapshot.tab),
                actual: format!("{}/{}", draft.slot.as_str(), draft.tab),
            });
        }
        Ok(())
    }

    fn edit_key(&self) -> String {
        format!("slot={} tab={}", self.slot.as_str(), self.tab)
    }
}

/// The `human` tab profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanProfile {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl HumanProfile {
    pub fn new(content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            content: content.into(),
            image: normalize_optional(image),
        }
    }
}

impl Draftable for HumanProfile {
    fn check_commit(_draft: &Self, _snapshot: &Self) -> Result<(), DraftError> {
        Ok(())
    }

    fn edit_key(&self) -> String {
        "page=human".to_string()
    }
}
