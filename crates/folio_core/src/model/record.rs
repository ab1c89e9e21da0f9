//! Detail record domain model.
//!
//! # Responsibility
//! - Define the canonical record viewed by visitors and edited by the operator.
//! - Normalize loosely shaped wire fields (`category`, `tags`) into one
//!   canonical list representation at the deserialization boundary.
//!
//! # Invariants
//! - `id` is positive and has no setter; it never changes after load.
//! - `category` and `tags` hold trimmed, non-blank entries.
//! - Blank `image`/`files`/`group` values are represented as `None`.

use crate::model::block::ContentBlock;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable record identifier.
pub type RecordId = i64;

const DEFAULT_CATALOG_GROUP: &str = "process";

/// Canonical detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire")]
pub struct Record {
    id: RecordId,
    pub title: String,
    /// Markdown source.
    pub description: String,
    pub category: Vec<String>,
    pub tags: Vec<String>,
    /// Free text, never parsed as a calendar date.
    pub date: String,
    pub image: Option<String>,
    pub files: Option<String>,
    /// Catalog classification key, passed through unchanged.
    pub group: Option<String>,
    /// Serialized as `isfile` to match the catalog schema.
    #[serde(rename = "isfile")]
    pub is_file: bool,
    pub sections: Vec<ContentBlock>,
}

impl Record {
    /// Creates an empty record with a caller-provided stable id.
    pub fn new(id: RecordId) -> Result<Self, RecordValidationError> {
        let record = Self {
            id,
            title: String::new(),
            description: String::new(),
            category: Vec::new(),
            tags: Vec::new(),
            date: String::new(),
            image: None,
            files: None,
            group: None,
            is_file: false,
            sections: Vec::new(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id <= 0 {
            return Err(RecordValidationError::InvalidId(self.id));
        }
        for (field, values) in [("category", &self.category), ("tags", &self.tags)] {
            if values.iter().any(|value| value.trim().is_empty()) {
                return Err(RecordValidationError::BlankListEntry(field));
            }
        }
        for (field, value) in [
            ("image", &self.image),
            ("files", &self.files),
            ("group", &self.group),
        ] {
            if value.as_deref().is_some_and(|inner| inner.trim().is_empty()) {
                return Err(RecordValidationError::BlankOptionalField(field));
            }
        }
        Ok(())
    }

    /// Lowercase catalog group, defaulting to `process`.
    pub fn catalog_group(&self) -> String {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_CATALOG_GROUP.to_string())
    }

    /// Whether the record exposes a downloadable file.
    pub fn has_download(&self) -> bool {
        self.is_file && self.files.is_some()
    }
}

/// Record validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    InvalidId(RecordId),
    BlankListEntry(&'static str),
    /// `Some("")` where a blank value must be `None`.
    BlankOptionalField(&'static str),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "record id must be positive, got {id}"),
            Self::BlankListEntry(field) => write!(f, "{field} must not contain blank entries"),
            Self::BlankOptionalField(field) => write!(f, "{field} must be absent, not blank"),
        }
    }
}

impl Error for RecordValidationError {}

/// Splits operator list input (`"a, b ,c"`) into trimmed, non-blank entries.
pub fn split_list_input(input: &str) -> Vec<String> {
    normalize_list(input.split(','))
}

fn normalize_list<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps blank strings to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|inner| !inner.trim().is_empty())
}

/// Lax wire shape accepted on load.
#[derive(Deserialize)]
struct RecordWire {
    id: RecordId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<StringOrList>,
    #[serde(default)]
    tags: Option<StringOrList>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    files: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default, rename = "isfile")]
    is_file: Option<bool>,
    #[serde(default)]
    sections: Option<Vec<ContentBlock>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<Option<String>>),
}

impl StringOrList {
    fn into_canonical(self) -> Vec<String> {
        match self {
            Self::One(value) => normalize_list([value.as_str()]),
            Self::Many(values) => normalize_list(values.iter().flatten().map(String::as_str)),
        }
    }
}

impl TryFrom<RecordWire> for Record {
    type Error = RecordValidationError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        let record = Self {
            id: wire.id,
            title: wire.title.unwrap_or_default(),
            description: wire.description.unwrap_or_default(),
            category: wire
                .category
                .map(StringOrList::into_canonical)
                .unwrap_or_default(),
            tags: wire
                .tags
                .map(StringOrList::into_canonical)
                .unwrap_or_default(),
            date: wire.date.unwrap_or_default(),
            image: normalize_optional(wire.image),
            files: normalize_optional(wire.files),
            group: normalize_optional(wire.group),
            is_file: wire.is_file.unwrap_or(false),
            sections: wire.sections.unwrap_or_default(),
        };
        record.validate()?;
        Ok(record)
    }
}
