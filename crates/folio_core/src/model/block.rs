//! Content block domain model.
//!
//! # Responsibility
//! - Define the typed unit stored in a record's ordered `sections` list.
//! - Parse operator-supplied block type names.
//!
//! # Invariants
//! - A block's `kind` is fixed at creation and has no setter.
//! - New blocks start with empty `content`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire value for text blocks.
pub const BLOCK_TYPE_TEXT: &str = "text";
/// Wire value for image blocks.
pub const BLOCK_TYPE_IMAGE: &str = "image";
/// Wire value for code blocks.
pub const BLOCK_TYPE_CODE: &str = "code";

const SUPPORTED_BLOCK_TYPE_STRINGS: &[&str] = &[BLOCK_TYPE_TEXT, BLOCK_TYPE_IMAGE, BLOCK_TYPE_CODE];

/// Kind of content held by one section block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Literal paragraph text.
    Text,
    /// URL or filename of an uploaded image.
    Image,
    /// Literal source code.
    Code,
}

impl BlockType {
    /// Stable string id used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => BLOCK_TYPE_TEXT,
            Self::Image => BLOCK_TYPE_IMAGE,
            Self::Code => BLOCK_TYPE_CODE,
        }
    }
}

impl Display for BlockType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns supported block type names in display order.
pub fn supported_block_type_strings() -> &'static [&'static str] {
    SUPPORTED_BLOCK_TYPE_STRINGS
}

/// Parses one block type name.
///
/// Surrounding whitespace is ignored; the name itself must be lowercase.
pub fn parse_block_type(value: &str) -> Result<BlockType, SectionError> {
    match value.trim() {
        BLOCK_TYPE_TEXT => Ok(BlockType::Text),
        BLOCK_TYPE_IMAGE => Ok(BlockType::Image),
        BLOCK_TYPE_CODE => Ok(BlockType::Code),
        other => Err(SectionError::InvalidBlockType(other.to_string())),
    }
}

/// One ordered, typed unit of record content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    kind: BlockType,
    /// Literal text for `text`/`code`, URL or filename for `image`.
    #[serde(default)]
    pub content: String,
}

impl ContentBlock {
    /// Creates a block with empty content.
    pub fn empty(kind: BlockType) -> Self {
        Self::new(kind, String::new())
    }

    /// Creates a block with initial content, used by loaders and fixtures.
    pub fn new(kind: BlockType, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn kind(&self) -> BlockType {
        self.kind
    }

    /// Returns a copy of this block with replaced content and the same kind.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self::new(self.kind, content)
    }
}

/// Invalid-input errors for section list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// Block type name is not one of `text|image|code`.
    InvalidBlockType(String),
    /// Index does not address an existing block.
    IndexOutOfBounds { index: usize, len: usize },
    /// Block exists but has a different kind than the operation requires.
    UnexpectedBlockType {
        index: usize,
        expected: BlockType,
        actual: BlockType,
    },
}

impl Display for SectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBlockType(value) => write!(
                f,
                "unsupported block type `{value}`; expected text|image|code"
            ),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "section index {index} out of bounds for length {len}")
            }
            Self::UnexpectedBlockType {
                index,
                expected,
                actual,
            } => write!(
                f,
                "section {index} is a {actual} block; operation requires {expected}"
            ),
        }
    }
}

impl Error for SectionError {}
