//! Plain-text previews for catalog listings.
//!
//! Rules:
//! - `image`: the record cover image, else the first markdown image path in
//!   the description, else the first non-empty image section.
//! - `text`: markdown symbols removed, whitespace collapsed, capped length.

use crate::model::block::BlockType;
use crate::model::record::Record;
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)\s]+)[^)]*\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!|]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Preview projection of markdown content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    pub text: Option<String>,
    pub image: Option<String>,
}

/// Derives a preview from markdown source.
pub fn derive_markdown_preview(content: &str) -> MarkdownPreview {
    let image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = collapsed.trim();
    let text = (!trimmed.is_empty()).then(|| trimmed.chars().take(PREVIEW_MAX_CHARS).collect());

    MarkdownPreview { text, image }
}

/// Derives a catalog preview for a whole record.
pub fn record_preview(record: &Record) -> MarkdownPreview {
    let mut preview = derive_markdown_preview(&record.description);
    preview.image = record
        .image
        .clone()
        .or(preview.image)
        .or_else(|| {
            record
                .sections
                .iter()
                .find(|block| block.kind() == BlockType::Image && !block.content.trim().is_empty())
                .map(|block| block.content.trim().to_string())
        });
    preview
}
