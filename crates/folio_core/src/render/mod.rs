//! Read-only render pipeline.
//!
//! # Responsibility
//! - Convert markdown descriptions into displayable HTML.
//! - Build the read-only view of a committed record.
//!
//! # Invariants
//! - Rendering is pure: same input, same output, no side effects.
//! - Raw HTML in markdown is emitted as escaped text, never as markup.
//! - Link and image targets with script-capable schemes are neutralized.
//!
//! # See also
//! - `editor::session` for the editable path.

mod preview;
mod view;

pub use preview::{derive_markdown_preview, record_preview, MarkdownPreview};
pub use view::{render_record, RenderedRecord, RenderedSection};

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Converts markdown source into safe markup.
pub trait MarkdownRenderer {
    fn render_markdown(&self, text: &str) -> String;
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render_markdown(&self, text: &str) -> String {
        self(text)
    }
}

/// CommonMark renderer with GitHub-flavored tables, strikethrough and task lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl CommonMarkRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render_markdown(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, Self::options()).map(neutralize_event);
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

fn neutralize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn neutralize_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_blocked_url(&url) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Whether `url` uses a scheme that can execute script in a browser.
pub fn is_blocked_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_URL_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
