//! Read-only view model for a committed record.

use super::{escape_html, is_blocked_url, MarkdownRenderer};
use crate::model::block::{BlockType, ContentBlock};
use crate::model::record::{Record, RecordId};

/// One rendered section fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub kind: BlockType,
    /// Safe HTML fragment; empty when there is nothing to show.
    pub html: String,
}

/// Display-ready projection of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    pub id: RecordId,
    pub title: String,
    pub category: Vec<String>,
    pub tags: Vec<String>,
    pub date: String,
    pub image: Option<String>,
    /// Present only when the record is a file entry with a stored file.
    pub download: Option<String>,
    pub description_html: String,
    pub sections: Vec<RenderedSection>,
}

/// Renders `record` for the read-only path.
///
/// Text and code sections are literal text; only the description is markdown.
pub fn render_record(record: &Record, renderer: &impl MarkdownRenderer) -> RenderedRecord {
    RenderedRecord {
        id: record.id(),
        title: record.title.clone(),
        category: record.category.clone(),
        tags: record.tags.clone(),
        date: record.date.clone(),
        image: record.image.clone().filter(|url| !is_blocked_url(url)),
        download: if record.has_download() {
            record.files.clone().filter(|url| !is_blocked_url(url))
        } else {
            None
        },
        description_html: renderer.render_markdown(&record.description),
        sections: record
            .sections
            .iter()
            .enumerate()
            .map(|(index, block)| render_section(index, block))
            .collect(),
    }
}

fn render_section(index: usize, block: &ContentBlock) -> RenderedSection {
    let html = match block.kind() {
        BlockType::Text => format!("<p>{}</p>", escape_html(&block.content)),
        BlockType::Image => {
            let src = block.content.trim();
            if src.is_empty() || is_blocked_url(src) {
                String::new()
            } else {
                format!(
                    "<img src=\"{}\" alt=\"section-{index}\">",
                    escape_html(src)
                )
            }
        }
        BlockType::Code => format!("<pre><code>{}</code></pre>", escape_html(&block.content)),
    };
    RenderedSection {
        kind: block.kind(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::render_record;
    use crate::model::block::{BlockType, ContentBlock};
    use crate::model::record::Record;
    use crate::render::CommonMarkRenderer;

    fn record() -> Record {
        let mut record = Record::new(7).unwrap();
        record.title = "Glaze tests".to_string();
        record.description = "Cone **6**".to_string();
        record.sections = vec![
            ContentBlock::new(BlockType::Text, "1 < 2"),
            ContentBlock::new(BlockType::Image, "/uploads/x.png"),
            ContentBlock::new(BlockType::Image, ""),
            ContentBlock::new(BlockType::Code, "if a && b {}"),
        ];
        record
    }

    #[test]
    fn renders_sections_as_escaped_fragments() {
        let view = render_record(&record(), &CommonMarkRenderer);
        assert_eq!(view.sections[0].html, "<p>1 &lt; 2</p>");
        assert_eq!(
            view.sections[1].html,
            "<img src=\"/uploads/x.png\" alt=\"section-1\">"
        );
        assert_eq!(view.sections[2].html, "");
        assert_eq!(
            view.sections[3].html,
            "<pre><code>if a &amp;&amp; b {}</code></pre>"
        );
        assert!(view.description_html.contains("<strong>6</strong>"));
    }

    #[test]
    fn download_requires_file_flag() {
        let mut record = record();
        record.files = Some("/uploads/care-guide.pdf".to_string());
        assert_eq!(render_record(&record, &CommonMarkRenderer).download, None);

        record.is_file = true;
        assert_eq!(
            render_record(&record, &CommonMarkRenderer).download.as_deref(),
            Some("/uploads/care-guide.pdf")
        );
    }
}
