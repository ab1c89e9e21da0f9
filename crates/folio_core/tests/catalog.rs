use folio_core::db::open_db_in_memory;
use folio_core::{
    render_record, BlockType, CatalogService, CommonMarkRenderer, ContentBlock, Record,
    RecordRepository, SqliteRecordRepository,
};

fn seed(repo: &SqliteRecordRepository<'_>) {
    let mut kiln = Record::new(1).unwrap();
    kiln.title = "Kiln log".to_string();
    kiln.description = "Cone 6 firing ![kiln](/uploads/kiln.png) notes".to_string();
    kiln.category = vec!["Ceramics".to_string()];
    kiln.tags = vec!["Clay".to_string()];
    repo.create_record(&kiln).unwrap();

    let mut manual = Record::new(2).unwrap();
    manual.title = "Glaze manual".to_string();
    manual.group = Some("Files".to_string());
    manual.is_file = true;
    manual.files = Some("/uploads/glaze.pdf".to_string());
    manual.category = vec!["Ceramics".to_string(), "Docs".to_string()];
    manual.sections = vec![ContentBlock::new(BlockType::Image, "/uploads/cover.png")];
    repo.create_record(&manual).unwrap();

    let mut site = Record::new(3).unwrap();
    site.title = "Portfolio site".to_string();
    site.group = Some("process".to_string());
    site.tags = vec!["web".to_string()];
    repo.create_record(&site).unwrap();
}

#[test]
fn grouped_entries_use_catalog_group() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    seed(&repo);

    let groups = CatalogService::new(&repo).grouped().unwrap();
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["files", "process"]);

    let process_ids: Vec<i64> = groups["process"].iter().map(|entry| entry.id).collect();
    assert_eq!(process_ids, vec![1, 3]);

    let manual = &groups["files"][0];
    assert!(manual.has_download);
    assert_eq!(manual.preview_image.as_deref(), Some("/uploads/cover.png"));
}

#[test]
fn entries_carry_markdown_previews() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    seed(&repo);

    let entries = CatalogService::new(&repo).entries().unwrap();
    assert_eq!(entries[0].preview_text.as_deref(), Some("Cone 6 firing notes"));
    assert_eq!(entries[0].preview_image.as_deref(), Some("/uploads/kiln.png"));
    assert_eq!(entries[2].preview_text, None);
}

#[test]
fn category_and_tag_filters_ignore_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    seed(&repo);
    let catalog = CatalogService::new(&repo);

    let ceramics: Vec<i64> = catalog
        .by_category("ceramics")
        .unwrap()
        .iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ceramics, vec![1, 2]);

    let clay: Vec<i64> = catalog
        .by_tag("CLAY")
        .unwrap()
        .iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(clay, vec![1]);
    assert!(catalog.by_tag("glaze").unwrap().is_empty());
}

#[test]
fn rendered_record_escapes_raw_html_and_script_links() {
    let mut record = Record::new(1).unwrap();
    record.description =
        "<script>alert(1)</script>\n\n[click](javascript:alert(1)) and **bold**".to_string();
    record.sections = vec![
        ContentBlock::new(BlockType::Text, "<b>literal</b>"),
        ContentBlock::new(BlockType::Image, "javascript:alert(1)"),
        ContentBlock::new(BlockType::Code, "a < b"),
    ];

    let view = render_record(&record, &CommonMarkRenderer::new());
    assert!(!view.description_html.contains("<script>"));
    assert!(!view.description_html.contains("javascript:"));
    assert!(view.description_html.contains("<strong>bold</strong>"));
    assert_eq!(view.sections[0].html, "<p>&lt;b&gt;literal&lt;/b&gt;</p>");
    assert!(view.sections[1].html.is_empty());
    assert_eq!(view.sections[2].html, "<pre><code>a &lt; b</code></pre>");
    assert_eq!(view.download, None);
}

#[test]
fn renderer_can_be_a_closure() {
    let record = Record::new(1).unwrap();
    let upper = |text: &str| text.to_uppercase();
    let view = render_record(&record, &upper);
    assert_eq!(view.description_html, "");
}
