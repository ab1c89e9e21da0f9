use folio_core::{BlockType, ContentBlock, Record};
use serde_json::json;

#[test]
fn string_category_and_tags_normalize_to_single_entry_lists() {
    let record: Record = serde_json::from_value(json!({
        "id": 4,
        "title": "Mug",
        "category": " Ceramics ",
        "tags": "clay, kiln"
    }))
    .unwrap();

    assert_eq!(record.category, vec!["Ceramics".to_string()]);
    assert_eq!(record.tags, vec!["clay, kiln".to_string()]);
}

#[test]
fn list_fields_drop_null_and_blank_entries() {
    let record: Record = serde_json::from_value(json!({
        "id": 4,
        "category": ["Web", null, "  ", "CLI "],
        "tags": []
    }))
    .unwrap();

    assert_eq!(record.category, vec!["Web".to_string(), "CLI".to_string()]);
    assert!(record.tags.is_empty());
}

#[test]
fn missing_optional_fields_take_defaults() {
    let record: Record = serde_json::from_value(json!({ "id": 9, "image": "  " })).unwrap();

    assert_eq!(record.id(), 9);
    assert_eq!(record.title, "");
    assert_eq!(record.image, None);
    assert!(!record.is_file);
    assert!(record.sections.is_empty());
    assert_eq!(record.catalog_group(), "process");
}

#[test]
fn sections_use_type_wire_field() {
    let record: Record = serde_json::from_value(json!({
        "id": 1,
        "isfile": true,
        "files": "/uploads/a.pdf",
        "sections": [
            { "type": "text", "content": "a" },
            { "type": "image", "content": "/uploads/b.png" }
        ]
    }))
    .unwrap();

    assert!(record.has_download());
    assert_eq!(
        record.sections,
        vec![
            ContentBlock::new(BlockType::Text, "a"),
            ContentBlock::new(BlockType::Image, "/uploads/b.png"),
        ]
    );

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["isfile"], json!(true));
    assert_eq!(value["sections"][1]["type"], json!("image"));
    assert_eq!(value["category"], json!([]));
}

#[test]
fn unknown_section_type_is_rejected_on_load() {
    let result = serde_json::from_value::<Record>(json!({
        "id": 1,
        "sections": [{ "type": "video", "content": "x" }]
    }));
    assert!(result.is_err());
}

#[test]
fn non_positive_id_is_rejected_on_load() {
    let result = serde_json::from_value::<Record>(json!({ "id": 0 }));
    assert!(result.is_err());
}

#[test]
fn serialized_record_loads_back_unchanged() {
    let mut record = Record::new(12).unwrap();
    record.title = "Bowl".to_string();
    record.category = vec!["Ceramics".to_string()];
    record.tags = vec!["clay".to_string()];
    record.group = Some("process".to_string());
    record.sections = vec![ContentBlock::new(BlockType::Code, "x = 1")];

    let text = serde_json::to_string(&record).unwrap();
    let loaded: Record = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded, record);
}
