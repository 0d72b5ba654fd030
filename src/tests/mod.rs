use std::collections::HashMap;

use serde_json::json;

use crate::{
    CollaborationNoteParser, ErrorDetail, NoteParser, NoteType, config::ConvertOptions,
    note::references::extract_attachment_links, parser_for,
};

#[tokio::test]
async fn test_collaboration_kitchensink() {
    let raw = tokio::fs::read_to_string("src/tests/fixtures/kitchensink.json")
        .await
        .unwrap();
    let parser = parser_for(NoteType::Collaboration, &ConvertOptions::default());
    let note = parser.process_content(&raw).unwrap();

    let expected = [
        "",
        "# Weekly notes",
        "",
        "",
        "See [the plan](https://example.com/plan) and [[roadmap|Roadmap]].",
        "- [x] ship **v2**",
        "  - [ ] write docs",
        "```rust",
        "fn main() {",
        "}",
        "```",
        "",
        "",
        "|Owner|Task|",
        "| ----- | ----- |",
        "|ann||",
        "",
        "",
        "> Energy $E=mc^2$",
        "",
        "![diagram](diagram.png)",
        "",
        "[Budget](wiz-collab-attachment://budget.xlsx)",
        "",
        "",
        "Reviewed",
        "",
        "",
        "> Ann 时间未知",
        "",
        "LGTM",
        "",
        "",
        "> Bo 时间未知",
        "",
        "thanks @Ann",
        "",
    ]
    .join("\n");
    assert_eq!(note.content, expected);
    assert_eq!(note.need_upload_images, vec!["diagram.png".to_string()]);
    assert!(note.warnings.is_empty());
    assert_eq!(extract_attachment_links(&note.content), vec!["budget.xlsx"]);
}

#[tokio::test]
async fn test_lite_note_with_uploaded_images() {
    let raw = tokio::fs::read_to_string("src/tests/fixtures/lite.html")
        .await
        .unwrap();
    let parser = parser_for(NoteType::from_tag("lite/markdown"), &ConvertOptions::default());
    let mut note = parser.process_content(&raw).unwrap();
    assert_eq!(
        note.content,
        "# Groceries\n\n- milk\n- eggs\n\n![receipt](index_files/receipt.jpg)\n"
    );
    assert_eq!(note.need_upload_images, vec!["receipt.jpg".to_string()]);

    let uploaded = HashMap::from([("receipt.jpg".to_string(), "https://img/r".to_string())]);
    note.replace_image_url(&uploaded);
    assert!(note.content.ends_with("![receipt](https://img/r)\n"));
}

#[test]
fn test_error_points_at_nested_block() {
    let inner = json!({
        "blocks": [
            {"type": "text", "text": [{"insert": "ok"}]},
            {"type": "list", "level": 1, "checkbox": "maybe", "text": []}
        ]
    });
    let raw = json!({"data": {"data": {"blocks": [
        {"type": "text", "text": [{"insert": "before"}]},
        {"type": "table", "cols": 0, "rows": 0, "children": []},
        {"type": "embed", "embedType": "snapshot", "embedData": {"doc": inner.to_string()}}
    ]}}});
    let parser = CollaborationNoteParser::default();
    let error = parser.process_content(&raw.to_string()).unwrap_err();
    assert_eq!(error.to_string(), "blocks[1]: Invalid table column count: 0");

    let raw = json!({"data": {"data": {"blocks": [
        {"type": "embed", "embedType": "snapshot", "embedData": {"doc": inner.to_string()}}
    ]}}});
    let error = parser.process_content(&raw.to_string()).unwrap_err();
    assert!(matches!(*error.detail, ErrorDetail::InvalidCheckbox(ref value) if value == "maybe"));
    assert_eq!(error.context.to_string(), "blocks[0] > blocks[1]");
}

#[test]
fn test_broken_snapshot_degrades_to_placeholder() {
    let inner = json!({
        "blocks": [{"type": "table", "cols": 1, "rows": 1, "children": ["gone"]}]
    });
    let raw = json!({"data": {"data": {"blocks": [
        {"type": "embed", "embedType": "snapshot", "embedData": {"doc": inner.to_string()}}
    ]}}});
    let note = CollaborationNoteParser::default()
        .process_content(&raw.to_string())
        .unwrap();
    assert_eq!(note.content, "\n\n> Failed to parse snapshot\n\n");
    assert_eq!(note.warnings.len(), 1);
    assert!(note.warnings[0].contains("blocks[0] > blocks[0]: Node not found: gone"));
}

#[test]
fn test_depth_limit_fails_the_note() {
    let mut doc = json!({"blocks": [{"type": "text", "text": [{"insert": "leaf"}]}]});
    for _ in 0..4 {
        doc = json!({"blocks": [
            {"type": "embed", "embedType": "snapshot", "embedData": {"doc": doc.to_string()}}
        ]});
    }
    let raw = json!({"data": {"data": doc}}).to_string();
    let parser = CollaborationNoteParser::new(ConvertOptions { max_embed_depth: 3 });
    let error = parser.process_content(&raw).unwrap_err();
    assert!(matches!(*error.detail, ErrorDetail::EmbedDepthExceeded(3)));
}
