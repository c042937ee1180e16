use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::types::Payload;

fn payload(value: serde_json::Value) -> Payload {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Payload::new(),
    }
}

#[test]
fn test_empty_returns_sentinel() {
    assert_eq!(format_context(&[]), NO_CONTEXT_SENTINEL);
}

#[test]
fn test_single_document_section() {
    let mut doc = Document::from_payload(
        "1",
        0.8123,
        payload(json!({
            "text": "Sốt là khi thân nhiệt vượt quá 37,5°C.",
            "title": "Sốt ở trẻ em",
            "category": "Nhi khoa",
            "header": "Định nghĩa"
        })),
    );
    doc.rerank_score = Some(0.9);
    doc.original_score = Some(0.8123);

    assert_eq!(
        format_context(&[doc]),
        "=== Tài liệu 1 ===\n\
         Điểm Rerank: 0.900 | Điểm gốc: 0.812\n\
         Tiêu đề: Sốt ở trẻ em\n\
         Danh mục: Nhi khoa\n\
         Đề mục: Định nghĩa\n\
         \n\
         Nội dung:\n\
         Sốt là khi thân nhiệt vượt quá 37,5°C."
    );
}

#[test]
fn test_unscored_document_defaults() {
    let doc = Document::from_payload("1", 0.61, payload(json!({ "text": "body" })));
    let context = format_context(&[doc]);
    assert!(context.contains("Điểm Rerank: 0.000 | Điểm gốc: 0.610"));
    assert!(context.contains("Tiêu đề: N/A\nDanh mục: N/A\nĐề mục: N/A"));
}

#[test]
fn test_sections_numbered_and_separated() {
    let docs = vec![
        Document::from_payload("a", 0.9, payload(json!({ "text": "first" }))),
        Document::from_payload("b", 0.7, payload(json!({ "text": "second" }))),
    ];
    let context = format_context(&docs);
    let sections: Vec<&str> = context.split("\n\n=== ").collect();
    assert_eq!(sections.len(), 2);
    assert!(sections[0].starts_with("=== Tài liệu 1 ===") && sections[0].ends_with("first"));
    assert!(sections[1].starts_with("Tài liệu 2 ===") && sections[1].ends_with("second"));
}
