use super::*;
use serde_json::json;

fn payload(value: serde_json::Value) -> Payload {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Payload::new(),
    }
}

#[test]
fn test_from_payload_maps_known_fields() {
    let doc = Document::from_payload(
        "42",
        0.81,
        payload(json!({
            "text": "Sốt là tình trạng thân nhiệt tăng cao.",
            "title": "Sốt",
            "category": "Triệu chứng",
            "header": "Định nghĩa",
            "article_id": "a-1",
            "paragraph_id": "p-3",
            "source": "vinmec"
        })),
    );

    assert_eq!(doc.id, "42");
    assert_eq!(doc.score, 0.81);
    assert_eq!(doc.title, "Sốt");
    assert_eq!(doc.category, "Triệu chứng");
    assert_eq!(doc.header, "Định nghĩa");
    assert_eq!(doc.article_id, "a-1");
    assert_eq!(doc.paragraph_id, "p-3");
    assert_eq!(doc.metadata.get("source"), Some(&json!("vinmec")));
    assert!(doc.rerank_score.is_none());
    assert!(!doc.is_reranked());
}

#[test]
fn test_from_payload_missing_fields_are_empty() {
    let doc = Document::from_payload("1", 0.5, payload(json!({ "text": "abc" })));
    assert_eq!(doc.text, "abc");
    assert!(doc.title.is_empty());
    assert!(doc.header.is_empty());
}

#[test]
fn test_from_payload_numeric_ids_rendered() {
    let doc = Document::from_payload("1", 0.5, payload(json!({ "article_id": 17, "text": null })));
    assert_eq!(doc.article_id, "17");
    assert!(doc.text.is_empty());
}

#[test]
fn test_content_key_identity() {
    assert_eq!(content_key("same text"), content_key("same text"));
    assert_ne!(content_key("same text"), content_key("same text "));
    assert_eq!(content_key("x").len(), 64);
}

#[test]
fn test_original_score_or_score() {
    let mut doc = Document::from_payload("1", 0.6, Payload::new());
    assert_eq!(doc.original_score_or_score(), 0.6);
    doc.original_score = Some(0.7);
    assert_eq!(doc.original_score_or_score(), 0.7);
}
