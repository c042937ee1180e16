use pretty_assertions::assert_eq;

use super::*;

fn doc(id: &str, text: &str, score: f32) -> Document {
    let mut payload = crate::types::Payload::new();
    payload.insert("text".to_string(), serde_json::json!(text));
    Document::from_payload(id, score, payload)
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[test]
fn test_empty() {
    assert!(merge_by_text(vec![]).is_empty());
}

#[test]
fn test_distinct_texts_keep_order() {
    let merged = merge_by_text(vec![doc("1", "a", 0.6), doc("2", "b", 0.9), doc("3", "c", 0.7)]);
    assert_eq!(ids(&merged), vec!["1", "2", "3"]);
}

#[test]
fn test_duplicate_keeps_higher_score() {
    let merged = merge_by_text(vec![
        doc("q1-a", "Sốt là phản ứng của cơ thể.", 0.62),
        doc("q1-b", "other", 0.60),
        doc("q2-a", "Sốt là phản ứng của cơ thể.", 0.81),
    ]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "q2-a");
    assert_eq!(merged[0].score, 0.81);
    assert_eq!(merged[1].id, "q1-b");
}

#[test]
fn test_equal_scores_keep_first_seen() {
    let merged = merge_by_text(vec![doc("first", "a", 0.7), doc("second", "a", 0.7)]);
    assert_eq!(ids(&merged), vec!["first"]);
}

#[test]
fn test_whitespace_difference_is_distinct() {
    let merged = merge_by_text(vec![doc("1", "a", 0.7), doc("2", "a ", 0.7)]);
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_idempotent() {
    let input = vec![
        doc("1", "a", 0.5),
        doc("2", "b", 0.9),
        doc("3", "a", 0.8),
        doc("4", "c", 0.6),
        doc("5", "b", 0.4),
    ];
    let once = merge_by_text(input);
    let twice = merge_by_text(once.clone());
    assert_eq!(once, twice);
    assert_eq!(ids(&once), vec!["3", "2", "4"]);
}
