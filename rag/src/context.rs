//! Prompt context assembly.

use crate::types::Document;

/// Context used when no documents survived retrieval.
pub const NO_CONTEXT_SENTINEL: &str = "Không tìm thấy thông tin liên quan.";

/// Render documents as numbered context sections for the answer prompt.
///
/// Sections follow input order and are separated by a blank line. Each
/// one carries the rerank score (0 when unscored), the original
/// similarity score, the title/category/header (`N/A` when empty) and the
/// full passage text.
pub fn format_context(documents: &[Document]) -> String {
    if documents.is_empty() {
        return NO_CONTEXT_SENTINEL.to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format_section(i + 1, doc))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_section(position: usize, doc: &Document) -> String {
    let rerank_score = doc.rerank_score.unwrap_or(0.0);
    let original_score = doc.original_score_or_score();
    format!(
        "=== Tài liệu {position} ===\n\
         Điểm Rerank: {rerank_score:.3} | Điểm gốc: {original_score:.3}\n\
         Tiêu đề: {}\n\
         Danh mục: {}\n\
         Đề mục: {}\n\
         \n\
         Nội dung:\n\
         {}",
        or_na(&doc.title),
        or_na(&doc.category),
        or_na(&doc.header),
        doc.text.trim_end(),
    )
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

#[cfg(test)]
#[path = "context.test.rs"]
mod tests;
