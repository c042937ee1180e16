//! Text-identity deduplication for retrieved documents.

use std::collections::HashMap;

use crate::types::Document;

/// Merge documents that carry the same passage text.
///
/// For each distinct text the document with the strictly highest score
/// is kept; on equal scores the first one seen wins. The result is in
/// first-seen order of each text, so merging an already merged set is a
/// no-op.
pub fn merge_by_text(documents: Vec<Document>) -> Vec<Document> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(documents.len());
    let mut merged: Vec<Document> = Vec::with_capacity(documents.len());

    for doc in documents {
        let key = doc.content_key();
        match slots.get(&key) {
            Some(&slot) => {
                if doc.score > merged[slot].score {
                    merged[slot] = doc;
                }
            }
            None => {
                slots.insert(key, merged.len());
                merged.push(doc);
            }
        }
    }

    merged
}

#[cfg(test)]
#[path = "dedup.test.rs"]
mod tests;
