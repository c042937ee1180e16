//! Core data types for the RAG pipeline.

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// Payload map attached to every indexed passage.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A retrieved passage with its scores and metadata.
///
/// Two documents with identical `text` are the same logical passage,
/// whatever their ids or scores say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Point id in the vector index
    pub id: String,
    /// Similarity score from vector search
    pub score: f32,
    /// Relevance score from the reranking service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
    /// Copy of `score` taken when the document was reranked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_score: Option<f32>,
    /// Passage body
    pub text: String,
    pub title: String,
    pub category: String,
    /// Section header within the source article
    pub header: String,
    pub article_id: String,
    pub paragraph_id: String,
    /// Full payload as stored in the index
    #[serde(default)]
    pub metadata: Payload,
}

impl Document {
    /// Build a document from a vector index hit.
    ///
    /// Missing payload fields become empty strings; non-string values are
    /// rendered as JSON.
    pub fn from_payload(id: impl Into<String>, score: f32, payload: Payload) -> Self {
        let field = |name: &str| match payload.get(name) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            id: id.into(),
            score,
            rerank_score: None,
            original_score: None,
            text: field("text"),
            title: field("title"),
            category: field("category"),
            header: field("header"),
            article_id: field("article_id"),
            paragraph_id: field("paragraph_id"),
            metadata: payload,
        }
    }

    /// Deduplication key derived from the passage text.
    pub fn content_key(&self) -> String {
        content_key(&self.text)
    }

    /// Score before reranking, falling back to the similarity score.
    pub fn original_score_or_score(&self) -> f32 {
        self.original_score.unwrap_or(self.score)
    }

    /// Whether the reranking service scored this document.
    pub fn is_reranked(&self) -> bool {
        self.rerank_score.is_some()
    }
}

/// SHA256 hex digest of a passage text.
///
/// Identical text always maps to the same key; any byte difference
/// (including whitespace) yields a different key.
pub fn content_key(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// One hit returned by a [`crate::traits::VectorStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Payload,
}

/// One ranked entry returned by a [`crate::traits::RerankProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankHit {
    /// Position of the document in the request
    pub index: usize,
    pub relevance_score: f32,
}

#[cfg(test)]
#[path = "types.test.rs"]
mod tests;
