//! Request and response bodies.

use std::ops::RangeInclusive;

use serde::Deserialize;
use serde::Serialize;
use vimed_rag::Document;

const MESSAGE_CHARS: RangeInclusive<usize> = 1..=1000;
const QUERY_CHARS: RangeInclusive<usize> = 1..=500;
const TOP_K: RangeInclusive<usize> = 1..=50;
const RERANK_TOP_N: RangeInclusive<usize> = 1..=20;

/// Characters of passage text included in a search result.
pub const SNIPPET_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_true")]
    pub use_query_expansion: bool,
    #[serde(default = "default_chat_top_k")]
    pub top_k: usize,
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_chars("message", &self.message, MESSAGE_CHARS)?;
        check_range("top_k", self.top_k, TOP_K)?;
        check_range("rerank_top_n", self.rerank_top_n, RERANK_TOP_N)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub conversation_id: String,
    /// Seconds, rounded to two decimals
    pub processing_time: f64,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub num_documents_found: usize,
    pub num_documents_used: usize,
    pub queries_generated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_search_top_k")]
    pub top_k: usize,
    #[serde(default = "default_true")]
    pub use_rerank: bool,
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), String> {
        check_chars("query", &self.query, QUERY_CHARS)?;
        check_range("top_k", self.top_k, TOP_K)?;
        check_range("rerank_top_n", self.rerank_top_n, RERANK_TOP_N)
    }
}

/// One search hit as shown to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub title: String,
    pub category: String,
    /// Leading part of the passage, followed by `...`
    pub text: String,
    /// Similarity score before reranking
    pub score: f32,
    pub rerank_score: Option<f32>,
}

impl From<&Document> for DocumentResult {
    fn from(doc: &Document) -> Self {
        let mut text: String = doc.text.chars().take(SNIPPET_CHARS).collect();
        text.push_str("...");
        Self {
            title: or_na(&doc.title),
            category: or_na(&doc.category),
            text,
            score: doc.original_score_or_score(),
            rerank_score: doc.rerank_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatsResponse {
    Operational {
        vector_search: String,
        services: ServiceStatus,
    },
    Degraded {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub qdrant: String,
    pub gemini: String,
    pub cohere: String,
}

fn check_chars(field: &str, value: &str, allowed: RangeInclusive<usize>) -> Result<(), String> {
    let len = value.chars().count();
    if allowed.contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "{field} must be {} to {} characters, got {len}",
            allowed.start(),
            allowed.end()
        ))
    }
}

fn check_range(field: &str, value: usize, allowed: RangeInclusive<usize>) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{field} must be between {} and {}, got {value}",
            allowed.start(),
            allowed.end()
        ))
    }
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

fn default_true() -> bool {
    true
}
fn default_chat_top_k() -> usize {
    12
}
fn default_search_top_k() -> usize {
    10
}
fn default_rerank_top_n() -> usize {
    5
}
