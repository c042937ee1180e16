//! Seams to the external services the pipeline depends on.
//!
//! Each trait has one HTTP-backed implementation in this crate; tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RerankHit;
use crate::types::ScoredPoint;

/// Turns text into a fixed-length, L2-normalized vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Nearest-neighbour search over an existing collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `limit` hits with `score >= score_threshold`,
    /// ordered by score descending.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredPoint>>;
}

/// Single-turn text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Complete `prompt` and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Query/document relevance ranking service.
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Rank `documents` against `query` and return at most `top_n` hits,
    /// most relevant first. Hit indices refer to positions in `documents`.
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize)
    -> Result<Vec<RerankHit>>;
}
