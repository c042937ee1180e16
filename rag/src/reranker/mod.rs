//! Relevance reranking with graceful degradation.
//!
//! [`RerankService`] wraps a [`RerankProvider`] and never fails: when the
//! provider is unavailable, candidates are ordered by their similarity
//! score instead.

pub mod cohere;

pub use cohere::CohereReranker;

use std::sync::Arc;

use crate::fallback::or_degrade;
use crate::traits::RerankProvider;
use crate::types::Document;

/// Reranks retrieved documents through a remote provider.
#[derive(Clone)]
pub struct RerankService {
    provider: Arc<dyn RerankProvider>,
}

impl RerankService {
    pub fn new(provider: Arc<dyn RerankProvider>) -> Self {
        Self { provider }
    }

    /// Rerank `documents` against `query`, keeping at most `top_n`.
    ///
    /// On success the documents come back in provider order with
    /// `rerank_score` set and the similarity score preserved in
    /// `original_score`. On failure the first `top_n` inputs are
    /// returned untouched.
    pub async fn rerank(&self, query: &str, documents: &[Document], top_n: usize) -> Vec<Document> {
        if documents.is_empty() {
            return Vec::new();
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        or_degrade(
            "rerank",
            async {
                let hits = self.provider.rerank(query, &texts, top_n).await?;
                Ok(hits
                    .into_iter()
                    .filter_map(|hit| {
                        let mut doc = documents.get(hit.index)?.clone();
                        doc.original_score = Some(doc.score);
                        doc.rerank_score = Some(hit.relevance_score);
                        Some(doc)
                    })
                    .take(top_n)
                    .collect())
            },
            |_| documents.iter().take(top_n).cloned().collect(),
        )
        .await
    }

    /// Rerank, falling back to similarity order when the provider did not
    /// score the results.
    ///
    /// Always returns at most `top_n` documents and never fails.
    pub async fn rerank_with_fallback(
        &self,
        query: &str,
        documents: &[Document],
        top_n: usize,
    ) -> Vec<Document> {
        let reranked = self.rerank(query, documents, top_n).await;
        match reranked.first() {
            Some(first) if first.is_reranked() => reranked,
            _ => {
                tracing::info!(
                    provider = self.provider.name(),
                    candidates = documents.len(),
                    "Rerank unavailable, ordering by similarity score"
                );
                let mut by_score = documents.to_vec();
                by_score.sort_by(|a, b| {
                    b.original_score_or_score()
                        .total_cmp(&a.original_score_or_score())
                });
                by_score.truncate(top_n);
                by_score
            }
        }
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
