//! Fan-out retrieval over a query set.

use futures::future::try_join_all;

use super::dedup::merge_by_text;
use crate::error::Result;
use crate::types::Document;
use crate::vector::VectorSearchClient;

/// Searches with several queries and merges the results.
#[derive(Clone)]
pub struct MultiQueryRetriever {
    client: VectorSearchClient,
}

impl MultiQueryRetriever {
    pub fn new(client: VectorSearchClient) -> Self {
        Self { client }
    }

    /// Single-query search, unmerged.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<Document>> {
        self.client.search(query, top_k, score_threshold).await
    }

    /// Search with every query and merge the hits by passage text.
    ///
    /// Sub-queries run concurrently, but results are merged in query
    /// order so ties resolve the same way regardless of which search
    /// finishes first. Any search failure fails the whole call.
    pub async fn retrieve(
        &self,
        queries: &[String],
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<Document>> {
        match queries {
            [] => Ok(Vec::new()),
            [query] => self.search(query, top_k, score_threshold).await,
            _ => {
                let per_query = try_join_all(
                    queries
                        .iter()
                        .map(|query| self.client.search(query, top_k, score_threshold)),
                )
                .await?;

                let total: usize = per_query.iter().map(Vec::len).sum();
                let merged = merge_by_text(per_query.into_iter().flatten().collect());
                tracing::debug!(
                    queries = queries.len(),
                    hits = total,
                    unique = merged.len(),
                    "Merged multi-query results"
                );
                Ok(merged)
            }
        }
    }
}

#[cfg(test)]
#[path = "multi_query.test.rs"]
mod tests;
