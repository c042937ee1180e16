//! Vector search over the knowledge base.
//!
//! [`VectorSearchClient`] embeds a query and maps index hits into
//! [`Document`]s. Failures here have no safe fallback and propagate.

pub mod qdrant;

pub use qdrant::QdrantStore;

use std::sync::Arc;

use crate::error::Result;
use crate::traits::EmbeddingProvider;
use crate::traits::VectorStore;
use crate::types::Document;

/// Embeds queries and searches the vector index.
#[derive(Clone)]
pub struct VectorSearchClient {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl VectorSearchClient {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Return up to `top_k` documents scoring at least `score_threshold`,
    /// best first.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<Document>> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.store.search(&vector, top_k, score_threshold).await?;
        Ok(hits
            .into_iter()
            .map(|hit| Document::from_payload(hit.id, hit.score, hit.payload))
            .collect())
    }
}
