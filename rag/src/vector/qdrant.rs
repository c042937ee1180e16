//! Qdrant vector store over the REST API.
//!
//! Only the read path is needed: `POST /collections/{name}/points/search`
//! with payloads and without vectors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::config::VectorStoreConfig;
use crate::error::RagErr;
use crate::error::Result;
use crate::traits::VectorStore;
use crate::types::Payload;
use crate::types::ScoredPoint;

/// Qdrant REST client bound to one collection.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    base_url: String,
    api_key: Option<String>,
    collection: String,
    client: reqwest::Client,
}

impl QdrantStore {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            collection: collection.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &VectorStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1) as u64))
            .build()
            .map_err(|e| RagErr::ConfigError {
                field: "vector_store".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            collection: config.collection.clone(),
            client,
        })
    }

    /// Set the API key sent in the `api-key` header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        )
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredPoint>> {
        let request = SearchRequest {
            vector,
            limit,
            score_threshold,
            with_payload: true,
            with_vector: false,
        };

        let mut builder = self.client.post(self.search_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }

        let response = builder.send().await.map_err(|e| RagErr::SearchFailed {
            cause: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagErr::SearchFailed {
                cause: format!("Qdrant error {status}: {error_text}"),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| RagErr::SearchFailed {
            cause: e.to_string(),
        })?;

        // Threshold, order and limit hold even if the server ignores them.
        let mut points: Vec<ScoredPoint> = body
            .result
            .into_iter()
            .filter(|hit| hit.score >= score_threshold)
            .map(|hit| ScoredPoint {
                id: point_id_to_string(&hit.id),
                score: hit.score,
                payload: hit.payload.unwrap_or_default(),
            })
            .collect();
        points.sort_by(|a, b| b.score.total_cmp(&a.score));
        points.truncate(limit);

        tracing::debug!(
            collection = %self.collection,
            hits = points.len(),
            "Qdrant search completed"
        );
        Ok(points)
    }
}

/// Render a Qdrant point id (unsigned integer or UUID string).
fn point_id_to_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    score_threshold: f32,
    with_payload: bool,
    with_vector: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<Payload>,
}

#[cfg(test)]
#[path = "qdrant.test.rs"]
mod tests;
