//! Cohere rerank API client.
//!
//! Calls the v2 `/rerank` endpoint, taking a fresh key from the shared
//! [`KeyPool`] for every request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::config::RerankerConfig;
use crate::error::RagErr;
use crate::error::Result;
use crate::keys::KeyPool;
use crate::traits::RerankProvider;
use crate::types::RerankHit;

/// Default Cohere API base URL.
pub const COHERE_API_BASE_URL: &str = "https://api.cohere.com";

/// Remote reranker backed by Cohere.
pub struct CohereReranker {
    client: reqwest::Client,
    keys: Arc<KeyPool>,
    model: String,
    base_url: String,
}

impl CohereReranker {
    pub fn new(keys: Arc<KeyPool>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            keys,
            model: model.into(),
            base_url: COHERE_API_BASE_URL.to_string(),
        }
    }

    /// Create a reranker from configuration and a key pool.
    pub fn from_config(config: &RerankerConfig, keys: Arc<KeyPool>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1) as u64))
            .build()
            .map_err(|e| RagErr::ConfigError {
                field: "reranker".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self {
            client,
            keys,
            model: config.model.clone(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(COHERE_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Set the base URL for API requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/rerank", self.base_url)
    }
}

#[async_trait]
impl RerankProvider for CohereReranker {
    fn name(&self) -> &str {
        "cohere"
    }

    async fn rerank(&self, query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.keys.next_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| RagErr::RerankFailed {
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagErr::RerankFailed {
                cause: format!("API error {status}: {error_text}"),
            });
        }

        let body: RerankResponse = response.json().await.map_err(|e| RagErr::RerankFailed {
            cause: e.to_string(),
        })?;

        if let Some(bad) = body.results.iter().find(|r| r.index >= documents.len()) {
            return Err(RagErr::RerankFailed {
                cause: format!(
                    "result index {} out of range for {} documents",
                    bad.index,
                    documents.len()
                ),
            });
        }

        Ok(body
            .results
            .into_iter()
            .map(|r| RerankHit {
                index: r.index,
                relevance_score: r.relevance_score,
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Debug, Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[cfg(test)]
#[path = "cohere.test.rs"]
mod tests;
