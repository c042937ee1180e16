//! OpenAI-compatible embeddings provider.
//!
//! Talks to any server exposing `POST {base_url}/embeddings` with the
//! OpenAI request shape (OpenAI itself, text-embeddings-inference,
//! infinity, vLLM). Returned vectors are L2-normalized.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::config::EmbeddingConfig;
use crate::config::default_embedding_dimension;
use crate::embeddings::l2_normalize;
use crate::error::RagErr;
use crate::error::Result;
use crate::traits::EmbeddingProvider;

/// Default model for embeddings.
const DEFAULT_MODEL: &str = "Dqdung205/medical_vietnamese_embedding";
/// Default API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

/// OpenAI-compatible embeddings provider.
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddings {
    api_key: Option<String>,
    model: String,
    dimension: i32,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIEmbeddings {
    /// Create a provider with default model and endpoint.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            dimension: default_embedding_dimension(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider from configuration.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1) as u64))
            .build()
            .map_err(|e| RagErr::ConfigError {
                field: "embedding".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: i32) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the base URL for API requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Make an embedding request to the API.
    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: vec![text.to_string()],
            encoding_format: Some("float".to_string()),
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagErr::EmbeddingFailed {
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagErr::EmbeddingFailed {
                cause: format!("API error {status}: {error_text}"),
            });
        }

        let result: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| RagErr::EmbeddingFailed {
                    cause: e.to_string(),
                })?;

        let count = result.data.len();
        let mut data = result.data.into_iter();
        let (Some(EmbeddingData { embedding: mut vector }), None) = (data.next(), data.next())
        else {
            return Err(RagErr::EmbeddingFailed {
                cause: format!("expected 1 embedding, got {count}"),
            });
        };

        if vector.len() != self.dimension as usize {
            return Err(RagErr::EmbeddingFailed {
                cause: format!(
                    "dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                ),
            });
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

impl Default for OpenAIEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embedding(text).await
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
#[path = "openai.test.rs"]
mod tests;
