//! Google Generative AI (Gemini) `generateContent` client.
//!
//! Each request takes the next key from a shared [`KeyPool`], spreading
//! calls across the pool to stay under per-key rate limits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::config::LlmConfig;
use crate::error::RagErr;
use crate::error::Result;
use crate::keys::KeyPool;
use crate::traits::TextGenerator;

/// Default Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Gemini client for single-turn text generation.
pub struct GeminiClient {
    http_client: reqwest::Client,
    keys: Arc<KeyPool>,
    model: String,
    base_url: String,
    api_version: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(keys: Arc<KeyPool>, model: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            keys,
            model: model.into(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: None,
        }
    }

    /// Create a client from configuration and a key pool.
    pub fn from_config(config: &LlmConfig, keys: Arc<KeyPool>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1) as u64))
            .build()
            .map_err(|e| RagErr::ConfigError {
                field: "llm".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self {
            http_client,
            keys,
            model: config.model.clone(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(GEMINI_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: config.temperature,
        })
    }

    /// Set the base URL for API requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the URL for a model method, accepting `models/`-prefixed ids.
    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/{}/models/{model}:{method}",
            self.base_url, self.api_version
        )
    }

    /// Send a `generateContent` request.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.model_url(&self.model, "generateContent");
        let api_key = self.keys.next_key();

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RagErr::GenerationFailed {
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagErr::GenerationFailed {
                cause: format!("API error {status}: {error_text}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RagErr::GenerationFailed {
                cause: e.to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: self.temperature.map(|temperature| GenerationConfig {
                temperature: Some(temperature),
            }),
        };
        let response = self.generate_content(&request).await?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(RagErr::GenerationFailed {
                cause: format!("prompt blocked: {reason}"),
            });
        }

        response.text().ok_or_else(|| RagErr::GenerationFailed {
            cause: "response contained no text".to_string(),
        })
    }
}

/// A piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Indicates if the part is thought/reasoning from the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Contains the multi-part content of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,

    /// Either 'user' or 'model'.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    /// Create a user content with text.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            parts: Some(vec![Part::text(text)]),
            role: Some("user".to_string()),
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request body for `generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A response candidate.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt, set when it was blocked.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Response from `generateContent`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,

    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    pub fn text(&self) -> Option<String> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .iter()
            .filter_map(|p| {
                if p.thought == Some(true) {
                    return None;
                }
                p.text.clone()
            })
            .reduce(|acc, s| acc + &s)
    }
}

#[cfg(test)]
#[path = "gemini.test.rs"]
mod tests;
