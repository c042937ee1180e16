//! Configuration for the RAG pipeline.
//!
//! Values come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. `{workdir}/.vimed/config.toml`, else `~/.vimed/config.toml`
//! 3. Environment variables (see [`RagConfig::apply_env`])

use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

use crate::error::RagErr;
use crate::error::Result;
use crate::keys::redact;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Vector index connection
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Embedding endpoint
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generative model used for query expansion and answers
    #[serde(default)]
    pub llm: LlmConfig,

    /// Reranking service
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Retrieval defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// API key pools
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Qdrant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Qdrant REST endpoint
    #[serde(default = "default_qdrant_url")]
    pub url: String,

    /// Optional Qdrant API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Collection holding the knowledge base
    #[serde(default = "default_collection_name")]
    pub collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: i32,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            api_key: None,
            collection: default_collection_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}
fn default_collection_name() -> String {
    "med_vn_rag".to_string()
}
fn default_timeout_secs() -> i32 {
    30
}

/// Embedding endpoint settings (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Model name served by the endpoint
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: i32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: i32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key: None,
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "Dqdung205/medical_vietnamese_embedding".to_string()
}
fn default_embedding_base_url() -> String {
    "http://localhost:8080/v1".to_string()
}
/// Default embedding dimension.
pub fn default_embedding_dimension() -> i32 {
    768
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Gemini model id
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API base URL (optional, for proxies)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Temperature for generation (0.0 - 2.0)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: i32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: None,
            temperature: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_llm_timeout_secs() -> i32 {
    60
}

/// Reranking service settings (Cohere v2 `/rerank`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankerConfig {
    /// Rerank model id
    #[serde(default = "default_reranker_model")]
    pub model: String,

    /// API base URL (optional)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_reranker_timeout_secs")]
    pub timeout_secs: i32,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: default_reranker_model(),
            base_url: None,
            timeout_secs: default_reranker_timeout_secs(),
        }
    }
}

fn default_reranker_model() -> String {
    "rerank-multilingual-v3.0".to_string()
}
fn default_reranker_timeout_secs() -> i32 {
    10
}

/// Retrieval defaults applied when a request leaves them unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Hits requested per sub-query
    #[serde(default = "default_top_k")]
    pub default_top_k: i32,

    /// Minimum similarity score
    #[serde(default = "default_score_threshold")]
    pub default_score_threshold: f32,

    /// Documents kept after reranking
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: i32,

    /// Size of the expanded query set (original included)
    #[serde(default = "default_num_queries")]
    pub num_queries: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            default_score_threshold: default_score_threshold(),
            rerank_top_n: default_rerank_top_n(),
            num_queries: default_num_queries(),
        }
    }
}

fn default_top_k() -> i32 {
    20
}
fn default_score_threshold() -> f32 {
    0.5
}
fn default_rerank_top_n() -> i32 {
    5
}
fn default_num_queries() -> i32 {
    3
}

/// API key pools for rate-limited services.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    /// Keys for the generative model
    #[serde(default)]
    pub gemini_keys: Vec<String>,

    /// Keys for the reranking service
    #[serde(default)]
    pub cohere_keys: Vec<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = |keys: &[String]| keys.iter().map(|k| redact(k)).collect::<Vec<_>>();
        f.debug_struct("CredentialsConfig")
            .field("gemini_keys", &masked(&self.gemini_keys))
            .field("cohere_keys", &masked(&self.cohere_keys))
            .finish()
    }
}

impl RagConfig {
    /// Load configuration for `workdir`, then apply environment overrides.
    ///
    /// Search order for the file (first found wins):
    /// 1. `{workdir}/.vimed/config.toml` (project-level)
    /// 2. `~/.vimed/config.toml` (global)
    /// 3. Defaults
    pub fn load(workdir: &Path) -> Result<Self> {
        let mut config = Self::load_file(workdir)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file(workdir: &Path) -> Result<Self> {
        let project_config = workdir.join(".vimed/config.toml");
        if project_config.exists() {
            return Self::from_file(&project_config);
        }

        if let Some(home) = dirs::home_dir() {
            let global_config = home.join(".vimed/config.toml");
            if global_config.exists() {
                return Self::from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| RagErr::ConfigParseError {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }

    /// Override values from environment variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    /// Blank values are ignored. Recognized variables: `QDRANT_URL`,
    /// `QDRANT_API_KEY`, `COLLECTION_NAME`, `MODEL_EMBEDDING`,
    /// `EMBEDDING_BASE_URL`, `EMBEDDING_API_KEY`, `LLM_MODEL`,
    /// `GEMINI_API_KEY`, `APIS_GEMINI_LIST`, `MODEL_RERANKER`,
    /// `APIS_COHERE_LIST`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let csv = |value: String| -> Vec<String> {
            value
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        };

        if let Some(url) = get("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(key) = get("QDRANT_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(collection) = get("COLLECTION_NAME") {
            self.vector_store.collection = collection;
        }
        if let Some(model) = get("MODEL_EMBEDDING") {
            self.embedding.model = model;
        }
        if let Some(url) = get("EMBEDDING_BASE_URL") {
            self.embedding.base_url = url;
        }
        if let Some(key) = get("EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = get("MODEL_RERANKER") {
            self.reranker.model = model;
        }
        if let Some(list) = get("APIS_GEMINI_LIST") {
            self.credentials.gemini_keys = csv(list);
        }
        // A single key only fills an otherwise empty pool.
        if self.credentials.gemini_keys.is_empty()
            && let Some(key) = get("GEMINI_API_KEY")
        {
            self.credentials.gemini_keys = vec![key];
        }
        if let Some(list) = get("APIS_COHERE_LIST") {
            self.credentials.cohere_keys = csv(list);
        }
    }

    /// Validate configuration values.
    ///
    /// Fails on empty credential pools, non-positive sizes or timeouts,
    /// and a similarity threshold outside `[-1, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.gemini_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(RagErr::EmptyCredentialPool {
                service: "gemini".to_string(),
            });
        }
        if self.credentials.cohere_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(RagErr::EmptyCredentialPool {
                service: "cohere".to_string(),
            });
        }

        let positive = [
            ("search.default_top_k", self.search.default_top_k),
            ("search.rerank_top_n", self.search.rerank_top_n),
            ("search.num_queries", self.search.num_queries),
            ("embedding.dimension", self.embedding.dimension),
            ("embedding.timeout_secs", self.embedding.timeout_secs),
            ("vector_store.timeout_secs", self.vector_store.timeout_secs),
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("reranker.timeout_secs", self.reranker.timeout_secs),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(RagErr::ConfigError {
                    field: field.to_string(),
                    cause: format!("must be positive, got {value}"),
                });
            }
        }

        let threshold = self.search.default_score_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(RagErr::ConfigError {
                field: "search.default_score_threshold".to_string(),
                cause: format!("must be within [-1.0, 1.0], got {threshold}"),
            });
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(RagErr::ConfigError {
                field: "vector_store.collection".to_string(),
                cause: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Render the configuration as TOML with secrets masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        let mask = |keys: &mut Vec<String>| {
            for key in keys.iter_mut() {
                *key = redact(key);
            }
        };
        mask(&mut redacted.credentials.gemini_keys);
        mask(&mut redacted.credentials.cohere_keys);
        redacted.vector_store.api_key = redacted.vector_store.api_key.as_deref().map(redact);
        redacted.embedding.api_key = redacted.embedding.api_key.as_deref().map(redact);
        toml::to_string_pretty(&redacted).map_err(|e| RagErr::ConfigError {
            field: "config".to_string(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
