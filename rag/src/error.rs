//! Error types for the RAG pipeline.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RagErr>;

/// Errors raised by the pipeline and its backends.
///
/// Only configuration, embedding and vector search failures are meant to
/// reach callers of [`crate::RagService`]. Expansion, reranking and
/// generation failures are absorbed at their component boundary.
#[derive(Debug, thiserror::Error)]
pub enum RagErr {
    #[error("Invalid config '{field}': {cause}")]
    ConfigError { field: String, cause: String },

    #[error("Failed to parse config {path:?}: {cause}")]
    ConfigParseError { path: PathBuf, cause: String },

    #[error("No API keys available for {service}")]
    EmptyCredentialPool { service: String },

    #[error("Embedding failed: {cause}")]
    EmbeddingFailed { cause: String },

    #[error("Vector search failed: {cause}")]
    SearchFailed { cause: String },

    #[error("Generation failed: {cause}")]
    GenerationFailed { cause: String },

    #[error("Rerank failed: {cause}")]
    RerankFailed { cause: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
