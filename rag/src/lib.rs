//! ViMedBot retrieval-augmented question answering.
//!
//! Answers health questions in Vietnamese from a curated medical knowledge
//! base held in a vector index.
//!
//! ## Pipeline
//!
//! | Stage | Module | On failure |
//! |-------|--------|------------|
//! | **Query expansion** | [`query`] | original query only |
//! | **Multi-query retrieval** | [`search`], [`vector`] | request fails |
//! | **Reranking** | [`reranker`] | similarity order |
//! | **Context assembly** | [`context`] | - |
//! | **Answer generation** | [`generator`] | apology with the error |
//!
//! ## Quick Start
//!
//! ```toml
//! # .vimed/config.toml
//! [vector_store]
//! url = "http://localhost:6333"
//! collection = "med_vn_rag"
//!
//! [credentials]
//! gemini_keys = ["..."]
//! cohere_keys = ["..."]
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod fallback;
pub mod keys;
pub mod service;
pub mod traits;
pub mod types;

// Pipeline stages
pub mod context;
pub mod embeddings;
pub mod generator;
pub mod llm;
pub mod query;
pub mod reranker;
pub mod search;
pub mod vector;

// Re-exports
pub use config::RagConfig;
pub use config::SearchConfig;
pub use context::NO_CONTEXT_SENTINEL;
pub use context::format_context;
pub use error::RagErr;
pub use error::Result;
pub use generator::AnswerGenerator;
pub use generator::REFUSAL_ANSWER;
pub use generator::is_refusal;
pub use keys::KeyPool;
pub use query::QueryExpander;
pub use reranker::RerankService;
pub use search::MultiQueryRetriever;
pub use service::AskOutcome;
pub use service::AskRequest;
pub use service::NO_INFORMATION_ANSWER;
pub use service::RagService;
pub use service::SearchRequest;
pub use traits::EmbeddingProvider;
pub use traits::RerankProvider;
pub use traits::TextGenerator;
pub use traits::VectorStore;
pub use types::Document;
pub use types::Payload;
pub use types::RerankHit;
pub use types::ScoredPoint;
pub use vector::VectorSearchClient;
