//! RAG orchestration.
//!
//! [`RagService`] wires the pipeline stages together:
//! expansion, multi-query retrieval, reranking, context assembly and
//! answer generation. It is `Send + Sync` and meant to be shared behind
//! an `Arc`.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::config::RagConfig;
use crate::config::SearchConfig;
use crate::context::format_context;
use crate::embeddings::OpenAIEmbeddings;
use crate::error::Result;
use crate::generator::AnswerGenerator;
use crate::keys::KeyPool;
use crate::llm::GeminiClient;
use crate::query::QueryExpander;
use crate::reranker::CohereReranker;
use crate::reranker::RerankService;
use crate::search::MultiQueryRetriever;
use crate::traits::EmbeddingProvider;
use crate::traits::RerankProvider;
use crate::traits::TextGenerator;
use crate::traits::VectorStore;
use crate::types::Document;
use crate::vector::QdrantStore;
use crate::vector::VectorSearchClient;

/// Answer given when retrieval finds nothing.
pub const NO_INFORMATION_ANSWER: &str = "Xin lỗi, tôi không tìm thấy thông tin liên quan đến câu hỏi của bạn. Bạn có thể diễn đạt lại câu hỏi hoặc liên hệ bác sĩ để được tư vấn trực tiếp.";

/// Parameters for [`RagService::ask`]. Unset values use configured defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub score_threshold: Option<f32>,
    #[serde(default = "default_true")]
    pub use_query_expansion: bool,
    #[serde(default)]
    pub rerank_top_n: Option<usize>,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            score_threshold: None,
            use_query_expansion: true,
            rerank_top_n: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = Some(score_threshold);
        self
    }

    pub fn with_query_expansion(mut self, enabled: bool) -> Self {
        self.use_query_expansion = enabled;
        self
    }

    pub fn with_rerank_top_n(mut self, rerank_top_n: usize) -> Self {
        self.rerank_top_n = Some(rerank_top_n);
        self
    }
}

/// Parameters for [`RagService::search_only`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub score_threshold: Option<f32>,
    #[serde(default = "default_true")]
    pub use_rerank: bool,
    #[serde(default)]
    pub rerank_top_n: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            score_threshold: None,
            use_rerank: true,
            rerank_top_n: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = Some(score_threshold);
        self
    }

    pub fn with_rerank(mut self, enabled: bool) -> Self {
        self.use_rerank = enabled;
        self
    }

    pub fn with_rerank_top_n(mut self, rerank_top_n: usize) -> Self {
        self.rerank_top_n = Some(rerank_top_n);
        self
    }
}

fn default_true() -> bool {
    true
}

/// Result of [`RagService::ask`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskOutcome {
    pub query: String,
    pub answer: String,
    /// Documents the answer was generated from
    pub documents: Vec<Document>,
    /// Every unique document retrieved, before reranking
    pub all_documents: Vec<Document>,
    pub context: String,
    pub num_documents: usize,
    pub num_reranked: usize,
    pub queries_used: Vec<String>,
}

/// The retrieval-augmented question answering pipeline.
#[derive(Clone)]
pub struct RagService {
    expander: QueryExpander,
    retriever: MultiQueryRetriever,
    reranker: RerankService,
    answerer: AnswerGenerator,
    defaults: SearchConfig,
}

impl RagService {
    /// Assemble a service from its backends.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn TextGenerator>,
        rerank_provider: Arc<dyn RerankProvider>,
        defaults: SearchConfig,
    ) -> Self {
        Self {
            expander: QueryExpander::new(generator.clone()),
            retriever: MultiQueryRetriever::new(VectorSearchClient::new(embedder, store)),
            reranker: RerankService::new(rerank_provider),
            answerer: AnswerGenerator::new(generator),
            defaults,
        }
    }

    /// Build the production pipeline: OpenAI-compatible embeddings, Qdrant,
    /// Gemini and Cohere.
    ///
    /// Fails if the configuration is invalid, including empty key pools.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        config.validate()?;

        let gemini_keys = Arc::new(KeyPool::new("gemini", &config.credentials.gemini_keys)?);
        let cohere_keys = Arc::new(KeyPool::new("cohere", &config.credentials.cohere_keys)?);

        let embedder = OpenAIEmbeddings::from_config(&config.embedding)?;
        let store = QdrantStore::from_config(&config.vector_store)?;
        let generator = GeminiClient::from_config(&config.llm, gemini_keys)?;
        let reranker = CohereReranker::from_config(&config.reranker, cohere_keys)?;

        tracing::info!(
            collection = %config.vector_store.collection,
            embedding_model = %config.embedding.model,
            llm_model = %config.llm.model,
            reranker_model = %config.reranker.model,
            "RAG service initialized"
        );

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(store),
            Arc::new(generator),
            Arc::new(reranker),
            config.search.clone(),
        ))
    }

    /// Answer a question from the knowledge base.
    ///
    /// Embedding and vector search failures are returned as errors. Every
    /// other stage degrades instead of failing.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskOutcome> {
        let top_k = request.top_k.unwrap_or_else(|| self.default_top_k());
        let score_threshold = request
            .score_threshold
            .unwrap_or(self.defaults.default_score_threshold);
        let rerank_top_n = request
            .rerank_top_n
            .unwrap_or_else(|| self.default_rerank_top_n());

        let queries = if request.use_query_expansion {
            let n = self.defaults.num_queries.max(1) as usize;
            self.expander.expand(&request.query, n).await
        } else {
            vec![request.query.clone()]
        };
        tracing::info!(queries = queries.len(), top_k, "Searching");

        let documents = self
            .retriever
            .retrieve(&queries, top_k, score_threshold)
            .await?;
        tracing::info!(documents = documents.len(), "Retrieved unique documents");

        if documents.is_empty() {
            return Ok(AskOutcome {
                query: request.query.clone(),
                answer: NO_INFORMATION_ANSWER.to_string(),
                documents: Vec::new(),
                all_documents: Vec::new(),
                context: String::new(),
                num_documents: 0,
                num_reranked: 0,
                queries_used: queries,
            });
        }

        let reranked = self
            .reranker
            .rerank_with_fallback(&request.query, &documents, rerank_top_n)
            .await;
        tracing::info!(reranked = reranked.len(), "Reranked documents");

        let context = format_context(&reranked);
        let answer = self.answerer.generate(&request.query, &context).await;

        Ok(AskOutcome {
            query: request.query.clone(),
            answer,
            num_documents: documents.len(),
            num_reranked: reranked.len(),
            documents: reranked,
            all_documents: documents,
            context,
            queries_used: queries,
        })
    }

    /// Retrieve documents for a single query without generating an answer.
    pub async fn search_only(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        let top_k = request.top_k.unwrap_or_else(|| self.default_top_k());
        let score_threshold = request
            .score_threshold
            .unwrap_or(self.defaults.default_score_threshold);

        let documents = self
            .retriever
            .search(&request.query, top_k, score_threshold)
            .await?;

        if !request.use_rerank || documents.is_empty() {
            return Ok(documents);
        }

        let rerank_top_n = request
            .rerank_top_n
            .unwrap_or_else(|| self.default_rerank_top_n());
        Ok(self
            .reranker
            .rerank_with_fallback(&request.query, &documents, rerank_top_n)
            .await)
    }

    fn default_top_k(&self) -> usize {
        self.defaults.default_top_k.max(1) as usize
    }

    fn default_rerank_top_n(&self) -> usize {
        self.defaults.rerank_top_n.max(1) as usize
    }
}

#[cfg(test)]
#[path = "service.test.rs"]
mod tests;
