use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::error::RagErr;
use crate::types::Payload;
use crate::types::RerankHit;
use crate::types::ScoredPoint;

/// Embeds every text as `[len]` and records the texts it saw.
#[derive(Default)]
struct RecordingEmbedder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(vec![text.len() as f32])
    }
}

/// Returns the same hits for every search, or fails.
struct StaticStore {
    hits: Vec<(&'static str, &'static str, f32)>,
    fail: bool,
}

#[async_trait]
impl VectorStore for StaticStore {
    async fn search(
        &self,
        _vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredPoint>> {
        if self.fail {
            return Err(RagErr::SearchFailed {
                cause: "connection refused".to_string(),
            });
        }
        Ok(self
            .hits
            .iter()
            .filter(|(_, _, score)| *score >= score_threshold)
            .take(limit)
            .map(|(id, text, score)| {
                let mut payload = Payload::new();
                payload.insert("text".to_string(), json!(text));
                payload.insert("title".to_string(), json!(format!("Bài {id}")));
                ScoredPoint {
                    id: id.to_string(),
                    score: *score,
                    payload,
                }
            })
            .collect())
    }
}

/// Answers expansion prompts with paraphrases and answer prompts with a
/// fixed answer, counting both.
#[derive(Default)]
struct ScriptedModel {
    expansions: AtomicUsize,
    answers: AtomicUsize,
    last_answer_prompt: Mutex<String>,
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains("Câu hỏi gốc:") {
            self.expansions.fetch_add(1, Ordering::SeqCst);
            return Ok("Nguyên nhân gây sốt?\nTriệu chứng của sốt?".to_string());
        }
        self.answers.fetch_add(1, Ordering::SeqCst);
        *self.last_answer_prompt.lock().unwrap() = prompt.to_string();
        Ok("Sốt là phản ứng tự nhiên của cơ thể.".to_string())
    }
}

/// Ranks documents in reverse input order, or fails.
#[derive(Default)]
struct ReverseReranker {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl RerankProvider for ReverseReranker {
    fn name(&self) -> &str {
        "reverse"
    }

    async fn rerank(&self, _query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagErr::RerankFailed {
                cause: "quota".to_string(),
            });
        }
        Ok((0..documents.len())
            .rev()
            .take(top_n)
            .enumerate()
            .map(|(rank, index)| RerankHit {
                index,
                relevance_score: 1.0 - rank as f32 * 0.1,
            })
            .collect())
    }
}

struct Harness {
    embedder: Arc<RecordingEmbedder>,
    model: Arc<ScriptedModel>,
    reranker: Arc<ReverseReranker>,
    service: RagService,
}

fn harness(hits: Vec<(&'static str, &'static str, f32)>, store_fails: bool, rerank_fails: bool) -> Harness {
    let embedder = Arc::new(RecordingEmbedder::default());
    let model = Arc::new(ScriptedModel::default());
    let reranker = Arc::new(ReverseReranker {
        fail: rerank_fails,
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(StaticStore {
        hits,
        fail: store_fails,
    });
    let service = RagService::new(
        embedder.clone(),
        store,
        model.clone(),
        reranker.clone(),
        SearchConfig::default(),
    );
    Harness {
        embedder,
        model,
        reranker,
        service,
    }
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[tokio::test]
async fn test_ask_full_pipeline() {
    let h = harness(
        vec![("1", "sốt cao", 0.9), ("2", "ho khan", 0.8), ("3", "phát ban", 0.7)],
        false,
        false,
    );

    let outcome = h
        .service
        .ask(&AskRequest::new("Sốt là gì?").with_rerank_top_n(2))
        .await
        .unwrap();

    assert_eq!(
        outcome.queries_used,
        vec![
            "Sốt là gì?".to_string(),
            "Nguyên nhân gây sốt?".to_string(),
            "Triệu chứng của sốt?".to_string(),
        ]
    );
    // Every query returned the same three texts; merging leaves three.
    assert_eq!(outcome.num_documents, 3);
    assert_eq!(ids(&outcome.all_documents), vec!["1", "2", "3"]);
    assert_eq!(outcome.num_reranked, 2);
    assert_eq!(ids(&outcome.documents), vec!["3", "2"]);
    assert!(outcome.documents.iter().all(Document::is_reranked));
    assert_eq!(outcome.answer, "Sốt là phản ứng tự nhiên của cơ thể.");
    assert!(outcome.context.starts_with("=== Tài liệu 1 ===\nĐiểm Rerank: 1.000 | Điểm gốc: 0.700"));

    let prompt = h.model.last_answer_prompt.lock().unwrap().clone();
    assert!(prompt.contains(&outcome.context));
    assert!(prompt.contains("CÂU HỎI: Sốt là gì?"));
    assert_eq!(h.model.expansions.load(Ordering::SeqCst), 1);
    assert_eq!(h.model.answers.load(Ordering::SeqCst), 1);
    assert_eq!(h.embedder.seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_ask_without_expansion() {
    let h = harness(vec![("1", "sốt cao", 0.9)], false, false);
    let outcome = h
        .service
        .ask(&AskRequest::new("Sốt là gì?").with_query_expansion(false))
        .await
        .unwrap();

    assert_eq!(outcome.queries_used, vec!["Sốt là gì?".to_string()]);
    assert_eq!(h.model.expansions.load(Ordering::SeqCst), 0);
    assert_eq!(*h.embedder.seen.lock().unwrap(), vec!["Sốt là gì?".to_string()]);
}

#[tokio::test]
async fn test_ask_empty_retrieval_short_circuits() {
    let h = harness(vec![("1", "irrelevant", 0.2)], false, false);
    let outcome = h.service.ask(&AskRequest::new("Sốt là gì?")).await.unwrap();

    assert_eq!(outcome.answer, NO_INFORMATION_ANSWER);
    assert_eq!(outcome.num_documents, 0);
    assert_eq!(outcome.num_reranked, 0);
    assert!(outcome.documents.is_empty());
    assert!(outcome.all_documents.is_empty());
    assert_eq!(outcome.context, "");
    assert_eq!(outcome.queries_used.len(), 3);
    assert_eq!(h.reranker.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.answers.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ask_rerank_failure_uses_similarity_order() {
    let h = harness(
        vec![("1", "a", 0.6), ("2", "b", 0.95), ("3", "c", 0.7)],
        false,
        true,
    );
    let outcome = h
        .service
        .ask(&AskRequest::new("q").with_query_expansion(false).with_rerank_top_n(2))
        .await
        .unwrap();

    assert_eq!(ids(&outcome.documents), vec!["2", "3"]);
    assert!(outcome.documents.iter().all(|d| !d.is_reranked()));
    assert!(outcome.context.contains("Điểm Rerank: 0.000 | Điểm gốc: 0.950"));
    assert_eq!(h.model.answers.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ask_search_failure_propagates() {
    let h = harness(vec![], true, false);
    let err = h.service.ask(&AskRequest::new("q")).await.unwrap_err();
    assert!(matches!(err, RagErr::SearchFailed { .. }));
    assert_eq!(h.model.answers.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_only_with_and_without_rerank() {
    let h = harness(vec![("1", "a", 0.9), ("2", "b", 0.8), ("3", "c", 0.7)], false, false);

    let plain = h
        .service
        .search_only(&SearchRequest::new("q").with_rerank(false).with_top_k(2))
        .await
        .unwrap();
    assert_eq!(ids(&plain), vec!["1", "2"]);
    assert_eq!(h.reranker.calls.load(Ordering::SeqCst), 0);

    let reranked = h
        .service
        .search_only(&SearchRequest::new("q").with_rerank_top_n(1))
        .await
        .unwrap();
    assert_eq!(ids(&reranked), vec!["3"]);
    assert_eq!(reranked[0].original_score, Some(0.7));
    assert_eq!(h.model.answers.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.expansions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_only_threshold() {
    let h = harness(vec![("1", "a", 0.9), ("2", "b", 0.4)], false, false);
    let docs = h
        .service
        .search_only(&SearchRequest::new("q").with_rerank(false).with_score_threshold(0.3))
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);

    let docs = h
        .service
        .search_only(&SearchRequest::new("q").with_rerank(false))
        .await
        .unwrap();
    assert_eq!(ids(&docs), vec!["1"]);
}

#[test]
fn test_request_defaults_from_json() {
    let request: AskRequest = serde_json::from_value(json!({ "query": "q" })).unwrap();
    assert_eq!(request, AskRequest::new("q"));

    let request: SearchRequest =
        serde_json::from_value(json!({ "query": "q", "use_rerank": false })).unwrap();
    assert_eq!(request, SearchRequest::new("q").with_rerank(false));
}

#[test]
fn test_from_config_requires_keys() {
    let config = RagConfig::default();
    let err = RagService::from_config(&config).err().unwrap();
    assert!(matches!(err, RagErr::EmptyCredentialPool { .. }));
}
