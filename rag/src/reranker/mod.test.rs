use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::error::RagErr;
use crate::error::Result;
use crate::types::Payload;
use crate::types::RerankHit;

/// Provider returning a fixed ranking, or failing when `hits` is `None`.
struct FixedProvider {
    hits: Option<Vec<RerankHit>>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn ranking(hits: &[(usize, f32)]) -> Arc<Self> {
        Arc::new(Self {
            hits: Some(
                hits.iter()
                    .map(|&(index, relevance_score)| RerankHit {
                        index,
                        relevance_score,
                    })
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            hits: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RerankProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn rerank(&self, _query: &str, _documents: &[String], _top_n: usize) -> Result<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hits.clone().ok_or_else(|| RagErr::RerankFailed {
            cause: "quota exhausted".to_string(),
        })
    }
}

fn doc(id: &str, score: f32) -> Document {
    let mut payload = Payload::new();
    payload.insert("text".to_string(), json!(format!("text {id}")));
    Document::from_payload(id, score, payload)
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[tokio::test]
async fn test_rerank_empty_skips_provider() {
    let provider = FixedProvider::ranking(&[(0, 0.9)]);
    let service = RerankService::new(provider.clone());
    assert!(service.rerank("q", &[], 5).await.is_empty());
    assert!(service.rerank_with_fallback("q", &[], 5).await.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rerank_success_sets_scores() {
    let service = RerankService::new(FixedProvider::ranking(&[(2, 0.95), (0, 0.4)]));
    let input = vec![doc("a", 0.7), doc("b", 0.6), doc("c", 0.55)];

    let out = service.rerank("q", &input, 2).await;
    assert_eq!(ids(&out), vec!["c", "a"]);
    assert_eq!(out[0].rerank_score, Some(0.95));
    assert_eq!(out[0].original_score, Some(0.55));
    assert_eq!(out[1].rerank_score, Some(0.4));
    assert_eq!(out[1].original_score, Some(0.7));
}

#[tokio::test]
async fn test_rerank_failure_returns_input_prefix() {
    let service = RerankService::new(FixedProvider::failing());
    let input = vec![doc("a", 0.5), doc("b", 0.9), doc("c", 0.7)];

    let out = service.rerank("q", &input, 2).await;
    assert_eq!(ids(&out), vec!["a", "b"]);
    assert!(out.iter().all(|d| d.rerank_score.is_none()));
}

#[tokio::test]
async fn test_fallback_orders_by_original_score() {
    let service = RerankService::new(FixedProvider::failing());
    let input = vec![
        doc("a", 0.5),
        doc("b", 0.9),
        doc("c", 0.7),
        doc("d", 0.7),
        doc("e", 0.6),
    ];

    let out = service.rerank_with_fallback("q", &input, 3).await;
    assert_eq!(ids(&out), vec!["b", "c", "d"]);
    assert!(out.iter().all(|d| d.rerank_score.is_none()));
}

#[tokio::test]
async fn test_fallback_on_empty_ranking() {
    let provider = FixedProvider::ranking(&[]);
    let service = RerankService::new(provider.clone());
    let input = vec![doc("a", 0.5), doc("b", 0.9), doc("c", 0.7)];

    let out = service.rerank_with_fallback("q", &input, 2).await;
    assert_eq!(ids(&out), vec!["b", "c"]);
    assert!(out.iter().all(|d| d.rerank_score.is_none()));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_keeps_successful_rerank() {
    let service = RerankService::new(FixedProvider::ranking(&[(0, 0.8), (1, 0.2)]));
    let input = vec![doc("low", 0.51), doc("high", 0.99)];

    let out = service.rerank_with_fallback("q", &input, 5).await;
    assert_eq!(ids(&out), vec!["low", "high"]);
    assert!(out.iter().all(Document::is_reranked));
}

#[tokio::test]
async fn test_fallback_never_exceeds_top_n() {
    let input: Vec<Document> = (0..8).map(|i| doc(&format!("d{i}"), i as f32 / 10.0)).collect();
    for top_n in 1..=10 {
        let failing = RerankService::new(FixedProvider::failing());
        let out = failing.rerank_with_fallback("q", &input, top_n).await;
        assert_eq!(out.len(), top_n.min(input.len()));

        let all: Vec<(usize, f32)> = (0..8).map(|i| (i, 1.0 - i as f32 / 10.0)).collect();
        let ranking = RerankService::new(FixedProvider::ranking(&all));
        let out = ranking.rerank_with_fallback("q", &input, top_n).await;
        assert!(out.len() <= top_n);
    }
}
