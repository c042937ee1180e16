use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::error::RagErr;
use crate::traits::EmbeddingProvider;
use crate::traits::VectorStore;
use crate::types::Payload;
use crate::types::ScoredPoint;

/// Embeds each known query as a one-element vector holding its slot.
struct TableEmbedder {
    slots: HashMap<String, f32>,
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
        self.slots
            .get(text)
            .map(|slot| vec![*slot])
            .ok_or_else(|| RagErr::EmbeddingFailed {
                cause: format!("unknown query {text}"),
            })
    }
}

/// Returns canned hits per slot, sleeping `delay_ms` first.
struct CannedStore {
    hits: Vec<Vec<(&'static str, &'static str, f32)>>,
    delay_ms: Vec<u64>,
}

#[async_trait]
impl VectorStore for CannedStore {
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> crate::error::Result<Vec<ScoredPoint>> {
        let slot = vector[0] as usize;
        tokio::time::sleep(Duration::from_millis(self.delay_ms[slot])).await;
        Ok(self.hits[slot]
            .iter()
            .filter(|(_, _, score)| *score >= score_threshold)
            .take(limit)
            .map(|(id, text, score)| {
                let mut payload = Payload::new();
                payload.insert("text".to_string(), json!(text));
                ScoredPoint {
                    id: id.to_string(),
                    score: *score,
                    payload,
                }
            })
            .collect())
    }
}

fn retriever(
    queries: &[&str],
    hits: Vec<Vec<(&'static str, &'static str, f32)>>,
    delay_ms: Vec<u64>,
) -> MultiQueryRetriever {
    let embedder = TableEmbedder {
        slots: queries
            .iter()
            .enumerate()
            .map(|(i, q)| (q.to_string(), i as f32))
            .collect(),
    };
    let store = CannedStore { hits, delay_ms };
    MultiQueryRetriever::new(VectorSearchClient::new(Arc::new(embedder), Arc::new(store)))
}

fn queries(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_single_query_passes_through() {
    let r = retriever(&["q"], vec![vec![("1", "a", 0.9), ("2", "a", 0.8)]], vec![0]);
    let docs = r.retrieve(&queries(&["q"]), 10, 0.5).await.unwrap();
    // No merge for a single query, duplicates survive.
    assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn test_merges_by_text_keeping_best() {
    let r = retriever(
        &["q0", "q1", "q2"],
        vec![
            vec![("a0", "fever", 0.7), ("b0", "cough", 0.6)],
            vec![("a1", "fever", 0.9), ("c1", "rash", 0.55)],
            vec![("b2", "cough", 0.6)],
        ],
        vec![0, 0, 0],
    );
    let docs = r.retrieve(&queries(&["q0", "q1", "q2"]), 10, 0.5).await.unwrap();
    let got: Vec<(&str, f32)> = docs.iter().map(|d| (d.id.as_str(), d.score)).collect();
    assert_eq!(got, vec![("a1", 0.9), ("b0", 0.6), ("c1", 0.55)]);
}

#[tokio::test]
async fn test_merge_order_ignores_completion_order() {
    // The first query finishes last; ties must still favor it.
    let r = retriever(
        &["slow", "fast"],
        vec![vec![("slow-hit", "same", 0.8)], vec![("fast-hit", "same", 0.8)]],
        vec![50, 0],
    );
    let docs = r.retrieve(&queries(&["slow", "fast"]), 10, 0.5).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "slow-hit");
}

#[tokio::test]
async fn test_failure_propagates() {
    let r = retriever(&["known"], vec![vec![("1", "a", 0.9)]], vec![0]);
    let err = r
        .retrieve(&queries(&["known", "unknown"]), 10, 0.5)
        .await
        .unwrap_err();
    assert!(matches!(err, RagErr::EmbeddingFailed { .. }));
}

#[tokio::test]
async fn test_empty_query_set() {
    let r = retriever(&[], vec![], vec![]);
    assert!(r.retrieve(&[], 10, 0.5).await.unwrap().is_empty());
}
