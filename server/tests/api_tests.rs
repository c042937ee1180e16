use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use vimed_rag::EmbeddingProvider;
use vimed_rag::NO_INFORMATION_ANSWER;
use vimed_rag::Payload;
use vimed_rag::RagErr;
use vimed_rag::RagService;
use vimed_rag::RerankHit;
use vimed_rag::RerankProvider;
use vimed_rag::ScoredPoint;
use vimed_rag::SearchConfig;
use vimed_rag::TextGenerator;
use vimed_rag::VectorStore;
use vimed_server::AppState;
use vimed_server::create_router;

struct FakeEmbedder;

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, _text: &str) -> vimed_rag::Result<Vec<f32>> {
        Ok(vec![0.6, 0.8])
    }
}

enum FakeStore {
    Hits(Vec<(&'static str, String, f32)>),
    Down,
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn search(
        &self,
        _vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> vimed_rag::Result<Vec<ScoredPoint>> {
        match self {
            FakeStore::Down => Err(RagErr::SearchFailed {
                cause: "connection refused".to_string(),
            }),
            FakeStore::Hits(hits) => Ok(hits
                .iter()
                .filter(|(_, _, score)| *score >= score_threshold)
                .take(limit)
                .map(|(id, text, score)| {
                    let mut payload = Payload::new();
                    payload.insert("text".to_string(), json!(text));
                    payload.insert("title".to_string(), json!(format!("Bài {id}")));
                    payload.insert("category".to_string(), json!("Nhi khoa"));
                    ScoredPoint {
                        id: id.to_string(),
                        score: *score,
                        payload,
                    }
                })
                .collect()),
        }
    }
}

struct FakeModel;

#[async_trait]
impl TextGenerator for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> vimed_rag::Result<String> {
        if prompt.contains("Câu hỏi gốc:") {
            return Ok("Biểu hiện của sốt?\nSốt do đâu?".to_string());
        }
        Ok("Sốt là phản ứng tự nhiên của cơ thể.".to_string())
    }
}

/// Scores documents by position, first best.
struct FakeReranker;

#[async_trait]
impl RerankProvider for FakeReranker {
    fn name(&self) -> &str {
        "fake"
    }

    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> vimed_rag::Result<Vec<RerankHit>> {
        Ok((0..documents.len().min(top_n))
            .map(|index| RerankHit {
                index,
                relevance_score: 0.9 - index as f32 * 0.1,
            })
            .collect())
    }
}

async fn spawn_app(store: FakeStore) -> String {
    let service = RagService::new(
        Arc::new(FakeEmbedder),
        Arc::new(store),
        Arc::new(FakeModel),
        Arc::new(FakeReranker),
        SearchConfig::default(),
    );
    let app = create_router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn default_hits() -> FakeStore {
    FakeStore::Hits(vec![
        ("1", "Sốt là khi thân nhiệt trên 37,5 độ.".to_string(), 0.91),
        ("2", "x".repeat(600), 0.82),
        ("3", "Hạ sốt bằng cách chườm ấm.".to_string(), 0.74),
    ])
}

fn client() -> Client {
    Client::new()
}

#[tokio::test]
async fn test_health_endpoints() {
    let base_url = spawn_app(default_hits()).await;

    let resp = client()
        .get(format!("{base_url}/api/v1/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "status": "healthy", "service": "ViMedBot API", "version": "1.0.0" })
    );

    let body: Value = client()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "healthy", "service": "ViMedBot" }));
}

#[tokio::test]
async fn test_chat() {
    let base_url = spawn_app(default_hits()).await;

    let resp = client()
        .post(format!("{base_url}/api/v1/chat"))
        .json(&json!({ "message": "Sốt là gì?", "conversation_id": "conv_42", "rerank_top_n": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["answer"], "Sốt là phản ứng tự nhiên của cơ thể.");
    assert_eq!(body["conversation_id"], "conv_42");
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        body["metadata"],
        json!({ "num_documents_found": 3, "num_documents_used": 2, "queries_generated": 3 })
    );
}

#[tokio::test]
async fn test_chat_generates_conversation_id() {
    let base_url = spawn_app(default_hits()).await;

    let body: Value = client()
        .post(format!("{base_url}/api/v1/chat"))
        .json(&json!({ "message": "Sốt là gì?", "use_query_expansion": false }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["conversation_id"].as_str().unwrap();
    assert!(id.starts_with("conv_"));
    assert!(id["conv_".len()..].parse::<u128>().is_ok());
    assert_eq!(body["metadata"]["queries_generated"], 1);
}

#[tokio::test]
async fn test_chat_no_documents() {
    let base_url = spawn_app(FakeStore::Hits(vec![])).await;

    let body: Value = client()
        .post(format!("{base_url}/api/v1/chat"))
        .json(&json!({ "message": "Sốt là gì?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["answer"], NO_INFORMATION_ANSWER);
    assert_eq!(body["metadata"]["num_documents_found"], 0);
    assert_eq!(body["metadata"]["num_documents_used"], 0);
}

#[tokio::test]
async fn test_chat_validation() {
    let base_url = spawn_app(default_hits()).await;

    for body in [
        json!({ "message": "" }),
        json!({ "message": "a".repeat(1001) }),
        json!({ "message": "q", "top_k": 0 }),
        json!({ "message": "q", "top_k": 51 }),
        json!({ "message": "q", "rerank_top_n": 21 }),
        json!({ "conversation_id": "missing message" }),
    ] {
        let resp = client()
            .post(format!("{base_url}/api/v1/chat"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let err: Value = resp.json().await.unwrap();
        assert!(err["error"].is_string());
    }
}

#[tokio::test]
async fn test_chat_pipeline_failure() {
    let base_url = spawn_app(FakeStore::Down).await;

    let resp = client()
        .post(format!("{base_url}/api/v1/chat"))
        .json(&json!({ "message": "Sốt là gì?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Lỗi xử lý: "));
}

#[tokio::test]
async fn test_search() {
    let base_url = spawn_app(default_hits()).await;

    let resp = client()
        .post(format!("{base_url}/api/v1/search"))
        .json(&json!({ "query": "sốt", "rerank_top_n": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let results: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Bài 1");
    assert_eq!(results[0]["category"], "Nhi khoa");
    assert_eq!(results[0]["text"], "Sốt là khi thân nhiệt trên 37,5 độ....");
    assert!((results[0]["score"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    assert!((results[0]["rerank_score"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(results[1]["text"].as_str().unwrap().chars().count(), 503);
}

#[tokio::test]
async fn test_search_without_rerank() {
    let base_url = spawn_app(default_hits()).await;

    let results: Vec<Value> = client()
        .post(format!("{base_url}/api/v1/search"))
        .json(&json!({ "query": "sốt", "use_rerank": false, "top_k": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["rerank_score"].is_null()));
}

#[tokio::test]
async fn test_search_validation() {
    let base_url = spawn_app(default_hits()).await;

    let resp = client()
        .post(format!("{base_url}/api/v1/search"))
        .json(&json!({ "query": "a".repeat(501) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats() {
    let base_url = spawn_app(default_hits()).await;
    let body: Value = client()
        .get(format!("{base_url}/api/v1/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["vector_search"], "ok");
    assert_eq!(body["services"]["qdrant"], "connected");

    let base_url = spawn_app(FakeStore::Down).await;
    let body: Value = client()
        .get(format!("{base_url}/api/v1/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "degraded");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
