use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::*;

fn pool(keys: &[&str]) -> Arc<KeyPool> {
    Arc::new(KeyPool::new("cohere", keys.iter().copied()).unwrap())
}

fn docs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_endpoint() {
    let reranker = CohereReranker::new(pool(&["k"]), "rerank-multilingual-v3.0");
    assert_eq!(reranker.endpoint(), "https://api.cohere.com/v2/rerank");

    let custom = reranker.with_base_url("http://localhost:9000/");
    assert_eq!(custom.endpoint(), "http://localhost:9000/v2/rerank");
}

#[tokio::test]
async fn test_rerank_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/rerank"))
        .and(header("authorization", "Bearer c1"))
        .and(body_partial_json(json!({
            "model": "rerank-multilingual-v3.0",
            "query": "sốt",
            "documents": ["a", "b", "c"],
            "top_n": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r-1",
            "results": [
                { "index": 2, "relevance_score": 0.93 },
                { "index": 0, "relevance_score": 0.41 }
            ],
            "meta": { "billed_units": { "search_units": 1 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reranker =
        CohereReranker::new(pool(&["c1"]), "rerank-multilingual-v3.0").with_base_url(server.uri());
    let hits = reranker.rerank("sốt", &docs(&["a", "b", "c"]), 2).await.unwrap();
    assert_eq!(
        hits,
        vec![
            RerankHit { index: 2, relevance_score: 0.93 },
            RerankHit { index: 0, relevance_score: 0.41 },
        ]
    );
}

#[tokio::test]
async fn test_rerank_caps_top_n_to_document_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "top_n": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "index": 0, "relevance_score": 0.5 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reranker = CohereReranker::new(pool(&["k"]), "m").with_base_url(server.uri());
    let hits = reranker.rerank("q", &docs(&["only"]), 5).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_rerank_empty_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let reranker = CohereReranker::new(pool(&["k"]), "m").with_base_url(server.uri());
    assert!(reranker.rerank("q", &[], 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rerank_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let reranker = CohereReranker::new(pool(&["k"]), "m").with_base_url(server.uri());
    let err = reranker.rerank("q", &docs(&["a"]), 1).await.unwrap_err();
    assert!(matches!(err, RagErr::RerankFailed { ref cause } if cause.contains("429")));
}

#[tokio::test]
async fn test_rerank_out_of_range_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "index": 7, "relevance_score": 0.9 }]
        })))
        .mount(&server)
        .await;

    let reranker = CohereReranker::new(pool(&["k"]), "m").with_base_url(server.uri());
    let err = reranker.rerank("q", &docs(&["a", "b"]), 2).await.unwrap_err();
    assert!(matches!(err, RagErr::RerankFailed { ref cause } if cause.contains("out of range")));
}
