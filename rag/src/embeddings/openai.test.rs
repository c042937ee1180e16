use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::*;

#[test]
fn test_new() {
    let provider = OpenAIEmbeddings::new();
    assert_eq!(provider.dimension, default_embedding_dimension());
    assert_eq!(provider.model, DEFAULT_MODEL);
}

#[test]
fn test_builders() {
    let provider = OpenAIEmbeddings::new()
        .with_model("bge-m3")
        .with_dimension(3)
        .with_base_url("https://custom.api.com")
        .with_api_key("k");
    assert_eq!(provider.model, "bge-m3");
    assert_eq!(provider.dimension, 3);
    assert_eq!(provider.base_url, "https://custom.api.com");
    assert_eq!(provider.api_key.as_deref(), Some("k"));
}

#[test]
fn test_l2_normalize() {
    let mut v = vec![3.0, 4.0];
    l2_normalize(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);

    let mut zero = vec![0.0, 0.0];
    l2_normalize(&mut zero);
    assert_eq!(zero, vec![0.0, 0.0]);
}

#[tokio::test]
async fn test_embed_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("Authorization", "Bearer emb-key"))
        .and(body_partial_json(json!({ "input": ["sốt là gì"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [3.0, 4.0] }],
            "model": "test"
        })))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddings::new()
        .with_base_url(server.uri())
        .with_dimension(2)
        .with_api_key("emb-key");

    let vector = provider.embed("sốt là gì").await.unwrap();
    assert!((vector[0] - 0.6).abs() < 1e-6);
    assert!((vector[1] - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_embed_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddings::new()
        .with_base_url(server.uri())
        .with_dimension(2);
    let err = provider.embed("sốt").await.unwrap_err();
    assert!(matches!(err, RagErr::EmbeddingFailed { ref cause } if cause.contains("503")));
}

#[tokio::test]
async fn test_embed_dimension_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [1.0, 0.0, 0.0] }]
        })))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddings::new()
        .with_base_url(server.uri())
        .with_dimension(2);
    let err = provider.embed("sốt").await.unwrap_err();
    assert!(matches!(err, RagErr::EmbeddingFailed { .. }));
}

#[tokio::test]
async fn test_embed_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddings::new()
        .with_base_url(server.uri())
        .with_dimension(2);
    assert!(provider.embed("sốt").await.is_err());
}
