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
    Arc::new(KeyPool::new("gemini", keys.iter().copied()).unwrap())
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[test]
fn test_model_url() {
    let client = GeminiClient::new(pool(&["k"]), "gemini-2.0-flash");
    assert_eq!(
        client.model_url("gemini-2.0-flash", "generateContent"),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
    );
    assert_eq!(
        client.model_url("models/gemini-2.0-flash", "generateContent"),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
    );
}

#[test]
fn test_request_serialization() {
    let request = GenerateContentRequest {
        contents: vec![Content::user("Xin chào")],
        generation_config: Some(GenerationConfig {
            temperature: Some(0.5),
        }),
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "contents": [{ "parts": [{ "text": "Xin chào" }], "role": "user" }],
            "generationConfig": { "temperature": 0.5 }
        })
    );
}

#[test]
fn test_response_text_skips_thoughts() {
    let response: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "Sốt là " },
                    { "text": "tình trạng tăng thân nhiệt." }
                ]
            }
        }]
    }))
    .unwrap();
    assert_eq!(
        response.text().as_deref(),
        Some("Sốt là tình trạng tăng thân nhiệt.")
    );

    let empty = GenerateContentResponse::default();
    assert_eq!(empty.text(), None);
}

#[tokio::test]
async fn test_generate_rotates_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("from k1")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "k2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("from k2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(pool(&["k1", "k2"]), "gemini-2.0-flash").with_base_url(server.uri());
    assert_eq!(client.generate("a").await.unwrap(), "from k1");
    assert_eq!(client.generate("b").await.unwrap(), "from k2");
    assert_eq!(client.generate("c").await.unwrap(), "from k1");
}

#[tokio::test]
async fn test_generate_sends_prompt_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Sốt là gì?" }] }],
            "generationConfig": { "temperature": 0.25 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(pool(&["k"]), "gemini-2.0-flash")
        .with_base_url(server.uri())
        .with_temperature(0.25);
    assert_eq!(client.generate("Sốt là gì?").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_generate_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(pool(&["k"]), "gemini-2.0-flash").with_base_url(server.uri());
    let err = client.generate("q").await.unwrap_err();
    assert!(matches!(err, RagErr::GenerationFailed { ref cause } if cause.contains("429")));
}

#[tokio::test]
async fn test_generate_blocked_or_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(pool(&["k"]), "gemini-2.0-flash").with_base_url(server.uri());
    let err = client.generate("q").await.unwrap_err();
    assert!(matches!(err, RagErr::GenerationFailed { ref cause } if cause.contains("SAFETY")));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;
    let client = GeminiClient::new(pool(&["k"]), "gemini-2.0-flash").with_base_url(server.uri());
    assert!(client.generate("q").await.is_err());
}
