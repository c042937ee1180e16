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
fn test_search_url() {
    let store = QdrantStore::new("http://localhost:6333/", "med_vn_rag");
    assert_eq!(
        store.search_url(),
        "http://localhost:6333/collections/med_vn_rag/points/search"
    );
}

#[test]
fn test_point_id_to_string() {
    assert_eq!(point_id_to_string(&json!(17)), "17");
    assert_eq!(
        point_id_to_string(&json!("5c56c793-69f3-4fbf-87e6-c4bf54c28c26")),
        "5c56c793-69f3-4fbf-87e6-c4bf54c28c26"
    );
}

#[tokio::test]
async fn test_search_maps_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/med/points/search"))
        .and(header("api-key", "qk"))
        .and(body_partial_json(json!({
            "limit": 5,
            "score_threshold": 0.5,
            "with_payload": true,
            "with_vector": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                { "id": 1, "version": 3, "score": 0.91, "payload": { "text": "a" } },
                { "id": "uuid-2", "version": 3, "score": 0.72, "payload": { "text": "b" } }
            ],
            "status": "ok",
            "time": 0.002
        })))
        .mount(&server)
        .await;

    let store = QdrantStore::new(server.uri(), "med").with_api_key("qk");
    let points = store.search(&[0.1, 0.2], 5, 0.5).await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].id, "1");
    assert_eq!(points[0].score, 0.91);
    assert_eq!(points[0].payload.get("text"), Some(&json!("a")));
    assert_eq!(points[1].id, "uuid-2");
}

#[tokio::test]
async fn test_search_enforces_threshold_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/med/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                { "id": 1, "score": 0.4, "payload": {} },
                { "id": 2, "score": 0.8 },
                { "id": 3, "score": 0.9, "payload": {} },
                { "id": 4, "score": 0.6, "payload": {} }
            ]
        })))
        .mount(&server)
        .await;

    let store = QdrantStore::new(server.uri(), "med");
    let points = store.search(&[0.1], 2, 0.5).await.unwrap();
    let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2"]);
    assert!(points[1].payload.is_empty());
}

#[tokio::test]
async fn test_search_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/missing/points/search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": { "error": "Not found: Collection `missing` doesn't exist!" }
        })))
        .mount(&server)
        .await;

    let store = QdrantStore::new(server.uri(), "missing");
    let err = store.search(&[0.1], 2, 0.5).await.unwrap_err();
    assert!(matches!(err, RagErr::SearchFailed { ref cause } if cause.contains("404")));
}
