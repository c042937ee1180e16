use std::collections::HashMap;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

fn with_keys() -> RagConfig {
    let mut config = RagConfig::default();
    config.credentials.gemini_keys = vec!["g1".to_string()];
    config.credentials.cohere_keys = vec!["c1".to_string()];
    config
}

#[test]
fn test_defaults() {
    let config = RagConfig::default();
    assert_eq!(config.vector_store.collection, "med_vn_rag");
    assert_eq!(config.search.default_top_k, 20);
    assert_eq!(config.search.default_score_threshold, 0.5);
    assert_eq!(config.search.rerank_top_n, 5);
    assert_eq!(config.search.num_queries, 3);
    assert_eq!(config.llm.model, "gemini-2.0-flash");
    assert_eq!(config.reranker.model, "rerank-multilingual-v3.0");
}

#[test]
fn test_from_file_partial_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[vector_store]
url = "http://qdrant:6333"

[search]
default_top_k = 12

[credentials]
cohere_keys = ["c1", "c2"]
"#,
    )
    .unwrap();

    let config = RagConfig::from_file(&path).unwrap();
    assert_eq!(config.vector_store.url, "http://qdrant:6333");
    assert_eq!(config.vector_store.collection, "med_vn_rag");
    assert_eq!(config.search.default_top_k, 12);
    assert_eq!(config.search.rerank_top_n, 5);
    assert_eq!(config.credentials.cohere_keys, vec!["c1", "c2"]);
}

#[test]
fn test_from_file_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[search\ndefault_top_k = ").unwrap();

    let err = RagConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, RagErr::ConfigParseError { .. }));
}

#[test]
fn test_load_prefers_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".vimed")).unwrap();
    std::fs::write(
        dir.path().join(".vimed/config.toml"),
        "[vector_store]\ncollection = \"project_collection\"\n",
    )
    .unwrap();

    let config = RagConfig::load_file(dir.path()).unwrap();
    assert_eq!(config.vector_store.collection, "project_collection");
}

#[test]
fn test_apply_env_overrides() {
    let mut config = RagConfig::default();
    config.apply_env(env(&[
        ("QDRANT_URL", " https://cluster.qdrant.io "),
        ("QDRANT_API_KEY", "qk"),
        ("COLLECTION_NAME", "med"),
        ("LLM_MODEL", "gemini-2.5-flash"),
        ("MODEL_RERANKER", "rerank-v3.5"),
        ("MODEL_EMBEDDING", "bge-m3"),
        ("APIS_GEMINI_LIST", "g1, g2,,"),
        ("APIS_COHERE_LIST", "c1"),
    ]));

    assert_eq!(config.vector_store.url, "https://cluster.qdrant.io");
    assert_eq!(config.vector_store.api_key.as_deref(), Some("qk"));
    assert_eq!(config.vector_store.collection, "med");
    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert_eq!(config.reranker.model, "rerank-v3.5");
    assert_eq!(config.embedding.model, "bge-m3");
    assert_eq!(config.credentials.gemini_keys, vec!["g1", "g2"]);
    assert_eq!(config.credentials.cohere_keys, vec!["c1"]);
}

#[test]
fn test_single_gemini_key_fills_empty_pool_only() {
    let mut config = RagConfig::default();
    config.apply_env(env(&[("GEMINI_API_KEY", "single")]));
    assert_eq!(config.credentials.gemini_keys, vec!["single"]);

    let mut config = RagConfig::default();
    config.apply_env(env(&[
        ("GEMINI_API_KEY", "single"),
        ("APIS_GEMINI_LIST", "a,b"),
    ]));
    assert_eq!(config.credentials.gemini_keys, vec!["a", "b"]);
}

#[test]
fn test_blank_env_values_ignored() {
    let mut config = RagConfig::default();
    config.apply_env(env(&[("QDRANT_URL", "   "), ("APIS_COHERE_LIST", "")]));
    assert_eq!(config.vector_store.url, "http://localhost:6333");
    assert!(config.credentials.cohere_keys.is_empty());
}

#[test]
fn test_validate_requires_credential_pools() {
    let config = RagConfig::default();
    assert!(matches!(
        config.validate(),
        Err(RagErr::EmptyCredentialPool { ref service }) if service == "gemini"
    ));

    let mut config = RagConfig::default();
    config.credentials.gemini_keys = vec!["g".to_string()];
    config.credentials.cohere_keys = vec!["  ".to_string()];
    assert!(matches!(
        config.validate(),
        Err(RagErr::EmptyCredentialPool { ref service }) if service == "cohere"
    ));

    assert!(with_keys().validate().is_ok());
}

#[test]
fn test_validate_rejects_non_positive_values() {
    let mut config = with_keys();
    config.search.rerank_top_n = 0;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, RagErr::ConfigError { ref field, .. } if field == "search.rerank_top_n"));

    let mut config = with_keys();
    config.search.default_score_threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_redacted_toml_masks_secrets() {
    let mut config = with_keys();
    config.credentials.gemini_keys = vec!["AIzaSyVerySecret".to_string()];
    config.vector_store.api_key = Some("qdrant-secret".to_string());

    let rendered = config.to_redacted_toml().unwrap();
    assert!(!rendered.contains("AIzaSyVerySecret"));
    assert!(!rendered.contains("qdrant-secret"));
    assert!(rendered.contains("****cret"));
    assert!(rendered.contains("med_vn_rag"));
}

#[test]
fn test_credentials_debug_masks_keys() {
    let config = with_keys();
    let debug = format!("{:?}", config.credentials);
    assert!(debug.contains("****"));
    assert!(!debug.contains("\"g1\""));
}
