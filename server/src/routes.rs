//! Request handlers.

use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;
use serde_json::json;
use vimed_rag::AskRequest;
use vimed_rag::SearchRequest;

use crate::AppState;
use crate::error::ApiError;
use crate::models::ChatMetadata;
use crate::models::ChatRequest;
use crate::models::ChatResponse;
use crate::models::DocumentResult;
use crate::models::HealthResponse;
use crate::models::SearchQuery;
use crate::models::ServiceStatus;
use crate::models::StatsResponse;

const SERVICE_NAME: &str = "ViMedBot API";
const SERVICE_VERSION: &str = "1.0.0";

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body?;
    req.validate().map_err(ApiError::BadRequest)?;

    let started = Instant::now();
    let conversation_id = req
        .conversation_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_conversation_id);

    let request = AskRequest::new(req.message)
        .with_top_k(req.top_k)
        .with_query_expansion(req.use_query_expansion)
        .with_rerank_top_n(req.rerank_top_n);

    let outcome = state.service.ask(&request).await.map_err(|e| {
        tracing::error!(conversation_id = %conversation_id, error = %e, "Chat request failed");
        ApiError::Internal(format!("Lỗi xử lý: {e}"))
    })?;

    let processing_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    tracing::info!(
        conversation_id = %conversation_id,
        documents = outcome.num_documents,
        used = outcome.num_reranked,
        processing_time,
        "Chat request served"
    );

    Ok(Json(ChatResponse {
        answer: outcome.answer,
        conversation_id,
        processing_time,
        metadata: ChatMetadata {
            num_documents_found: outcome.num_documents,
            num_documents_used: outcome.num_reranked,
            queries_generated: outcome.queries_used.len(),
        },
    }))
}

pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<Vec<DocumentResult>>, ApiError> {
    let Json(req) = body?;
    req.validate().map_err(ApiError::BadRequest)?;

    let request = SearchRequest::new(req.query)
        .with_top_k(req.top_k)
        .with_rerank(req.use_rerank)
        .with_rerank_top_n(req.rerank_top_n);

    let documents = state.service.search_only(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Search request failed");
        ApiError::Internal(format!("Lỗi search: {e}"))
    })?;

    Ok(Json(documents.iter().map(DocumentResult::from).collect()))
}

pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: Some(SERVICE_VERSION.to_string()),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ViMedBot".to_string(),
        version: None,
    })
}

/// Probe the vector index with a tiny unreranked search.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let probe = SearchRequest::new("test").with_top_k(1).with_rerank(false);
    match state.service.search_only(&probe).await {
        Ok(_) => Json(StatsResponse::Operational {
            vector_search: "ok".to_string(),
            services: ServiceStatus {
                qdrant: "connected".to_string(),
                gemini: "configured".to_string(),
                cohere: "configured".to_string(),
            },
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Stats probe failed");
            Json(StatsResponse::Degraded {
                error: e.to_string(),
            })
        }
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "ViMedBot API is running." }))
}

fn new_conversation_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("conv_{millis}")
}
