//! HTTP API for ViMedBot.
//!
//! Routes (all JSON):
//! - `POST /api/v1/chat`: full question answering
//! - `POST /api/v1/search`: retrieval only
//! - `GET /api/v1/health`, `GET /health`: liveness
//! - `GET /api/v1/stats`: vector search probe

pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use vimed_rag::RagService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RagService>,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(routes::chat))
        .route("/search", post(routes::search))
        .route("/health", get(routes::api_health))
        .route("/stats", get(routes::stats));

    Router::new()
        .nest("/api/v1", api)
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .with_state(state)
}
