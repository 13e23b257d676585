use axum::{
    Router,
    routing::{get, post},
};

use super::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // API endpoints
        .route("/api/chat", post(super::handlers::chat))
        .route("/api/models", get(super::handlers::models))
        // Health check
        .route("/health", get(super::handlers::health_check))
        .with_state(state)
}
