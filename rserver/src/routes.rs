use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers;

/// Create the relay router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/bots", get(handlers::list_bots))
        .route("/api/chat/{bot_id}", post(handlers::chat))
        .route("/api/chat/{bot_id}/reset", post(handlers::reset))
        .route("/api/sessions/{session_id}", delete(handlers::end_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
