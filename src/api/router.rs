//! Route table and middleware stack.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::api::state::AppState;
use crate::api::{chat, cors, health, request_log, transcribe};

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.server.max_body_bytes);
    let cors = cors::cors_layer(&state.server);

    Router::new()
        .route("/", get(health::health))
        .route("/chat", post(chat::chat))
        .route("/transcribe", post(transcribe::transcribe))
        .layer(body_limit)
        .layer(cors)
        .layer(middleware::from_fn(request_log::log_requests))
        .with_state(state)
}
