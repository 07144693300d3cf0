//! `GET /` health probe.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::dispatch::EngineStatus;

pub const SERVICE_MESSAGE: &str = "AI Chatbot API";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub status: EngineStatus,
}

/// `GET /`: always 200, reporting whether the engine and vision model are up.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: SERVICE_MESSAGE,
        status: state.dispatcher.engine_status().await,
    })
}
