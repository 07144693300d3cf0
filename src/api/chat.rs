//! `POST /chat` handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::dispatch::{ChatRequest, ChatResult};

/// `POST /chat`: text chat, or image description when an image is attached.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.dispatcher.handle(request).await?;
    Ok(Json(result))
}
