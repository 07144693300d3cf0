//! `POST /transcribe` handler: multipart audio upload to transcript.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::dispatch::GatewayError;

/// Multipart field names accepted for the audio upload.
const AUDIO_FIELDS: [&str; 2] = ["file", "audio"];

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

/// `POST /transcribe`: multipart audio upload in, transcript text out.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if !AUDIO_FIELDS.contains(&name.as_str()) {
            log::debug!("skipping multipart field {name:?}");
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        log::info!(
            "received audio upload {:?} ({} bytes)",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );
        upload = Some((bytes, file_name));
    }

    let (bytes, file_name) = upload.ok_or_else(|| {
        GatewayError::MalformedInput("Missing audio upload (expected multipart field 'file')".into())
    })?;

    let result = state
        .dispatcher
        .transcribe(bytes, file_name.as_deref())
        .await?;
    Ok(Json(TranscribeResponse {
        transcription: result.text,
    }))
}
