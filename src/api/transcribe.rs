//! Transcription gateway: multipart audio forwarded to the STT provider

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use super::{ApiState, error_response};
use crate::voice::{AudioPayload, SpeechToText};

/// Multipart field carrying the recording
pub const AUDIO_FIELD: &str = "audio";

/// Build transcription router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/", post(transcribe)).with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Transcribe uploaded audio to text
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, TranscribeError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "request is not multipart");
        TranscribeError::NoAudio
    })?;

    let audio = read_audio_field(&mut multipart)
        .await?
        .filter(|a| !a.is_empty())
        .ok_or(TranscribeError::NoAudio)?;

    let api_key = state
        .api_keys
        .openai()
        .ok_or(TranscribeError::CredentialMissing)?
        .to_string();

    tracing::info!(
        audio_bytes = audio.len(),
        mime_type = %audio.mime_type,
        "forwarding transcription request"
    );

    let stt = SpeechToText::new_whisper(
        state.http.clone(),
        &state.endpoints.openai_base_url,
        api_key,
        state.stt_model.clone(),
    )
    .map_err(|_| TranscribeError::CredentialMissing)?;

    let text = stt.transcribe(&audio).await.map_err(|e| {
        tracing::error!(error = %e, "transcription error");
        TranscribeError::Failed
    })?;

    Ok(Json(TranscribeResponse { text }))
}

async fn read_audio_field(
    multipart: &mut Multipart,
) -> Result<Option<AudioPayload>, TranscribeError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "malformed multipart body");
        TranscribeError::Rejected(e)
    })? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("recording.webm").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to read audio field");
            TranscribeError::Rejected(e)
        })?;

        return Ok(Some(AudioPayload::new(bytes.to_vec(), mime_type, file_name)));
    }

    Ok(None)
}

/// Transcription gateway errors
#[derive(Debug)]
pub enum TranscribeError {
    NoAudio,
    /// Body could not be read, e.g. it exceeds the upload limit
    Rejected(MultipartError),
    CredentialMissing,
    Failed,
}

impl IntoResponse for TranscribeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Rejected(e) => {
                return error_response(e.status(), "invalid_upload", e.body_text(), None);
            }
            Self::NoAudio => (StatusCode::BAD_REQUEST, "no_audio", "No audio file provided"),
            Self::CredentialMissing => (
                StatusCode::BAD_REQUEST,
                "credential_missing",
                "OpenAI API key required for transcription",
            ),
            Self::Failed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transcription_failed",
                "Transcription failed",
            ),
        };

        error_response(status, code, message.to_string(), None)
    }
}
