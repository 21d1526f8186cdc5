//! Provider gateway: normalized chat requests forwarded to the selected provider

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::{ApiState, error_response};
use crate::Error;
use crate::providers::{
    CompletionMessage, ModelSelector, Provider, build_completion_request, resolve_api_key,
};

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/", post(chat)).with_state(state)
}

/// Chat request as sent by the terminal
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub history: Vec<CompletionMessage>,
    #[serde(default)]
    pub settings: RequestSettings,
}

/// The subset of session settings the gateway reads
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSettings {
    pub openai_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl RequestSettings {
    fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Perplexity => self.perplexity_api_key.as_deref(),
        }
    }
}

/// Successful chat response
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Forward one chat exchange to the provider
async fn chat(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    let Json(request) = payload.map_err(|e| ChatError::BadRequest(e.body_text()))?;

    if request.message.trim().is_empty() {
        return Err(ChatError::BadRequest("Message required".to_string()));
    }

    let selector = ModelSelector::from_request(request.model.as_deref())
        .map_err(|e| ChatError::BadRequest(e.to_string()))?;
    let provider = selector.profile().provider;

    let api_key = resolve_api_key(provider, request.settings.key_for(provider), &state.api_keys)
        .map_err(|e| ChatError::CredentialMissing(e.to_string()))?;

    let completion = build_completion_request(
        selector,
        &request.history,
        &request.message,
        request.settings.temperature,
        request.settings.max_tokens,
    );
    let endpoint = provider.chat_endpoint(&state.endpoints);

    tracing::info!(
        model = %selector,
        history = request.history.len(),
        chars = request.message.len(),
        "forwarding chat request"
    );

    let reply = state
        .chat
        .complete(&endpoint, &api_key, &completion)
        .await
        .map_err(|e| match e {
            Error::Upstream { status, body } => ChatError::Upstream {
                provider,
                status,
                body,
            },
            other => {
                tracing::error!(error = %other, "chat API error");
                ChatError::Failed
            }
        })?;

    Ok(Json(ChatReply { reply }))
}

/// Chat gateway errors
#[derive(Debug)]
pub enum ChatError {
    BadRequest(String),
    CredentialMissing(String),
    Upstream {
        provider: Provider,
        status: u16,
        body: String,
    },
    Failed,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                error_response(StatusCode::BAD_REQUEST, "bad_request", msg, None)
            }
            Self::CredentialMissing(msg) => {
                error_response(StatusCode::BAD_REQUEST, "credential_missing", msg, None)
            }
            Self::Upstream {
                provider,
                status,
                body,
            } => {
                // Mirror the provider's status when it is an error status
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                let debug = serde_json::json!({
                    "provider": provider.name(),
                    "status": status,
                });
                error_response(
                    code,
                    "upstream_error",
                    format!("{} API error {status}: {body}", provider.name()),
                    Some(debug),
                )
            }
            Self::Failed => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Failed to get response".to_string(),
                None,
            ),
        }
    }
}
