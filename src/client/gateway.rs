//! Client side of the two gateway routes

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::transcribe::AUDIO_FIELD;
use crate::providers::CompletionMessage;
use crate::session::SessionSettings;
use crate::voice::AudioPayload;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatExchangeRequest {
    pub message: String,
    /// Wire identifier of the selected model
    pub model: String,
    pub history: Vec<CompletionMessage>,
    pub settings: SessionSettings,
}

/// Successful chat reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayReply {
    pub reply: String,
    #[serde(default)]
    pub debug: Option<serde_json::Value>,
}

/// Successful transcription
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Gateway failures as seen by the session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    CredentialMissing(String),

    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        debug: Option<serde_json::Value>,
    },

    #[error("network failure: {0}")]
    Network(String),
}

impl GatewayError {
    /// HTTP status to show the user, if the gateway answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::CredentialMissing(_) => Some(400),
            Self::Upstream { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }
}

/// The Provider and Transcription gateways
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn chat(&self, request: ChatExchangeRequest) -> Result<GatewayReply, GatewayError>;

    async fn transcribe(&self, audio: AudioPayload) -> Result<Transcription, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    debug: Option<serde_json::Value>,
}

/// Gateway reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayError::Network(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorPayload>(&body) {
            Ok(payload) if payload.code.as_deref() == Some("credential_missing") => {
                Err(GatewayError::CredentialMissing(payload.error))
            }
            Ok(payload) => Err(GatewayError::Upstream {
                status: status.as_u16(),
                message: payload.error,
                debug: payload.debug,
            }),
            Err(_) => Err(GatewayError::Upstream {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
                debug: None,
            }),
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn chat(&self, request: ChatExchangeRequest) -> Result<GatewayReply, GatewayError> {
        tracing::debug!(model = %request.model, history = request.history.len(), "POST /api/chat");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn transcribe(&self, audio: AudioPayload) -> Result<Transcription, GatewayError> {
        tracing::debug!(bytes = audio.len(), mime_type = %audio.mime_type, "POST /api/transcribe");

        let part = Part::bytes(audio.bytes)
            .file_name(audio.file_name)
            .mime_str(&audio.mime_type)
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let form = Form::new().part(AUDIO_FIELD, part);

        let response = self
            .client
            .post(format!("{}/api/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request() -> ChatExchangeRequest {
        ChatExchangeRequest {
            message: "hi".to_string(),
            model: "gpt-4".to_string(),
            history: Vec::new(),
            settings: SessionSettings::default(),
        }
    }

    #[tokio::test]
    async fn credential_code_maps_to_credential_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "OpenAI API key required",
                "code": "credential_missing",
            })))
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(reqwest::Client::new(), &server.uri());
        let err = gateway.chat(request()).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::CredentialMissing("OpenAI API key required".to_string())
        );
    }

    #[tokio::test]
    async fn upstream_status_and_debug_are_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": "OpenAI API error 429: slow down",
                "code": "upstream_error",
                "debug": {"status": 429},
            })))
            .mount(&server)
            .await;

        let gateway = HttpGateway::new(reqwest::Client::new(), &format!("{}/", server.uri()));
        match gateway.chat(request()).await.unwrap_err() {
            GatewayError::Upstream {
                status,
                message,
                debug,
            } => {
                assert_eq!(status, 429);
                assert!(message.contains("slow down"));
                assert_eq!(debug, Some(serde_json::json!({"status": 429})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_network_failure() {
        let gateway = HttpGateway::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let err = gateway.chat(request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
        assert_eq!(err.status(), None);
    }
}
