//! HTTP API server: the provider and transcription gateways

pub mod chat;
pub mod health;
pub mod transcribe;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiKeys, Config, ProviderEndpoints, DEFAULT_STT_MODEL};
use crate::providers::ChatCompletionClient;
use crate::Result;

/// Largest accepted audio upload (the Whisper API cap)
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for API handlers
pub struct ApiState {
    pub http: reqwest::Client,
    pub chat: ChatCompletionClient,
    pub api_keys: ApiKeys,
    pub endpoints: ProviderEndpoints,
    pub stt_model: String,
}

impl ApiState {
    /// Create state with default endpoints and no fallback credentials
    #[must_use]
    pub fn new(api_keys: ApiKeys, endpoints: ProviderEndpoints) -> Self {
        let http = reqwest::Client::new();
        Self {
            chat: ChatCompletionClient::new(http.clone()),
            http,
            api_keys,
            endpoints,
            stt_model: DEFAULT_STT_MODEL.to_string(),
        }
    }
}

/// Error payload returned by every gateway route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<serde_json::Value>,
}

pub(crate) fn error_response(
    status: StatusCode,
    code: &'static str,
    message: String,
    debug: Option<serde_json::Value>,
) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message,
            code,
            debug,
        }),
    )
        .into_response()
}

/// Build the full application router
pub fn app(state: Arc<ApiState>) -> Router {
    let router = Router::new()
        .nest("/api/chat", chat::router(state.clone()))
        .nest(
            "/api/transcribe",
            transcribe::router(state.clone()).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .merge(health::router(state));

    // CORS layer for cross-origin requests from a browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    host: String,
    port: u16,
    api_keys: ApiKeys,
    endpoints: ProviderEndpoints,
    stt_model: String,
    http: Option<reqwest::Client>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            api_keys: ApiKeys::default(),
            endpoints: ProviderEndpoints::default(),
            stt_model: DEFAULT_STT_MODEL.to_string(),
            http: None,
        }
    }

    /// Create a builder from loaded configuration
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self::new(config.server.host, config.server.port)
            .api_keys(config.api_keys)
            .endpoints(config.endpoints)
            .stt_model(config.voice.stt_model)
    }

    /// Set the fallback credentials
    #[must_use]
    pub fn api_keys(mut self, keys: ApiKeys) -> Self {
        self.api_keys = keys;
        self
    }

    /// Set the provider endpoints
    #[must_use]
    pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the STT model identifier
    #[must_use]
    pub fn stt_model(mut self, model: String) -> Self {
        self.stt_model = model;
        self
    }

    /// Use a preconfigured HTTP client for outbound calls
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let http = self.http.unwrap_or_default();

        let state = Arc::new(ApiState {
            chat: ChatCompletionClient::new(http.clone()),
            http,
            api_keys: self.api_keys,
            endpoints: self.endpoints,
            stt_model: self.stt_model,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        if self.state.api_keys.openai().is_none() {
            tracing::warn!("no OPENAI_API_KEY configured - chat requires per-session keys and transcription is unavailable");
        }
        if self.state.api_keys.perplexity().is_none() {
            tracing::debug!("no PERPLEXITY_API_KEY configured");
        }

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(host = %self.host, port = self.port, "API server listening");

        axum::serve(listener, app(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
