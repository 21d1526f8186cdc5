//! Health check endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: ProviderAvailability,
}

/// Which providers have a fallback credential configured
#[derive(Serialize)]
pub struct ProviderAvailability {
    pub openai: bool,
    pub perplexity: bool,
}

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        providers: ProviderAvailability {
            openai: state.api_keys.openai().is_some(),
            perplexity: state.api_keys.perplexity().is_some(),
        },
    })
}
