//! Chat completion request building and the outbound provider call

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ModelSelector;
use crate::{Error, Result};

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One `{role, content}` pair as sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

impl CompletionMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Build the provider request for a selector
///
/// History comes first in its original order and the new user message is
/// appended last. Missing or unusable sampling parameters fall back to the
/// selector's defaults.
#[must_use]
pub fn build_completion_request(
    selector: ModelSelector,
    history: &[CompletionMessage],
    message: &str,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> CompletionRequest {
    let profile = selector.profile();

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend_from_slice(history);
    messages.push(CompletionMessage::user(message));

    CompletionRequest {
        model: profile.wire_model.to_string(),
        messages,
        max_tokens: max_tokens
            .filter(|&n| n > 0)
            .unwrap_or(profile.default_max_tokens),
        temperature: temperature
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(profile.default_temperature),
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Issues single-attempt chat completion calls
#[derive(Clone, Debug)]
pub struct ChatCompletionClient {
    client: Client,
}

impl ChatCompletionClient {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Send a completion request and return the first choice's text
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` for a non-success status, `Error::EmptyCompletion`
    /// when no choice carries text, and `Error::Http` for transport or decode failures
    pub async fn complete(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String> {
        tracing::debug!(
            endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat completion request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "provider API error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            e
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(Error::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<CompletionMessage> {
        vec![
            CompletionMessage::user("first question"),
            CompletionMessage::assistant("first answer"),
        ]
    }

    #[test]
    fn new_message_is_appended_after_history() {
        for selector in ModelSelector::ALL {
            let req = build_completion_request(selector, &history(), "hello", None, None);

            assert_eq!(req.messages.len(), 3);
            assert_eq!(req.messages[0].content, "first question");
            assert_eq!(req.messages[1].role, Role::Assistant);
            assert_eq!(req.messages.last(), Some(&CompletionMessage::user("hello")));
        }
    }

    #[test]
    fn omitted_parameters_use_selector_defaults() {
        for selector in ModelSelector::ALL {
            let profile = selector.profile();
            let req = build_completion_request(selector, &[], "hi", None, None);

            assert_eq!(req.model, profile.wire_model);
            assert_eq!(req.max_tokens, profile.default_max_tokens);
            assert!((req.temperature - profile.default_temperature).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn explicit_parameters_are_forwarded() {
        let req = build_completion_request(
            ModelSelector::SearchAugmented,
            &[],
            "hi",
            Some(0.0),
            Some(3000),
        );
        assert_eq!(req.max_tokens, 3000);
        assert!(req.temperature.abs() < f32::EPSILON);
    }

    #[test]
    fn unusable_parameters_fall_back() {
        let req = build_completion_request(
            ModelSelector::GeneralPurpose,
            &[],
            "hi",
            Some(f32::NAN),
            Some(0),
        );
        assert_eq!(req.max_tokens, 1000);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn request_serializes_in_openai_shape() {
        let req = build_completion_request(ModelSelector::AdvancedPurpose, &[], "hi", None, None);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 1000);
    }
}
