//! Session records: chat turns, transcriptions, diagnostics, and statistics

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::providers::Role;
use crate::providers::CompletionMessage;

/// Weight of the newest sample in the running latency average
pub const LATENCY_SMOOTHING: f64 = 0.5;

/// Characters-per-token heuristic: `ceil(chars / 4)`
#[must_use]
pub const fn estimate_tokens(chars: usize) -> u64 {
    chars.div_ceil(4) as u64
}

/// One turn of the conversation; immutable once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

impl ChatMessage {
    /// User turn with its token estimate
    #[must_use]
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let content = content.into();
        let tokens = estimate_tokens(content.chars().count());
        Self {
            role: Role::User,
            content,
            timestamp,
            model: None,
            tokens: Some(tokens),
        }
    }

    /// Assistant turn attributed to a model
    #[must_use]
    pub fn assistant(
        content: impl Into<String>,
        model: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        let tokens = estimate_tokens(content.chars().count());
        Self {
            role: Role::Assistant,
            content,
            timestamp,
            model: Some(model.into()),
            tokens: Some(tokens),
        }
    }

    /// The `{role, content}` pair sent upstream
    #[must_use]
    pub fn to_completion(&self) -> CompletionMessage {
        CompletionMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A recognized utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        })
    }
}

/// One diagnostic record in the session error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Running usage counters for the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_exchanges: u64,
    pub total_tokens: u64,
    /// Exponentially weighted average response latency in milliseconds
    pub avg_response_ms: f64,
    pub session_start: DateTime<Utc>,
    pub errors: u64,
}

impl SystemStats {
    #[must_use]
    pub const fn new(session_start: DateTime<Utc>) -> Self {
        Self {
            total_exchanges: 0,
            total_tokens: 0,
            avg_response_ms: 0.0,
            session_start,
            errors: 0,
        }
    }

    /// Fold one completed exchange into the counters
    #[allow(clippy::cast_precision_loss)]
    pub fn record_exchange(&mut self, tokens: u64, latency: Duration) {
        let sample = latency.as_millis() as f64;
        self.avg_response_ms = if self.total_exchanges == 0 {
            sample
        } else {
            LATENCY_SMOOTHING.mul_add(sample - self.avg_response_ms, self.avg_response_ms)
        };
        self.total_exchanges += 1;
        self.total_tokens += tokens;
    }

    pub const fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Time since the session started (zero if the clock went backwards)
    #[must_use]
    pub fn uptime(&self, now: DateTime<Utc>) -> Duration {
        (now - self.session_start).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(1), 1);
        assert_eq!(estimate_tokens(4), 1);
        assert_eq!(estimate_tokens(5), 2);
        assert_eq!(estimate_tokens(13), 4);
    }

    #[test]
    fn message_token_estimates_count_chars_not_bytes() {
        let msg = ChatMessage::user("héllo", Utc::now());
        assert_eq!(msg.tokens, Some(2));
        let reply = ChatMessage::assistant("abcd", "ChatGPT", Utc::now());
        assert_eq!(reply.tokens, Some(1));
        assert_eq!(reply.model.as_deref(), Some("ChatGPT"));
    }

    #[test]
    fn latency_average_is_exponentially_weighted() {
        let mut stats = SystemStats::new(Utc::now());

        stats.record_exchange(10, Duration::from_millis(400));
        assert!((stats.avg_response_ms - 400.0).abs() < f64::EPSILON);

        stats.record_exchange(5, Duration::from_millis(200));
        assert!((stats.avg_response_ms - 300.0).abs() < f64::EPSILON);

        stats.record_exchange(5, Duration::from_millis(100));
        assert!((stats.avg_response_ms - 200.0).abs() < f64::EPSILON);

        assert_eq!(stats.total_exchanges, 3);
        assert_eq!(stats.total_tokens, 20);
    }

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Warn).unwrap(), "\"WARN\"");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }
}
