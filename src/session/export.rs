//! Downloadable session snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::buffer::BoundedLog;
use super::settings::SessionSettings;
use super::types::{ChatMessage, ErrorLogEntry, SystemStats, TranscriptionEntry};

/// Exported session document; credentials are always blanked
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport<'a> {
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub chat_history: &'a [ChatMessage],
    pub transcription_history: &'a [TranscriptionEntry],
    pub error_logs: &'a BoundedLog<ErrorLogEntry>,
    pub settings: SessionSettings,
    pub stats: &'a SystemStats,
}

impl<'a> SessionExport<'a> {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        session_id: Uuid,
        chat_history: &'a [ChatMessage],
        transcription_history: &'a [TranscriptionEntry],
        error_logs: &'a BoundedLog<ErrorLogEntry>,
        settings: &SessionSettings,
        stats: &'a SystemStats,
    ) -> Self {
        Self {
            timestamp,
            session_id,
            chat_history,
            transcription_history,
            error_logs,
            settings: settings.without_credentials(),
            stats,
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `neural-terminal-export-YYYY-MM-DD.json`
#[must_use]
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("neural-terminal-export-{}.json", at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::session::buffer::ERROR_LOG_CAPACITY;

    #[test]
    fn export_blanks_credentials() {
        let now = Utc::now();
        let settings = SessionSettings {
            openai_api_key: "sk-live".to_string(),
            perplexity_api_key: "pplx-live".to_string(),
            ..SessionSettings::default()
        };
        let stats = SystemStats::new(now);
        let log = BoundedLog::new(ERROR_LOG_CAPACITY);
        let chat = [ChatMessage::user("hi", now)];

        let json = SessionExport::new(now, Uuid::new_v4(), &chat, &[], &log, &settings, &stats)
            .to_json()
            .unwrap();

        assert!(!json.contains("sk-live"));
        assert!(!json.contains("pplx-live"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "timestamp",
            "sessionId",
            "chatHistory",
            "transcriptionHistory",
            "errorLogs",
            "settings",
            "stats",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["chatHistory"][0]["content"], "hi");
    }

    #[test]
    fn file_name_uses_the_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(export_file_name(at), "neural-terminal-export-2024-03-09.json");
    }
}
