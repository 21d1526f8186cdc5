//! Speech-to-text (STT) processing

use super::AudioPayload;
use crate::{Error, Result};

/// Response from the Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes speech to text through a Whisper-compatible endpoint
pub struct SpeechToText {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl SpeechToText {
    /// Create a new STT instance for a Whisper-compatible API
    ///
    /// `base_url` is the API root (e.g. `https://api.openai.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        model: String,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::CredentialMissing { provider: "OpenAI" });
        }

        Ok(Self {
            client,
            endpoint: format!("{}/audio/transcriptions", base_url.trim_end_matches('/')),
            api_key,
            model,
        })
    }

    /// Transcribe audio to text
    ///
    /// The payload is forwarded unchanged, keeping its file name and MIME type.
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    pub async fn transcribe(&self, audio: &AudioPayload) -> Result<String> {
        tracing::debug!(
            audio_bytes = audio.bytes.len(),
            mime_type = %audio.mime_type,
            "starting Whisper transcription"
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.bytes.clone())
                    .file_name(audio.file_name.clone())
                    .mime_str(&audio.mime_type)
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        tracing::info!(chars = result.text.len(), "transcription complete");
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        let result = SpeechToText::new_whisper(
            reqwest::Client::new(),
            "https://api.openai.com/v1",
            "  ".to_string(),
            "whisper-1".to_string(),
        );
        assert!(matches!(result, Err(Error::CredentialMissing { .. })));
    }

    #[test]
    fn endpoint_is_derived_from_base_url() {
        let stt = SpeechToText::new_whisper(
            reqwest::Client::new(),
            "http://localhost:8080/v1/",
            "sk-test".to_string(),
            "whisper-1".to_string(),
        )
        .unwrap();
        assert_eq!(stt.endpoint, "http://localhost:8080/v1/audio/transcriptions");
    }
}
