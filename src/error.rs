//! Error types for the neural terminal

use thiserror::Error;

/// Result type alias for neural terminal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateways and the session controller
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No credential available for the selected provider
    #[error("{provider} API key required")]
    CredentialMissing { provider: &'static str },

    /// Model selector outside the supported set
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Provider answered with a non-success status
    #[error("provider API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Provider answered successfully but without a completion
    #[error("provider returned no completion")]
    EmptyCompletion,

    /// Audio file or recording with no content
    #[error("no audio file provided")]
    NoAudio,

    /// Audio encoding or capture error
    #[error("audio error: {0}")]
    Audio(String),

    /// Microphone could not be opened
    #[error("microphone unavailable: {0}")]
    Microphone(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Clipboard write failed
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Key-value settings store error
    #[error("storage error: {0}")]
    Storage(String),

    /// Session export failed
    #[error("export error: {0}")]
    Export(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
