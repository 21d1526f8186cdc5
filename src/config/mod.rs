//! Configuration management for the neural terminal

pub mod file;

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use self::file::ConfigFile;
use crate::Result;

/// Default OpenAI-compatible API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Perplexity API base URL
pub const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

/// Default speech-to-text model
pub const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Default gateway port
pub const DEFAULT_PORT: u16 = 3000;

/// Neural terminal configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Process-wide fallback credentials
    pub api_keys: ApiKeys,

    /// Provider endpoints
    pub endpoints: ProviderEndpoints,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Interactive terminal configuration
    pub terminal: TerminalConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Fallback API keys used when a request carries no per-session override
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat completions and Whisper)
    pub openai: Option<SecretString>,

    /// `Perplexity` API key (search-augmented chat)
    pub perplexity: Option<SecretString>,
}

impl ApiKeys {
    /// Borrow the `OpenAI` key, if configured
    #[must_use]
    pub fn openai(&self) -> Option<&str> {
        self.openai.as_ref().map(|k| k.expose_secret())
    }

    /// Borrow the `Perplexity` key, if configured
    #[must_use]
    pub fn perplexity(&self) -> Option<&str> {
        self.perplexity.as_ref().map(|k| k.expose_secret())
    }
}

/// Base URLs of the upstream providers
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub perplexity_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: OPENAI_BASE_URL.to_string(),
            perplexity_base_url: PERPLEXITY_BASE_URL.to_string(),
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model sent to the transcription provider
    pub stt_model: String,
}

/// Interactive terminal configuration
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Base URL of the gateway server the terminal talks to
    pub gateway_url: String,

    /// Directory holding the persisted settings store
    pub data_dir: PathBuf,

    /// Directory session exports are written to
    pub export_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment and the TOML config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(|key| std::env::var(key).ok(), fc)
    }

    /// Build configuration from an environment lookup and a parsed config file
    ///
    /// Precedence is env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if a port value cannot be parsed
    pub fn from_sources(env: impl Fn(&str) -> Option<String>, fc: ConfigFile) -> Result<Self> {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("NEURAL_TERMINAL_PORT").or_else(|| non_empty("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| crate::Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let server = ServerConfig {
            host: non_empty("NEURAL_TERMINAL_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        };

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: non_empty("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .map(SecretString::from),
            perplexity: non_empty("PERPLEXITY_API_KEY")
                .or(fc.api_keys.perplexity)
                .map(SecretString::from),
        };

        let endpoints = ProviderEndpoints {
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .or(fc.providers.openai_base_url)
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            perplexity_base_url: non_empty("PERPLEXITY_BASE_URL")
                .or(fc.providers.perplexity_base_url)
                .unwrap_or_else(|| PERPLEXITY_BASE_URL.to_string()),
        };

        let voice = VoiceConfig {
            stt_model: non_empty("NEURAL_TERMINAL_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
        };

        let terminal = TerminalConfig {
            gateway_url: non_empty("NEURAL_TERMINAL_GATEWAY_URL")
                .or(fc.terminal.gateway_url)
                .unwrap_or_else(|| format!("http://127.0.0.1:{port}")),
            data_dir: non_empty("NEURAL_TERMINAL_DATA_DIR")
                .or(fc.terminal.data_dir)
                .map_or_else(default_data_dir, PathBuf::from),
            export_dir: non_empty("NEURAL_TERMINAL_EXPORT_DIR")
                .or(fc.terminal.export_dir)
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
        };

        Ok(Self {
            server,
            api_keys,
            endpoints,
            voice,
            terminal,
        })
    }
}

/// Default data directory: `~/.local/share/neural-terminal` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/neural-terminal"),
        |d| d.data_dir().join("neural-terminal"),
    )
}
