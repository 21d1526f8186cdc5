//! TOML configuration file loading
//!
//! Supports `~/.config/neural-terminal/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Fallback API keys for the providers
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Provider endpoint overrides
    #[serde(default)]
    pub providers: ProvidersFileConfig,

    /// Voice/transcription configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Interactive terminal configuration
    #[serde(default)]
    pub terminal: TerminalFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Interface to bind
    pub host: Option<String>,

    /// API server port
    pub port: Option<u16>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub perplexity: Option<String>,
}

/// Provider base URLs (for proxies and self-hosted compatible endpoints)
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersFileConfig {
    pub openai_base_url: Option<String>,
    pub perplexity_base_url: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,
}

/// Terminal client configuration
#[derive(Debug, Default, Deserialize)]
pub struct TerminalFileConfig {
    /// Base URL of the gateway server
    pub gateway_url: Option<String>,

    /// Directory holding the persisted settings store
    pub data_dir: Option<String>,

    /// Directory session exports are written to
    pub export_dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed
pub fn parse_config_file(content: &str) -> crate::Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `~/.config/neural-terminal/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("neural-terminal").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_leaves_other_sections_default() {
        let fc = parse_config_file(
            r#"
            [server]
            port = 8080

            [api_keys]
            perplexity = "pplx-file"
            "#,
        )
        .unwrap();

        assert_eq!(fc.server.port, Some(8080));
        assert!(fc.server.host.is_none());
        assert_eq!(fc.api_keys.perplexity.as_deref(), Some("pplx-file"));
        assert!(fc.api_keys.openai.is_none());
        assert!(fc.voice.stt_model.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_config_file("[server\nport = ").is_err());
    }
}
