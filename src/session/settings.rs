//! User-editable session settings and their persisted form

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::providers::{ModelSelector, Provider};
use crate::Result;

/// Storage key the settings blob is persisted under
pub const SETTINGS_KEY: &str = "neural-terminal-settings";

/// Default number of most-recent chat messages sent as context
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Settings edited in the configuration panel
///
/// Unknown keys in a stored blob are ignored and missing keys keep their defaults.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    pub openai_api_key: String,
    pub perplexity_api_key: String,
    /// `None` uses the selected provider's default
    pub temperature: Option<f32>,
    /// `None` uses the selected provider's default
    pub max_tokens: Option<u32>,
    pub history_window: usize,
    pub conversation_memory: bool,
    pub smart_context: bool,
    pub voice_auto_send: bool,
    pub show_timestamps: bool,
    pub sound_effects: bool,
    pub debug_mode: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            perplexity_api_key: String::new(),
            temperature: None,
            max_tokens: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            conversation_memory: true,
            smart_context: true,
            voice_auto_send: true,
            show_timestamps: true,
            sound_effects: true,
            debug_mode: false,
        }
    }
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &str| if k.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("SessionSettings")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("history_window", &self.history_window)
            .field("conversation_memory", &self.conversation_memory)
            .field("smart_context", &self.smart_context)
            .field("voice_auto_send", &self.voice_auto_send)
            .field("show_timestamps", &self.show_timestamps)
            .field("sound_effects", &self.sound_effects)
            .field("debug_mode", &self.debug_mode)
            .finish()
    }
}

impl SessionSettings {
    /// Copy with both credentials blanked
    #[must_use]
    pub fn without_credentials(&self) -> Self {
        Self {
            openai_api_key: String::new(),
            perplexity_api_key: String::new(),
            ..self.clone()
        }
    }

    /// Copy carrying only the credential of the selector's provider
    #[must_use]
    pub fn for_selector(&self, selector: ModelSelector) -> Self {
        let mut narrowed = self.without_credentials();
        match selector.profile().provider {
            Provider::OpenAi => narrowed.openai_api_key.clone_from(&self.openai_api_key),
            Provider::Perplexity => {
                narrowed.perplexity_api_key.clone_from(&self.perplexity_api_key);
            }
        }
        narrowed
    }

    /// Whether a per-session key is set for the provider
    #[must_use]
    pub fn has_key(&self, provider: Provider) -> bool {
        let key = match provider {
            Provider::OpenAi => &self.openai_api_key,
            Provider::Perplexity => &self.perplexity_api_key,
        };
        !key.trim().is_empty()
    }

    /// Temperature that will actually be used for a selector
    #[must_use]
    pub fn effective_temperature(&self, selector: ModelSelector) -> f32 {
        self.temperature
            .unwrap_or_else(|| selector.profile().default_temperature)
    }

    /// Max output tokens that will actually be used for a selector
    #[must_use]
    pub fn effective_max_tokens(&self, selector: ModelSelector) -> u32 {
        self.max_tokens
            .unwrap_or_else(|| selector.profile().default_max_tokens)
    }

    /// Set one field from its camelCase or snake_case name and a textual value
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unknown key or unparsable value
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let bad_value = || crate::Error::Config(format!("invalid value for {key}: {value}"));
        let parse_bool = |v: &str| match v.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(bad_value()),
        };
        let default_marker = |v: &str| v.trim().eq_ignore_ascii_case("default");

        match key.trim().replace('_', "").to_ascii_lowercase().as_str() {
            "openaiapikey" => self.openai_api_key = value.trim().to_string(),
            "perplexityapikey" => self.perplexity_api_key = value.trim().to_string(),
            "temperature" if default_marker(value) => self.temperature = None,
            "temperature" => {
                let t: f32 = value.trim().parse().map_err(|_| bad_value())?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(bad_value());
                }
                self.temperature = Some(t);
            }
            "maxtokens" if default_marker(value) => self.max_tokens = None,
            "maxtokens" => {
                let n: u32 = value.trim().parse().map_err(|_| bad_value())?;
                if n == 0 {
                    return Err(bad_value());
                }
                self.max_tokens = Some(n);
            }
            "historywindow" => {
                self.history_window = value.trim().parse().map_err(|_| bad_value())?;
            }
            "conversationmemory" => self.conversation_memory = parse_bool(value)?,
            "smartcontext" => self.smart_context = parse_bool(value)?,
            "voiceautosend" => self.voice_auto_send = parse_bool(value)?,
            "showtimestamps" => self.show_timestamps = parse_bool(value)?,
            "soundeffects" => self.sound_effects = parse_bool(value)?,
            "debugmode" => self.debug_mode = parse_bool(value)?,
            _ => return Err(crate::Error::Config(format!("unknown setting: {key}"))),
        }
        Ok(())
    }
}

/// Serialize settings for the key-value store
///
/// # Errors
///
/// Returns error if serialization fails
pub fn serialize_settings(settings: &SessionSettings) -> Result<String> {
    Ok(serde_json::to_string(settings)?)
}

/// Deserialize a stored settings blob
///
/// # Errors
///
/// Returns error if the blob is not a JSON object of settings
pub fn deserialize_settings(raw: &str) -> Result<SessionSettings> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_blob_round_trips_with_camel_case_keys() {
        let mut settings = SessionSettings::default();
        settings.openai_api_key = "sk-abc".to_string();
        settings.temperature = Some(0.9);
        settings.debug_mode = true;

        let raw = serialize_settings(&settings).unwrap();
        assert!(raw.contains("\"openaiApiKey\":\"sk-abc\""));
        assert!(raw.contains("\"debugMode\":true"));

        assert_eq!(deserialize_settings(&raw).unwrap(), settings);
    }

    #[test]
    fn partial_blob_keeps_defaults() {
        let loaded = deserialize_settings(r#"{"voiceAutoSend": false, "darkMode": true}"#).unwrap();

        assert!(!loaded.voice_auto_send);
        assert!(loaded.conversation_memory);
        assert_eq!(loaded.history_window, DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn garbage_blob_is_an_error() {
        assert!(deserialize_settings("not json").is_err());
    }

    #[test]
    fn selector_narrowing_keeps_only_matching_key() {
        let settings = SessionSettings {
            openai_api_key: "sk-1".to_string(),
            perplexity_api_key: "pplx-1".to_string(),
            ..SessionSettings::default()
        };

        let openai = settings.for_selector(ModelSelector::AdvancedPurpose);
        assert_eq!(openai.openai_api_key, "sk-1");
        assert!(openai.perplexity_api_key.is_empty());

        let search = settings.for_selector(ModelSelector::SearchAugmented);
        assert!(search.openai_api_key.is_empty());
        assert_eq!(search.perplexity_api_key, "pplx-1");
    }

    #[test]
    fn effective_parameters_fall_back_to_provider_defaults() {
        let mut settings = SessionSettings::default();
        assert_eq!(settings.effective_max_tokens(ModelSelector::SearchAugmented), 2000);
        assert!((settings.effective_temperature(ModelSelector::GeneralPurpose) - 0.7).abs() < f32::EPSILON);

        settings.max_tokens = Some(3000);
        assert_eq!(settings.effective_max_tokens(ModelSelector::SearchAugmented), 3000);
    }

    #[test]
    fn set_field_parses_by_name() {
        let mut settings = SessionSettings::default();

        settings.set_field("conversationMemory", "off").unwrap();
        settings.set_field("max_tokens", "1500").unwrap();
        settings.set_field("temperature", "0.3").unwrap();
        assert!(!settings.conversation_memory);
        assert_eq!(settings.max_tokens, Some(1500));

        settings.set_field("temperature", "default").unwrap();
        assert!(settings.temperature.is_none());

        assert!(settings.set_field("temperature", "7").is_err());
        assert!(settings.set_field("darkMode", "on").is_err());
        assert!(settings.set_field("debugMode", "maybe").is_err());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let settings = SessionSettings {
            openai_api_key: "sk-secret".to_string(),
            ..SessionSettings::default()
        };
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }
}
