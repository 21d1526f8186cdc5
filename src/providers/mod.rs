//! Upstream chat providers
//!
//! A closed set of model selectors, each carrying the provider it routes to,
//! the wire model name, and the default sampling parameters for that provider.

pub mod chat;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ApiKeys, ProviderEndpoints};
use crate::{Error, Result};

pub use chat::{
    ChatCompletionClient, CompletionMessage, CompletionRequest, Role, build_completion_request,
};

/// Upstream provider behind a model selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Perplexity,
}

impl Provider {
    /// Human-readable provider name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Perplexity => "Perplexity",
        }
    }

    /// Chat completions endpoint for this provider
    #[must_use]
    pub fn chat_endpoint(self, endpoints: &ProviderEndpoints) -> String {
        let base = match self {
            Self::OpenAi => &endpoints.openai_base_url,
            Self::Perplexity => &endpoints.perplexity_base_url,
        };
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

/// Static routing data for one selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub wire_model: &'static str,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

/// Logical model choice made by the terminal user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ModelSelector {
    /// General-purpose chat model
    #[default]
    GeneralPurpose,
    /// Higher-capability chat model
    AdvancedPurpose,
    /// Search-augmented online model
    SearchAugmented,
}

impl ModelSelector {
    /// All selectors, in menu order
    pub const ALL: [Self; 3] = [
        Self::GeneralPurpose,
        Self::AdvancedPurpose,
        Self::SearchAugmented,
    ];

    /// Routing data for this selector
    #[must_use]
    pub const fn profile(self) -> ProviderProfile {
        match self {
            Self::GeneralPurpose => ProviderProfile {
                provider: Provider::OpenAi,
                wire_model: "gpt-3.5-turbo",
                default_temperature: 0.7,
                default_max_tokens: 1000,
            },
            Self::AdvancedPurpose => ProviderProfile {
                provider: Provider::OpenAi,
                wire_model: "gpt-4",
                default_temperature: 0.7,
                default_max_tokens: 1000,
            },
            Self::SearchAugmented => ProviderProfile {
                provider: Provider::Perplexity,
                wire_model: "llama-3.1-sonar-small-128k-online",
                default_temperature: 0.2,
                default_max_tokens: 2000,
            },
        }
    }

    /// Identifier sent by the terminal to the gateway
    #[must_use]
    pub const fn wire_id(self) -> &'static str {
        match self {
            Self::GeneralPurpose => "gpt-3.5-turbo",
            Self::AdvancedPurpose => "gpt-4",
            Self::SearchAugmented => "perplexity",
        }
    }

    /// Name shown in the transcript
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::GeneralPurpose => "ChatGPT",
            Self::AdvancedPurpose => "GPT-4",
            Self::SearchAugmented => "Perplexity",
        }
    }

    /// Parse the gateway's `model` field; an absent or blank value selects the default
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownModel` for values outside the supported set
    pub fn from_request(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for ModelSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sel| {
                sel.wire_id() == needle || sel.display_name().to_ascii_lowercase() == needle
            })
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<ModelSelector> for String {
    fn from(sel: ModelSelector) -> Self {
        sel.wire_id().to_string()
    }
}

impl TryFrom<String> for ModelSelector {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Resolve the credential for a provider
///
/// A non-blank per-session key wins over the process-wide fallback.
///
/// # Errors
///
/// Returns `Error::CredentialMissing` when neither is available
pub fn resolve_api_key(
    provider: Provider,
    session_key: Option<&str>,
    fallback: &ApiKeys,
) -> Result<String> {
    let fallback_key = match provider {
        Provider::OpenAi => fallback.openai(),
        Provider::Perplexity => fallback.perplexity(),
    };

    session_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| fallback_key.map(str::trim).filter(|k| !k.is_empty()))
        .map(ToString::to_string)
        .ok_or(Error::CredentialMissing {
            provider: provider.name(),
        })
}
