//! Provider families and name-prefix detection.
//!
//! Kept as one explicit table so new providers extend a single place
//! instead of conditionals scattered across components.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// The provider family owning a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI (gpt-*, o1*, o3* models).
    OpenAi,
    /// Google (gemini-* models).
    Google,
    /// Anthropic (claude-* models).
    Anthropic,
    /// `OpenRouter` aggregator (vendor/model names).
    OpenRouter,
    /// A custom OpenAI-compatible endpoint (local llama, mixtral, ...).
    Custom,
}

impl Provider {
    /// Detects the provider family from a model name, or `None` when
    /// the name matches no known prefix. Unknown names carry no
    /// provider-specific restriction.
    pub fn detect(model_name: &str) -> Option<Self> {
        let name = model_name.trim().to_lowercase();

        if name.starts_with("gemini") {
            return Some(Self::Google);
        }
        if name.starts_with("gpt") || name.starts_with("o1") || name.starts_with("o3") {
            return Some(Self::OpenAi);
        }
        if name.starts_with("claude") {
            return Some(Self::Anthropic);
        }
        if name.contains('/') {
            return Some(Self::OpenRouter);
        }
        if name.starts_with("llama") || name.starts_with("mixtral") {
            return Some(Self::Custom);
        }

        None
    }

    /// Key used for API key lookup in [`arbiter_core::GatewayConfig`].
    pub const fn key_name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Anthropic => "anthropic",
            Self::OpenRouter => "openrouter",
            Self::Custom => "custom",
        }
    }

    /// Environment variable holding this family's model allow-list, if
    /// the family supports one.
    pub const fn allow_list_var(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_ALLOWED_MODELS"),
            Self::Google => Some("GOOGLE_ALLOWED_MODELS"),
            Self::Anthropic => Some("ANTHROPIC_ALLOWED_MODELS"),
            Self::OpenRouter | Self::Custom => None,
        }
    }
}

impl Display for Provider {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::OpenAi => "OpenAI",
            Self::Google => "Google",
            Self::Anthropic => "Anthropic",
            Self::OpenRouter => "OpenRouter",
            Self::Custom => "Custom",
        };
        formatter.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefixes() {
        assert_eq!(Provider::detect("gemini-2.5-pro"), Some(Provider::Google));
        assert_eq!(Provider::detect("gpt-4o-mini"), Some(Provider::OpenAi));
        assert_eq!(Provider::detect("o1"), Some(Provider::OpenAi));
        assert_eq!(Provider::detect("o3-mini"), Some(Provider::OpenAi));
        assert_eq!(
            Provider::detect("claude-sonnet-4"),
            Some(Provider::Anthropic)
        );
        assert_eq!(
            Provider::detect("deepseek/deepseek-chat"),
            Some(Provider::OpenRouter)
        );
        assert_eq!(Provider::detect("llama-3.1-8b"), Some(Provider::Custom));
    }

    #[test]
    fn test_unknown_prefix_has_no_family() {
        assert_eq!(Provider::detect("grok-3"), None);
        assert_eq!(Provider::detect(""), None);
    }

    #[test]
    fn test_detection_ignores_case_and_whitespace() {
        assert_eq!(Provider::detect("  GEMINI-2.5-FLASH "), Some(Provider::Google));
    }
}
