//! Maps model names to the provider client able to serve them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use arbiter_core::{CompletionProvider, Error, GatewayConfig, Result};
use arbiter_routing::Provider;

use crate::anthropic::AnthropicProvider;
use crate::openai::{
    GEMINI_BASE_URL, OPENAI_BASE_URL, OPENROUTER_BASE_URL, OpenAiCompatProvider,
};

/// The set of configured provider clients, keyed by family.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn CompletionProvider>>,
}

impl ProviderRegistry {
    /// An empty registry; families are added explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from whichever API keys the configuration (or
    /// environment) provides. Families without a key are simply absent;
    /// requesting their models fails at lookup with an actionable
    /// error.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut registry = Self::new();

        let families: [(Provider, &str, &str); 4] = [
            (Provider::OpenAi, "openai", OPENAI_BASE_URL),
            (Provider::Google, "gemini", GEMINI_BASE_URL),
            (Provider::OpenRouter, "openrouter", OPENROUTER_BASE_URL),
            (Provider::Anthropic, "anthropic", ""),
        ];
        for (family, display_name, base_url) in families {
            let Some(api_key) = config.get_api_key(family.key_name()) else {
                continue;
            };
            let built: Result<Arc<dyn CompletionProvider>> = if family == Provider::Anthropic {
                AnthropicProvider::new(api_key)
                    .map(|provider| Arc::new(provider) as Arc<dyn CompletionProvider>)
            } else {
                OpenAiCompatProvider::new(display_name, base_url, api_key)
                    .map(|provider| Arc::new(provider) as Arc<dyn CompletionProvider>)
            };
            match built {
                Ok(provider) => registry.register(family, provider),
                Err(error) => warn!("Skipping {family}: {error}"),
            }
        }

        if let Some(base_url) = config.custom_api_url() {
            let api_key = config
                .get_api_key(Provider::Custom.key_name())
                .unwrap_or_else(|| "unused".to_owned());
            match OpenAiCompatProvider::new("custom", &base_url, api_key) {
                Ok(provider) => registry.register(Provider::Custom, Arc::new(provider)),
                Err(error) => warn!("Skipping custom endpoint: {error}"),
            }
        }

        debug!("Configured provider families: {:?}", registry.families());
        registry
    }

    /// Registers (or replaces) the client for a family.
    pub fn register(&mut self, family: Provider, provider: Arc<dyn CompletionProvider>) {
        self.providers.insert(family, provider);
    }

    /// Resolves the client serving a model name.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for names matching no known family
    /// when no custom endpoint is registered, and
    /// [`Error::MissingApiKey`] when the family exists but carries no
    /// credentials.
    pub fn for_model(&self, model: &str) -> Result<Arc<dyn CompletionProvider>> {
        // Names with no recognized prefix route to the custom endpoint
        // when one is configured.
        let family = Provider::detect(model).or_else(|| {
            self.providers
                .contains_key(&Provider::Custom)
                .then_some(Provider::Custom)
        });
        let Some(family) = family else {
            return Err(Error::Validation(format!(
                "Cannot determine a provider for model '{model}'"
            )));
        };

        self.providers.get(&family).cloned().ok_or_else(|| {
            let configured = self.family_names().join(", ");
            Error::MissingApiKey(format!(
                "{} (no API key for model '{model}'; configured families: [{configured}])",
                family.key_name()
            ))
        })
    }

    /// Families with a configured client.
    pub fn families(&self) -> Vec<Provider> {
        let mut families: Vec<Provider> = self.providers.keys().copied().collect();
        families.sort_by_key(|family| family.key_name());
        families
    }

    /// Whether any family is configured.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn family_names(&self) -> Vec<&'static str> {
        self.families()
            .into_iter()
            .map(Provider::key_name)
            .collect()
    }
}
