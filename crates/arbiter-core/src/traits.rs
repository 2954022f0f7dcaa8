//! Provider trait implemented by completion adapters.

use async_trait::async_trait;

use crate::types::ChatMessage;
use crate::Result;

/// A hosted large-language-model backend capable of chat completion.
///
/// Adapters translate the neutral message sequence into each service's
/// wire format and normalize provider quirks (system-message handling,
/// token-parameter naming) internally.
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    /// Human-readable provider name, used in logs and errors.
    fn name(&self) -> &str;

    /// Whether this provider is configured and ready to serve requests.
    async fn is_available(&self) -> bool;

    /// Generates a completion for the given messages.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Dispatch`] if the request fails for any
    /// reason (auth, quota, network, invalid model at the provider side).
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String>;
}
