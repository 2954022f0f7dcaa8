//! Anthropic messages-API client.
//!
//! Anthropic takes system instructions as a top-level field rather than
//! a message role, and requires an explicit output-token limit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use arbiter_core::{ChatMessage, CompletionProvider, Error, Result, Role};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for the Anthropic messages API.
#[derive(Debug)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
}

impl AnthropicProvider {
    /// Creates a client.
    ///
    /// # Errors
    /// Returns [`Error::MissingApiKey`] if the key is empty.
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("anthropic".to_owned()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Splits system instructions out of the message sequence.
    fn split_system(messages: &[ChatMessage]) -> (String, Vec<serde_json::Value>) {
        let system: Vec<&str> = messages
            .iter()
            .filter(|message| message.role == Role::System)
            .map(|message| message.content.as_str())
            .collect();
        let rest = messages
            .iter()
            .filter(|message| message.role != Role::System)
            .map(|message| {
                json!({
                    "role": message.role.to_string(),
                    "content": message.content,
                })
            })
            .collect();
        (system.join("\n\n"), rest)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let (system, messages) = Self::split_system(messages);

        let mut body = json!({
            "model": model,
            "max_tokens": max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": temperature,
            "messages": messages,
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }

        debug!("Dispatching {model} to anthropic");
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|error| Error::Dispatch(format!("Anthropic request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Dispatch(format!(
                "Anthropic returned {status}: {error_text}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|error| Error::Dispatch(format!("Unreadable Anthropic response: {error}")))?;
        parsed
            .content
            .into_iter()
            .next()
            .map(|block| {
                let ContentBlock::Text { text } = block;
                text
            })
            .ok_or_else(|| Error::Dispatch("Empty response from Anthropic".to_owned()))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            AnthropicProvider::new(String::new()),
            Err(Error::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_system_lifted_to_top_level() {
        let messages = vec![
            ChatMessage::system("Be terse."),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi"),
        ];
        let (system, rest) = AnthropicProvider::split_system(&messages);

        assert_eq!(system, "Be terse.");
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0]["role"], "user");
        assert_eq!(rest[1]["role"], "assistant");
    }

    #[test]
    fn test_no_system_message_yields_empty_prefix() {
        let (system, rest) = AnthropicProvider::split_system(&[ChatMessage::user("hello")]);
        assert!(system.is_empty());
        assert_eq!(rest.len(), 1);
    }
}
