//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use arbiter_core::{ChatMessage, CompletionProvider, Error, Result, Role};

/// OpenAI's own endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Google's OpenAI-compatible Gemini endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// OpenRouter aggregator endpoint.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Client for any endpoint speaking the OpenAI chat-completions
/// dialect: OpenAI itself, Gemini's compatibility surface, OpenRouter,
/// and self-hosted servers.
#[derive(Debug)]
pub struct OpenAiCompatProvider {
    client: Client,
    name: String,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatProvider {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    /// Returns [`Error::MissingApiKey`] if the key is empty.
    pub fn new(name: &str, base_url: &str, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey(name.to_owned()));
        }
        Ok(Self {
            client: Client::new(),
            name: name.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    /// Reasoning models reject system messages and take
    /// `max_completion_tokens` instead of `max_tokens`.
    fn is_reasoning_model(model: &str) -> bool {
        let model = model.trim().to_lowercase();
        model.starts_with("o1") || model.starts_with("o3")
    }

    /// Folds system messages into the first user message for models
    /// that reject the system role.
    fn fold_system_messages(messages: &[ChatMessage]) -> Vec<serde_json::Value> {
        let system_text: Vec<&str> = messages
            .iter()
            .filter(|message| message.role == Role::System)
            .map(|message| message.content.as_str())
            .collect();
        let mut prefix = system_text.join("\n\n");

        let mut folded = Vec::new();
        for message in messages {
            if message.role == Role::System {
                continue;
            }
            if message.role == Role::User && !prefix.is_empty() {
                folded.push(json!({
                    "role": "user",
                    "content": format!("{prefix}\n\n{}", message.content),
                }));
                prefix = String::new();
            } else {
                folded.push(json!({
                    "role": message.role.to_string(),
                    "content": message.content,
                }));
            }
        }
        folded
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
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
        let reasoning = Self::is_reasoning_model(model);

        let mut body = if reasoning {
            json!({
                "model": model,
                "messages": Self::fold_system_messages(messages),
            })
        } else {
            let messages: Vec<serde_json::Value> = messages
                .iter()
                .map(|message| {
                    json!({
                        "role": message.role.to_string(),
                        "content": message.content,
                    })
                })
                .collect();
            json!({
                "model": model,
                "messages": messages,
                "temperature": temperature,
            })
        };
        if let Some(limit) = max_tokens {
            let field = if reasoning {
                "max_completion_tokens"
            } else {
                "max_tokens"
            };
            body[field] = json!(limit);
        }

        debug!("Dispatching {model} to {}", self.name);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|error| Error::Dispatch(format!("{} request failed: {error}", self.name)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Dispatch(format!(
                "{} returned {status}: {error_text}",
                self.name
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|error| {
            Error::Dispatch(format!("Unreadable {} response: {error}", self.name))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Dispatch(format!("Empty response from {}", self.name)))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let result = OpenAiCompatProvider::new("openai", OPENAI_BASE_URL, "  ".to_owned());
        assert!(matches!(result, Err(Error::MissingApiKey(_))));
    }

    #[test]
    fn test_reasoning_model_detection() {
        assert!(OpenAiCompatProvider::is_reasoning_model("o1"));
        assert!(OpenAiCompatProvider::is_reasoning_model("o3-mini"));
        assert!(!OpenAiCompatProvider::is_reasoning_model("gpt-4o"));
        assert!(!OpenAiCompatProvider::is_reasoning_model("gemini-2.5-pro"));
    }

    #[test]
    fn test_system_message_folded_into_first_user_turn() {
        let messages = vec![
            ChatMessage::system("You are a reviewer."),
            ChatMessage::user("Check this diff."),
            ChatMessage::assistant("Looks fine."),
            ChatMessage::user("Are you sure?"),
        ];
        let folded = OpenAiCompatProvider::fold_system_messages(&messages);

        assert_eq!(folded.len(), 3);
        assert_eq!(folded[0]["role"], "user");
        let first = folded[0]["content"].as_str().unwrap();
        assert!(first.starts_with("You are a reviewer."));
        assert!(first.ends_with("Check this diff."));
        // Only the first user turn absorbs the system prefix.
        assert_eq!(folded[2]["content"], "Are you sure?");
    }

    #[test]
    fn test_trailing_slash_stripped_from_base_url() {
        let provider =
            OpenAiCompatProvider::new("custom", "http://localhost:8080/v1/", "key".to_owned())
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }
}
