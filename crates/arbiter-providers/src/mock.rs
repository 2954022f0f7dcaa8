//! Scriptable in-memory provider for tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use arbiter_core::{ChatMessage, CompletionProvider, Error, Result};

/// Arguments captured from one `complete` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Requested model.
    pub model: String,
    /// Message sequence as dispatched.
    pub messages: Vec<ChatMessage>,
    /// Dispatch temperature.
    pub temperature: f32,
    /// Output-token limit, if any.
    pub max_tokens: Option<u32>,
}

/// Provider that returns a canned response and records every call.
#[derive(Debug)]
pub struct MockProvider {
    response: String,
    fail_with: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    /// A provider that always succeeds with `response`.
    pub fn new<T: Into<String>>(response: T) -> Self {
        Self {
            response: response.into(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails with a dispatch error.
    pub fn failing<T: Into<String>>(message: T) -> Self {
        Self {
            response: String::new(),
            fail_with: Some(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                model: model.to_owned(),
                messages: messages.to_vec(),
                temperature,
                max_tokens,
            });

        match &self.fail_with {
            Some(message) => Err(Error::Dispatch(message.clone())),
            None => Ok(self.response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let provider = MockProvider::new("canned");
        for model in ["gpt-4o", "o1"] {
            let result = provider
                .complete(model, &[ChatMessage::user("hi")], 0.7, None)
                .await;
            assert_eq!(result.unwrap(), "canned");
        }

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].model, "gpt-4o");
        assert_eq!(calls[1].model, "o1");
    }

    #[tokio::test]
    async fn test_failing_provider_still_records() {
        let provider = MockProvider::failing("quota exceeded");
        let result = provider
            .complete("gpt-4o", &[ChatMessage::user("hi")], 0.7, None)
            .await;
        assert!(matches!(result, Err(Error::Dispatch(_))));
        assert_eq!(provider.call_count(), 1);
    }
}
