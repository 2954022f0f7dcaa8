//! Line-delimited JSON server over stdio.
//!
//! Each input line is one request; each output line is one reply. A
//! malformed line produces an error reply and the loop continues, so a
//! misbehaving client never takes the server down.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tracing::info;

use arbiter_core::{Error, TaskRequest};
use arbiter_gateway::RequestOrchestrator;

/// Reads requests from stdin until EOF, writing one reply per line.
pub async fn run(orchestrator: Arc<RequestOrchestrator>) -> Result<()> {
    info!("Serving line-delimited JSON on stdio");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&orchestrator, line.trim()).await;
        stdout.write_all(reply.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn handle_line(orchestrator: &RequestOrchestrator, line: &str) -> Value {
    let request: TaskRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(parse_error) => {
            return json!({
                "status": "error",
                "error_type": "malformed_request",
                "message": parse_error.to_string(),
            });
        }
    };

    match orchestrator.execute(request).await {
        Ok(outcome) => json!({
            "status": "ok",
            "text": outcome.text,
            "model": outcome.model,
            "continuation_id": outcome.thread_id,
            "created_thread": outcome.created_thread,
        }),
        Err(error) => json!({
            "status": "error",
            "error_type": error_kind(&error),
            "message": error.to_string(),
        }),
    }
}

/// Stable machine-readable error category for replies.
fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Validation(_) => "validation",
        Error::Security(_) => "security",
        Error::Dispatch(_) => "dispatch",
        Error::MissingApiKey(_) => "missing_api_key",
        Error::Config(_) => "config",
        Error::Io(_) | Error::Json(_) | Error::Toml(_) | Error::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use arbiter_core::GatewayConfig;
    use arbiter_memory::InMemoryStore;
    use arbiter_providers::{MockProvider, ProviderRegistry};
    use arbiter_routing::{ModelCatalog, Provider, RestrictionPolicy};

    fn orchestrator(provider: MockProvider) -> RequestOrchestrator {
        let mut registry = ProviderRegistry::new();
        registry.register(Provider::Google, Arc::new(provider));
        RequestOrchestrator::new(
            Arc::new(GatewayConfig::default()),
            Arc::new(ModelCatalog::with_defaults()),
            Arc::new(RestrictionPolicy::allow_all()),
            Arc::new(InMemoryStore::new()),
            Arc::new(registry),
        )
    }

    #[tokio::test]
    async fn test_malformed_line_yields_error_reply() {
        let orchestrator = orchestrator(MockProvider::new("ok"));
        let reply = handle_line(&orchestrator, "this is not json").await;
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["error_type"], "malformed_request");
    }

    #[tokio::test]
    async fn test_valid_request_yields_ok_reply() {
        let orchestrator = orchestrator(MockProvider::new("pong"));
        let reply = handle_line(
            &orchestrator,
            r#"{"prompt": "ping", "model": "gemini-2.5-flash"}"#,
        )
        .await;
        assert_eq!(reply["status"], "ok");
        assert_eq!(reply["text"], "pong");
        assert_eq!(reply["model"], "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_dispatch_failure_categorized() {
        let orchestrator = orchestrator(MockProvider::failing("quota"));
        let reply = handle_line(
            &orchestrator,
            r#"{"prompt": "ping", "model": "gemini-2.5-flash"}"#,
        )
        .await;
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["error_type"], "dispatch");
    }

    #[tokio::test]
    async fn test_empty_prompt_is_a_validation_error() {
        let orchestrator = orchestrator(MockProvider::new("ok"));
        let reply = handle_line(&orchestrator, r#"{"prompt": ""}"#).await;
        assert_eq!(reply["error_type"], "validation");
    }
}
