//! One-request coordination.
//!
//! `execute` runs a request end to end: validate the model name,
//! resolve conversation context, deduplicate files against thread
//! history, pick a model when asked for `auto`, dispatch, and record
//! the exchange. Validation and security failures short-circuit before
//! any I/O; dispatch failures propagate without touching memory.

use std::sync::Arc;

use tracing::{error, info, warn};

use arbiter_core::token::file_token_budget;
use arbiter_core::{ChatMessage, Error, GatewayConfig, Result, TaskOutcome, TaskRequest};
use arbiter_memory::{ConversationStore, ConversationThread, ThreadId, TurnRecord};
use arbiter_providers::ProviderRegistry;
use arbiter_routing::{ModelCatalog, ModelSelector, RestrictionPolicy};

use crate::files;
use crate::naming::{self, ResolvedModel};
use crate::prompts;

/// Context budget assumed for models absent from the catalog
/// (aggregator and custom-endpoint names).
const UNKNOWN_MODEL_CONTEXT: usize = 100_000;

/// Coordinates the routing, memory, and provider components for one
/// request at a time. Owns none of them.
pub struct RequestOrchestrator {
    config: Arc<GatewayConfig>,
    catalog: Arc<ModelCatalog>,
    policy: Arc<RestrictionPolicy>,
    selector: ModelSelector,
    store: Arc<dyn ConversationStore>,
    registry: Arc<ProviderRegistry>,
}

impl RequestOrchestrator {
    /// Assembles an orchestrator from shared components.
    pub fn new(
        config: Arc<GatewayConfig>,
        catalog: Arc<ModelCatalog>,
        policy: Arc<RestrictionPolicy>,
        store: Arc<dyn ConversationStore>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        let selector = ModelSelector::new(Arc::clone(&catalog), Arc::clone(&policy));
        Self {
            config,
            catalog,
            policy,
            selector,
            store,
            registry,
        }
    }

    /// Executes a request end to end.
    ///
    /// # Errors
    /// Returns validation, security, or dispatch errors; an unknown
    /// continuation id is not an error and degrades to a fresh context.
    pub async fn execute(&self, request: TaskRequest) -> Result<TaskOutcome> {
        request.validate()?;
        let resolved = naming::resolve(request.model.as_deref(), &self.catalog)?;
        if let ResolvedModel::Explicit(name) = &resolved
            && !self.policy.is_allowed(name)
        {
            return Err(Error::Validation(format!(
                "Model '{name}' is not allowed by current restrictions. Allowed models: {}",
                self.allowed_names().join(", ")
            )));
        }
        if let Some(output) = &request.output_file {
            files::validate_paths(std::slice::from_ref(output))?;
        }

        let thread = self.resolve_thread(request.continuation_id.as_deref()).await;

        // Only files the thread has not embedded yet are read again.
        let requested = files::validate_paths(&request.files)?;
        let expanded = files::expand_paths(&requested, &self.config);
        let known = thread
            .as_ref()
            .map(ConversationThread::embedded_files)
            .unwrap_or_default();
        let new_files: Vec<String> = expanded
            .into_iter()
            .filter(|path| !known.contains(path))
            .collect();

        let model = match resolved {
            ResolvedModel::Explicit(name) => name,
            ResolvedModel::Auto => {
                let context_chars = thread
                    .as_ref()
                    .and_then(|thread| serde_json::to_string(thread).ok())
                    .map_or(0, |serialized| serialized.len());
                let selection = self.selector.select(
                    request.mode,
                    request.prompt.len(),
                    new_files.len(),
                    context_chars,
                    None,
                );
                info!("{}", selection.reasoning);
                selection.model
            }
        };

        let messages = self
            .assemble_messages(&request, thread.as_ref(), &model, &new_files)
            .await;

        let provider = self.registry.for_model(&model)?;
        let response = provider
            .complete(
                &model,
                &messages,
                request.effective_temperature(),
                None,
            )
            .await
            .inspect_err(|dispatch_error| {
                error!(
                    mode = %request.mode,
                    model = %model,
                    "Dispatch failed: {dispatch_error}"
                );
            })?;

        let (thread_id, created) = self
            .record_exchange(&request, thread, &model, &new_files, &response)
            .await;

        let mut text = response;
        if created && let Some(id) = thread_id {
            text.push_str(&format!(
                "\n\n---\nContinue this conversation with continuation_id: {id}"
            ));
        }
        if let Some(output) = &request.output_file {
            tokio::fs::write(output, &text).await?;
            text = format!("Response written to {output}");
        }

        Ok(TaskOutcome {
            text,
            thread_id: thread_id.map(|id| id.to_string()),
            model,
            created_thread: created,
        })
    }

    /// Fetches the continuation thread if one was named. Unknown or
    /// malformed ids degrade to a fresh context.
    async fn resolve_thread(&self, continuation_id: Option<&str>) -> Option<ConversationThread> {
        let raw = continuation_id?;
        let Ok(id) = raw.parse::<ThreadId>() else {
            warn!("Malformed continuation id '{raw}'; starting fresh");
            return None;
        };
        let thread = self.store.get_thread(id).await;
        if thread.is_none() {
            warn!("Continuation {id} not found; starting fresh");
        }
        thread
    }

    /// Builds the message sequence: system prompt, trimmed history, and
    /// the user content with new-file bodies appended.
    async fn assemble_messages(
        &self,
        request: &TaskRequest,
        thread: Option<&ConversationThread>,
        model: &str,
        new_files: &[String],
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(prompts::system_prompt(request.mode))];
        if let Some(thread) = thread {
            for turn in thread.recent_turns(self.config.max_history_turns) {
                messages.push(ChatMessage {
                    role: turn.role,
                    content: turn.content.clone(),
                });
            }
        }

        let context_limit = self
            .catalog
            .get(model)
            .map_or(UNKNOWN_MODEL_CONTEXT, |descriptor| descriptor.context_limit);
        let file_context = files::build_file_context(
            new_files,
            request.file_handling_mode,
            file_token_budget(context_limit),
        )
        .await;

        let mut content = request.prompt.clone();
        content.push_str(&file_context);
        messages.push(ChatMessage::user(content));
        messages
    }

    /// Appends the exchange to its thread, creating one first when the
    /// response is substantial enough to be worth continuing. Returns
    /// the thread id (if any) and whether it was created here.
    async fn record_exchange(
        &self,
        request: &TaskRequest,
        thread: Option<ConversationThread>,
        model: &str,
        new_files: &[String],
        response: &str,
    ) -> (Option<ThreadId>, bool) {
        let mut created = false;
        let thread_id = match thread {
            Some(thread) => Some(thread.id),
            None if response.len() >= self.config.substantial_response_threshold => {
                let initial =
                    serde_json::to_value(request).unwrap_or(serde_json::Value::Null);
                let id = self
                    .store
                    .create_thread("arbiter", request.mode, initial)
                    .await;
                created = true;
                Some(id)
            }
            None => None,
        };

        if let Some(id) = thread_id {
            // The user turn carries only newly embedded files so the
            // dedup set never double-counts.
            self.store
                .add_turn(
                    id,
                    TurnRecord::user(request.prompt.clone(), new_files.to_vec())
                        .with_mode(request.mode),
                )
                .await;
            self.store
                .add_turn(
                    id,
                    TurnRecord::assistant(response.to_owned(), model).with_mode(request.mode),
                )
                .await;
        }
        (thread_id, created)
    }

    fn allowed_names(&self) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|descriptor| self.policy.is_allowed(&descriptor.name))
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }
}
