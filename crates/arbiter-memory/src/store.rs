//! Thread storage.
//!
//! The store trait is the seam for a durable backend; the in-memory
//! implementation backs single-process deployments and tests. Threads
//! are returned as snapshots, so readers never observe a half-appended
//! turn.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use arbiter_core::{Mode, Role};

use crate::ids::ThreadId;
use crate::thread::{ConversationThread, ConversationTurn};

/// The fields of a turn supplied by the orchestrator; timestamps are
/// assigned by the store at append time.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    /// Author of the turn.
    pub role: Role,
    /// Textual content.
    pub content: String,
    /// Files embedded with this turn.
    pub files: Vec<String>,
    /// Tool that produced the turn.
    pub tool_name: Option<String>,
    /// Model that produced an assistant turn.
    pub model_name: Option<String>,
    /// Mode the turn was produced under.
    pub mode: Option<Mode>,
}

impl TurnRecord {
    /// A user turn carrying the prompt and its newly embedded files.
    pub fn user<T: Into<String>>(content: T, files: Vec<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            files,
            tool_name: None,
            model_name: None,
            mode: None,
        }
    }

    /// An assistant turn recording which model responded.
    pub fn assistant<T: Into<String>, M: Into<String>>(content: T, model_name: M) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            files: Vec::new(),
            tool_name: None,
            model_name: Some(model_name.into()),
            mode: None,
        }
    }

    /// Sets the mode the turn was produced under.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Pluggable conversation storage.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Opens a new thread and returns its identifier.
    async fn create_thread(
        &self,
        tool_name: &str,
        mode: Mode,
        initial_request: serde_json::Value,
    ) -> ThreadId;

    /// Fetches a snapshot of a thread, or `None` if unknown.
    async fn get_thread(&self, id: ThreadId) -> Option<ConversationThread>;

    /// Appends a turn to a thread. Returns `false` (after logging) when
    /// the thread does not exist; appending is never an error.
    async fn add_turn(&self, id: ThreadId, record: TurnRecord) -> bool;
}

/// Process-local store backed by a map under a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    threads: RwLock<HashMap<ThreadId, ConversationThread>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads currently held.
    pub fn len(&self) -> usize {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no threads.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create_thread(
        &self,
        tool_name: &str,
        mode: Mode,
        initial_request: serde_json::Value,
    ) -> ThreadId {
        let thread = ConversationThread::new(tool_name.to_owned(), mode, initial_request);
        let id = thread.id;
        self.threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, thread);
        debug!("Created thread {id}");
        id
    }

    async fn get_thread(&self, id: ThreadId) -> Option<ConversationThread> {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    async fn add_turn(&self, id: ThreadId, record: TurnRecord) -> bool {
        let mut threads = self.threads.write().unwrap_or_else(PoisonError::into_inner);
        let Some(thread) = threads.get_mut(&id) else {
            warn!("Dropping turn for unknown thread {id}");
            return false;
        };

        let now = Utc::now();
        thread.turns.push(ConversationTurn {
            role: record.role,
            content: record.content,
            timestamp: now,
            files: record.files,
            tool_name: record.tool_name,
            model_name: record.model_name,
            mode: record.mode,
        });
        thread.last_updated = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(store: &InMemoryStore) -> ThreadId {
        store
            .create_thread("arbiter", Mode::Chat, serde_json::Value::Null)
            .await
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = InMemoryStore::new();
        let first = open(&store).await;
        let second = open(&store).await;

        assert!(store.add_turn(first, TurnRecord::user("to first", vec![])).await);
        assert!(
            store
                .add_turn(second, TurnRecord::user("to second", vec![]))
                .await
        );
        assert!(
            store
                .add_turn(second, TurnRecord::assistant("reply", "gpt-4o"))
                .await
        );

        let first = store.get_thread(first).await.unwrap();
        let second = store.get_thread(second).await.unwrap();
        assert_eq!(first.turns.len(), 1);
        assert_eq!(second.turns.len(), 2);
        assert_eq!(first.turns[0].content, "to first");
    }

    #[tokio::test]
    async fn test_append_order_preserved_over_many_turns() {
        let store = InMemoryStore::new();
        let id = open(&store).await;

        for index in 0..100 {
            let record = TurnRecord::user(format!("turn {index}"), vec![]);
            assert!(store.add_turn(id, record).await);
        }

        let thread = store.get_thread(id).await.unwrap();
        assert_eq!(thread.turns.len(), 100);
        for (index, turn) in thread.turns.iter().enumerate() {
            assert_eq!(turn.content, format!("turn {index}"));
        }
    }

    #[tokio::test]
    async fn test_add_turn_to_unknown_thread_reports_false() {
        let store = InMemoryStore::new();
        assert!(
            !store
                .add_turn(ThreadId::new(), TurnRecord::user("lost", vec![]))
                .await
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_returns_snapshot() {
        let store = InMemoryStore::new();
        let id = open(&store).await;
        let snapshot = store.get_thread(id).await.unwrap();

        store
            .add_turn(id, TurnRecord::user("after snapshot", vec![]))
            .await;
        assert!(snapshot.turns.is_empty());
        assert_eq!(store.get_thread(id).await.unwrap().turns.len(), 1);
    }

    #[tokio::test]
    async fn test_assistant_turn_records_model() {
        let store = InMemoryStore::new();
        let id = open(&store).await;
        store
            .add_turn(
                id,
                TurnRecord::assistant("done", "claude-sonnet-4").with_mode(Mode::Review),
            )
            .await;

        let thread = store.get_thread(id).await.unwrap();
        assert_eq!(thread.turns[0].model_name.as_deref(), Some("claude-sonnet-4"));
        assert_eq!(thread.turns[0].mode, Some(Mode::Review));
    }
}
