//! Thread and turn data model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arbiter_core::{Mode, Role};

use crate::ids::ThreadId;

/// One message within a thread. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the turn.
    pub role: Role,
    /// Textual content.
    pub content: String,
    /// When the turn was appended.
    pub timestamp: DateTime<Utc>,
    /// Files whose content was embedded with this turn.
    #[serde(default)]
    pub files: Vec<String>,
    /// Tool that produced the turn, if any.
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Model that produced an assistant turn.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Mode the turn was produced under.
    #[serde(default)]
    pub mode: Option<Mode>,
}

/// An ordered, append-only conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    /// Opaque identifier callers use to continue the conversation.
    pub id: ThreadId,
    /// Tool that opened the thread.
    pub tool_name: String,
    /// Mode the thread was opened under.
    pub mode: Mode,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the most recent append.
    pub last_updated: DateTime<Utc>,
    /// Turns in append order.
    pub turns: Vec<ConversationTurn>,
    /// The request that opened the thread, kept for audit.
    pub initial_request: serde_json::Value,
}

impl ConversationThread {
    /// Opens an empty thread.
    pub fn new(tool_name: String, mode: Mode, initial_request: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: ThreadId::new(),
            tool_name,
            mode,
            created_at: now,
            last_updated: now,
            turns: Vec::new(),
            initial_request,
        }
    }

    /// Every file path embedded in any turn, deduplicated.
    pub fn embedded_files(&self) -> HashSet<String> {
        self.turns
            .iter()
            .flat_map(|turn| turn.files.iter().cloned())
            .collect()
    }

    /// The most recent `count` turns, oldest first.
    pub fn recent_turns(&self, count: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(count);
        &self.turns[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_with_turns(contents: &[(&str, &[&str])]) -> ConversationThread {
        let mut thread =
            ConversationThread::new("arbiter".to_owned(), Mode::Chat, serde_json::Value::Null);
        for (content, files) in contents {
            thread.turns.push(ConversationTurn {
                role: Role::User,
                content: (*content).to_owned(),
                timestamp: Utc::now(),
                files: files.iter().map(|&file| file.to_owned()).collect(),
                tool_name: None,
                model_name: None,
                mode: None,
            });
        }
        thread
    }

    #[test]
    fn test_embedded_files_deduplicate_across_turns() {
        let thread = thread_with_turns(&[
            ("first", &["/a.rs", "/b.rs"]),
            ("second", &["/b.rs", "/c.rs"]),
        ]);
        let files = thread.embedded_files();
        assert_eq!(files.len(), 3);
        assert!(files.contains("/a.rs"));
        assert!(files.contains("/c.rs"));
    }

    #[test]
    fn test_recent_turns_keeps_order_and_tail() {
        let thread = thread_with_turns(&[("one", &[]), ("two", &[]), ("three", &[])]);
        let recent = thread.recent_turns(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "two");
        assert_eq!(recent[1].content, "three");

        assert_eq!(thread.recent_turns(10).len(), 3);
    }
}
