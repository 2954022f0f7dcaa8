//! Conversation-thread memory.
//!
//! Threads are append-only logs of turns keyed by an opaque identifier.
//! They give the gateway cross-call context continuity and let it skip
//! re-reading files that earlier turns already embedded.

pub mod ids;
pub mod store;
pub mod thread;

pub use ids::ThreadId;
pub use store::{ConversationStore, InMemoryStore, TurnRecord};
pub use thread::{ConversationThread, ConversationTurn};
