//! Completion provider clients.
//!
//! Thin HTTP wrappers implementing [`arbiter_core::CompletionProvider`]
//! for the hosted model families, plus the registry that maps a model
//! name to the client able to serve it. Gemini, OpenRouter, and custom
//! endpoints all speak the OpenAI chat-completions dialect, so one
//! client covers them with different base URLs.

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, RecordedCall};
pub use openai::OpenAiCompatProvider;
pub use registry::ProviderRegistry;
