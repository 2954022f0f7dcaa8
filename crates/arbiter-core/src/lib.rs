//! Core types shared by every arbiter crate.
//!
//! Defines the error taxonomy, task modes, the inbound/outbound request
//! shapes, token estimation helpers, gateway configuration, and the
//! [`CompletionProvider`] trait implemented by provider adapters.

pub mod config;
pub mod error;
pub mod mode;
pub mod token;
pub mod traits;
pub mod types;

pub use config::{ApiKeys, GatewayConfig};
pub use error::{Error, Result};
pub use mode::Mode;
pub use traits::CompletionProvider;
pub use types::{ChatMessage, FileHandlingMode, Role, TaskOutcome, TaskRequest};
