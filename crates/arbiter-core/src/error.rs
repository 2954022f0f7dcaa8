//! Error taxonomy for the gateway.
//!
//! Validation and security errors short-circuit before any I/O; dispatch
//! errors surface after the provider call fails and never leave partial
//! conversation state behind. A missing continuation thread is *not* an
//! error: it is recovered locally and never reaches this enum.

use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for gateway operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur across the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request is malformed or names an unknown/disallowed model.
    #[error("{0}")]
    Validation(String),

    /// A file path failed safety validation.
    #[error("Security error: {0}")]
    Security(String),

    /// The external completion call failed (auth, quota, network).
    #[error("Provider dispatch failed: {0}")]
    Dispatch(String),

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// An internal invariant was violated. Should not occur.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error was caused by the caller's input rather than
    /// the gateway or a provider.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Security(_))
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Dispatch failures are transient from this layer's point of view;
    /// retry policy itself belongs to the provider adapters.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }
}
