//! Request, response, and message shapes.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::{Error, Result};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions framing the exchange.
    System,
    /// The human (or calling tool).
    User,
    /// The model.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        formatter.write_str(name)
    }
}

/// One message in the sequence sent to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Textual content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system<T: Into<String>>(content: T) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user<T: Into<String>>(content: T) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant<T: Into<String>>(content: T) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// How file content is represented in the assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileHandlingMode {
    /// Full file content is embedded.
    #[default]
    Embedded,
    /// Only a head excerpt of each file is embedded.
    Summary,
    /// Files are referenced by path without content.
    Reference,
}

impl FromStr for FileHandlingMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "summary" => Ok(Self::Summary),
            "reference" => Ok(Self::Reference),
            other => Err(Error::Validation(format!(
                "Unknown file handling mode '{other}'. Valid modes: embedded, summary, reference"
            ))),
        }
    }
}

/// Normalized inbound request, regardless of whether it arrived via the
/// CLI or the stdio server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Operation mode.
    #[serde(default)]
    pub mode: Mode,
    /// The question, request, or task description. Required, non-empty.
    pub prompt: String,
    /// Files or directories to include. Directories are expanded.
    #[serde(default)]
    pub files: Vec<String>,
    /// Model to use. `None` or `"auto"` triggers automatic selection.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature in `[0, 1]`. Defaults per mode.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Opaque thread identifier for multi-turn continuation.
    #[serde(default)]
    pub continuation_id: Option<String>,
    /// How file content is represented in the prompt.
    #[serde(default)]
    pub file_handling_mode: FileHandlingMode,
    /// When set, the result is written to this path instead of returned
    /// inline.
    #[serde(default)]
    pub output_file: Option<String>,
}

impl TaskRequest {
    /// Creates a request with the given mode and prompt and all other
    /// fields at their defaults.
    pub fn new<T: Into<String>>(mode: Mode, prompt: T) -> Self {
        Self {
            mode,
            prompt: prompt.into(),
            files: Vec::new(),
            model: None,
            temperature: None,
            continuation_id: None,
            file_handling_mode: FileHandlingMode::default(),
            output_file: None,
        }
    }

    /// Attaches file paths.
    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Sets an explicit model name.
    #[must_use]
    pub fn with_model<T: Into<String>>(mut self, model: T) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a continuation thread identifier.
    #[must_use]
    pub fn with_continuation<T: Into<String>>(mut self, thread_id: T) -> Self {
        self.continuation_id = Some(thread_id.into());
        self
    }

    /// The temperature to dispatch with: the caller's, or the mode
    /// default.
    pub fn effective_temperature(&self) -> f32 {
        self.temperature
            .unwrap_or_else(|| self.mode.default_temperature())
    }

    /// Checks structural validity of the request.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the prompt is empty or the
    /// temperature is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::Validation("Prompt must not be empty".to_owned()));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            return Err(Error::Validation(format!(
                "Temperature must be between 0 and 1, got {temperature}"
            )));
        }
        Ok(())
    }
}

/// Result of a successfully executed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// The model's response, already formatted for the caller.
    pub text: String,
    /// Thread this exchange belongs to, if any.
    pub thread_id: Option<String>,
    /// Model that produced the response.
    pub model: String,
    /// Whether a new conversation thread was created by this request.
    pub created_thread: bool,
}
