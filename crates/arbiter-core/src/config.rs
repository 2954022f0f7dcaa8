//! Gateway configuration.
//!
//! Strongly typed settings persisted as TOML at `~/.arbiter/config.toml`
//! and created with defaults on first run. API keys are resolved from
//! the config file first and environment variables second, so a key in
//! either place is sufficient.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Model used when the caller does not name one. `"auto"` enables
    /// scoring-based selection.
    pub default_model: String,
    /// Minimum response length (in characters) that causes a new
    /// conversation thread to be created for an un-threaded request.
    pub substantial_response_threshold: usize,
    /// Number of most-recent turns replayed into the prompt when
    /// continuing a conversation.
    pub max_history_turns: usize,
    /// Maximum size of a single embedded file, in bytes.
    pub max_file_size: u64,
    /// File extensions eligible for embedding.
    pub allowed_extensions: Vec<String>,
    /// Directory names skipped during directory expansion.
    pub excluded_dirs: Vec<String>,
    /// Provider API keys. Environment variables are consulted when a
    /// key is absent here.
    pub api_keys: ApiKeys,
}

/// API keys and endpoints for model providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// OpenAI API key.
    pub openai_api_key: Option<String>,
    /// Google API key for Gemini models.
    pub google_api_key: Option<String>,
    /// Anthropic API key for Claude models.
    pub anthropic_api_key: Option<String>,
    /// `OpenRouter` API key.
    pub openrouter_api_key: Option<String>,
    /// Base URL of a custom OpenAI-compatible endpoint.
    pub custom_api_url: Option<String>,
    /// API key for the custom endpoint, if it requires one.
    pub custom_api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_model: "auto".to_owned(),
            substantial_response_threshold: 100,
            max_history_turns: 10,
            max_file_size: 10_000_000,
            allowed_extensions: default_extensions(),
            excluded_dirs: default_excluded_dirs(),
            api_keys: ApiKeys::default(),
        }
    }
}

/// Default extension allow-list for file embedding.
fn default_extensions() -> Vec<String> {
    [
        "rs", "toml", "py", "js", "ts", "jsx", "tsx", "java", "c", "cpp", "h", "hpp", "cs", "rb",
        "go", "swift", "kt", "php", "sql", "html", "css", "json", "xml", "yaml", "yml", "md",
        "txt", "log", "conf", "ini", "env", "csv", "sh", "bash", "zsh",
    ]
    .iter()
    .map(|ext| (*ext).to_owned())
    .collect()
}

/// Default directory exclude-list for directory expansion.
fn default_excluded_dirs() -> Vec<String> {
    [
        "target",
        "node_modules",
        "dist",
        "build",
        "__pycache__",
        ".git",
        ".svn",
        ".venv",
        "venv",
        ".idea",
        ".vscode",
        ".pytest_cache",
        ".mypy_cache",
    ]
    .iter()
    .map(|dir| (*dir).to_owned())
    .collect()
}

impl GatewayConfig {
    /// Get the default config directory path (`~/.arbiter`).
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        use dirs::home_dir;
        let home = home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".arbiter"))
    }

    /// Get the default config file path (`~/.arbiter/config.toml`).
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with default
    /// values if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        use toml::from_str;
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read config: {error}")))?;
        let config: Self = from_str(&contents)
            .map_err(|error| Error::Config(format!("Failed to parse config: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        use toml::to_string_pretty;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                Error::Config(format!("Failed to create config directory: {error}"))
            })?;
        }

        let contents = to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Arbiter Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))
            .map_err(|error| Error::Config(format!("Failed to write config: {error}")))?;

        Ok(())
    }

    /// Checks configuration invariants.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for values that would misbehave at
    /// request time.
    pub fn validate(&self) -> Result<()> {
        if self.default_model.trim().is_empty() {
            return Err(Error::Config("default_model must not be empty".to_owned()));
        }
        if self.max_history_turns == 0 {
            return Err(Error::Config(
                "max_history_turns must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Get the API key for a provider family, checking the config file
    /// first, then environment variables.
    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        match provider {
            "openai" => self
                .api_keys
                .openai_api_key
                .clone()
                .or_else(|| env::var("OPENAI_API_KEY").ok()),
            "google" => self
                .api_keys
                .google_api_key
                .clone()
                .or_else(|| env::var("GEMINI_API_KEY").ok())
                .or_else(|| env::var("GOOGLE_API_KEY").ok()),
            "anthropic" => self
                .api_keys
                .anthropic_api_key
                .clone()
                .or_else(|| env::var("ANTHROPIC_API_KEY").ok()),
            "openrouter" => self
                .api_keys
                .openrouter_api_key
                .clone()
                .or_else(|| env::var("OPENROUTER_API_KEY").ok()),
            "custom" => self
                .api_keys
                .custom_api_key
                .clone()
                .or_else(|| env::var("CUSTOM_API_KEY").ok()),
            _ => None,
        }
    }

    /// Base URL of the custom OpenAI-compatible endpoint, if configured.
    pub fn custom_api_url(&self) -> Option<String> {
        self.api_keys
            .custom_api_url
            .clone()
            .or_else(|| env::var("CUSTOM_API_URL").ok())
    }

    /// Whether an extension (without dot) is eligible for embedding.
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Whether a directory name is excluded from expansion.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|dir| dir == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.default_model, "auto");
        assert_eq!(config.substantial_response_threshold, 100);
        assert_eq!(config.max_history_turns, 10);
        assert!(config.is_allowed_extension("rs"));
        assert!(config.is_allowed_extension("RS"));
        assert!(!config.is_allowed_extension("exe"));
        assert!(config.is_excluded_dir("node_modules"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = GatewayConfig::default();
        config.default_model = "gemini-2.5-flash".to_owned();
        config.save_to_file(&path).unwrap();

        let reloaded = GatewayConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.default_model, "gemini-2.5-flash");
        assert_eq!(reloaded.max_history_turns, config.max_history_turns);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GatewayConfig::default();
        config.max_history_turns = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config = GatewayConfig::default();
        config.default_model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_key_takes_precedence() {
        let mut config = GatewayConfig::default();
        config.api_keys.anthropic_api_key = Some("from-config".to_owned());
        assert_eq!(
            config.get_api_key("anthropic").as_deref(),
            Some("from-config")
        );
        assert_eq!(config.get_api_key("unknown-provider"), None);
    }
}
