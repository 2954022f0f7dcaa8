//! Model catalog.
//!
//! A declarative registry of model metadata loaded once at startup,
//! either from the built-in defaults or from a TOML file. Every entry
//! is validated at load time so malformed metadata fails early instead
//! of at scoring time.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use arbiter_core::{Error, Mode, Result};

use crate::provider::Provider;

/// Relative cost of a model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    /// Cheap or free.
    #[default]
    Low,
    /// Moderate cost.
    Medium,
    /// Expensive.
    High,
    /// Premium pricing; penalized for tiny tasks.
    VeryHigh,
}

/// Relative latency of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    /// Sub-second first token; favored for simple tasks.
    VeryFast,
    /// Fast.
    #[default]
    Fast,
    /// Noticeable latency.
    Medium,
    /// Long-running (reasoning models).
    Slow,
}

/// Coarse task-difficulty classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Small single-file or conversational tasks.
    #[default]
    Low,
    /// Multi-file or mid-sized tasks.
    Medium,
    /// Large-context or deep-reasoning tasks.
    High,
}

impl Display for Complexity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        formatter.write_str(name)
    }
}

/// Immutable metadata describing one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique model identifier, e.g. `"gemini-2.5-pro"`.
    pub name: String,
    /// Owning provider family.
    pub provider: Provider,
    /// Maximum input+output tokens the model accepts.
    pub context_limit: usize,
    /// Cost tier.
    pub cost: CostTier,
    /// Speed tier.
    pub speed: SpeedTier,
    /// Modes this model is the first choice for.
    #[serde(default)]
    pub preferred_modes: Vec<Mode>,
    /// Modes this model handles acceptably.
    #[serde(default)]
    pub suitable_modes: Vec<Mode>,
    /// Complexity tier the model is optimized for.
    pub complexity_optimal: Complexity,
    /// Minimum complexity tier worth routing to this model.
    pub complexity_min: Complexity,
    /// Tie-break priority; lower is more preferred.
    pub selection_priority: u8,
}

impl ModelDescriptor {
    /// Checks descriptor invariants.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the name is empty or the context
    /// limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("Model name must not be empty".to_owned()));
        }
        if self.context_limit == 0 {
            return Err(Error::Config(format!(
                "Model '{}' has a zero context limit",
                self.name
            )));
        }
        Ok(())
    }
}

/// TOML shape for catalog files: a list of `[[models]]` tables.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    /// Descriptor entries.
    models: Vec<ModelDescriptor>,
}

/// The set of models the gateway can route to.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    /// Descriptors in declaration order.
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Builds a catalog from descriptors, validating every entry and
    /// rejecting duplicate names.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed or duplicated entries.
    pub fn from_models(models: Vec<ModelDescriptor>) -> Result<Self> {
        for descriptor in &models {
            descriptor.validate()?;
        }
        for (index, descriptor) in models.iter().enumerate() {
            let duplicated = models[..index]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&descriptor.name));
            if duplicated {
                return Err(Error::Config(format!(
                    "Duplicate model name '{}' in catalog",
                    descriptor.name
                )));
            }
        }
        Ok(Self { models })
    }

    /// Loads a catalog from a TOML file containing `[[models]]` tables.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read catalog: {error}")))?;
        let parsed: CatalogFile = toml::from_str(&contents)
            .map_err(|error| Error::Config(format!("Failed to parse catalog: {error}")))?;
        Self::from_models(parsed.models)
    }

    /// The built-in default catalog.
    pub fn with_defaults() -> Self {
        Self {
            models: default_models(),
        }
    }

    /// Looks up a descriptor by name (case-insensitive, trimmed).
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        let wanted = name.trim();
        self.models
            .iter()
            .find(|descriptor| descriptor.name.eq_ignore_ascii_case(wanted))
    }

    /// Iterates descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// All model names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.models
            .iter()
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }

    /// Number of models in the catalog.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Builds the built-in model set.
#[allow(clippy::too_many_lines, reason = "Declarative model table")]
fn default_models() -> Vec<ModelDescriptor> {
    use Mode::*;

    vec![
        ModelDescriptor {
            name: "gemini-2.5-flash".to_owned(),
            provider: Provider::Google,
            context_limit: 1_048_576,
            cost: CostTier::Low,
            speed: SpeedTier::VeryFast,
            preferred_modes: vec![Chat],
            suitable_modes: vec![Analyze, Review, Debug, Plan, Test, Refactor],
            complexity_optimal: Complexity::Low,
            complexity_min: Complexity::Low,
            selection_priority: 1,
        },
        ModelDescriptor {
            name: "gemini-2.5-pro".to_owned(),
            provider: Provider::Google,
            context_limit: 1_048_576,
            cost: CostTier::High,
            speed: SpeedTier::Medium,
            preferred_modes: vec![Analyze, Think],
            suitable_modes: vec![Review, Debug, Plan, Refactor],
            complexity_optimal: Complexity::High,
            complexity_min: Complexity::Medium,
            selection_priority: 2,
        },
        ModelDescriptor {
            name: "gemini-2.0-flash".to_owned(),
            provider: Provider::Google,
            context_limit: 1_000_000,
            cost: CostTier::Low,
            speed: SpeedTier::VeryFast,
            preferred_modes: vec![],
            suitable_modes: vec![Chat, Test],
            complexity_optimal: Complexity::Low,
            complexity_min: Complexity::Low,
            selection_priority: 4,
        },
        ModelDescriptor {
            name: "gpt-4o".to_owned(),
            provider: Provider::OpenAi,
            context_limit: 128_000,
            cost: CostTier::High,
            speed: SpeedTier::Fast,
            preferred_modes: vec![Review, Debug],
            suitable_modes: vec![Chat, Analyze, Plan, Refactor, Test],
            complexity_optimal: Complexity::Medium,
            complexity_min: Complexity::Low,
            selection_priority: 3,
        },
        ModelDescriptor {
            name: "gpt-4o-mini".to_owned(),
            provider: Provider::OpenAi,
            context_limit: 128_000,
            cost: CostTier::Low,
            speed: SpeedTier::VeryFast,
            preferred_modes: vec![Test],
            suitable_modes: vec![Chat, Debug, Refactor],
            complexity_optimal: Complexity::Low,
            complexity_min: Complexity::Low,
            selection_priority: 2,
        },
        ModelDescriptor {
            name: "o1".to_owned(),
            provider: Provider::OpenAi,
            context_limit: 200_000,
            cost: CostTier::VeryHigh,
            speed: SpeedTier::Slow,
            preferred_modes: vec![Think],
            suitable_modes: vec![Analyze, Debug, Plan],
            complexity_optimal: Complexity::High,
            complexity_min: Complexity::High,
            selection_priority: 5,
        },
        ModelDescriptor {
            name: "o3-mini".to_owned(),
            provider: Provider::OpenAi,
            context_limit: 200_000,
            cost: CostTier::Medium,
            speed: SpeedTier::Fast,
            preferred_modes: vec![Debug, Plan],
            suitable_modes: vec![Analyze, Test, Refactor],
            complexity_optimal: Complexity::Medium,
            complexity_min: Complexity::Low,
            selection_priority: 3,
        },
        ModelDescriptor {
            name: "claude-sonnet-4".to_owned(),
            provider: Provider::Anthropic,
            context_limit: 200_000,
            cost: CostTier::High,
            speed: SpeedTier::Medium,
            preferred_modes: vec![Review, Refactor, Plan],
            suitable_modes: vec![Chat, Analyze, Debug, Think],
            complexity_optimal: Complexity::High,
            complexity_min: Complexity::Medium,
            selection_priority: 2,
        },
        ModelDescriptor {
            name: "claude-3-5-haiku".to_owned(),
            provider: Provider::Anthropic,
            context_limit: 200_000,
            cost: CostTier::Low,
            speed: SpeedTier::VeryFast,
            preferred_modes: vec![],
            suitable_modes: vec![Chat, Test, Debug],
            complexity_optimal: Complexity::Low,
            complexity_min: Complexity::Low,
            selection_priority: 3,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = ModelCatalog::with_defaults();
        assert!(!catalog.is_empty());
        for descriptor in catalog.iter() {
            descriptor.validate().unwrap();
            assert!(descriptor.context_limit > 0);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = ModelCatalog::with_defaults();
        assert!(catalog.get(" GEMINI-2.5-PRO ").is_some());
        assert!(catalog.get("made-up-model").is_none());
    }

    #[test]
    fn test_zero_context_limit_rejected() {
        let mut models = default_models();
        models[0].context_limit = 0;
        let result = ModelCatalog::from_models(models);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut models = default_models();
        let mut duplicate = models[0].clone();
        duplicate.name = duplicate.name.to_uppercase();
        models.push(duplicate);
        assert!(ModelCatalog::from_models(models).is_err());
    }

    #[test]
    fn test_load_from_toml() {
        use std::io::Write as _;

        let toml_text = r#"
[[models]]
name = "gemini-2.5-flash"
provider = "google"
context_limit = 1048576
cost = "low"
speed = "very_fast"
preferred_modes = ["chat"]
suitable_modes = ["test"]
complexity_optimal = "low"
complexity_min = "low"
selection_priority = 1
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_text.as_bytes()).unwrap();

        let catalog = ModelCatalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        let descriptor = catalog.get("gemini-2.5-flash").unwrap();
        assert_eq!(descriptor.provider, Provider::Google);
        assert_eq!(descriptor.preferred_modes, vec![Mode::Chat]);
    }

    #[test]
    fn test_complexity_ordering() {
        assert!(Complexity::Low < Complexity::Medium);
        assert!(Complexity::Medium < Complexity::High);
    }
}
