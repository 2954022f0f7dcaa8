//! Environment-driven model restrictions.
//!
//! A model is allowed iff it is not globally blocked, matches no
//! disabled pattern, and (when its provider family has a non-empty
//! allow-list) appears in that family's allow-list. Disabled patterns
//! match on word boundaries: pattern `mini` blocks `gpt-4o-mini` but
//! must not block `gemini-2.5-pro`.

use std::collections::{HashMap, HashSet};
use std::env;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::provider::Provider;

/// Raw restriction lists, before normalization.
///
/// Constructed from the environment in production and directly in
/// tests, so each test can run with its own configuration.
#[derive(Debug, Clone, Default)]
pub struct RestrictionSettings {
    /// Allowed OpenAI model names; empty means unrestricted.
    pub openai_allowed: Vec<String>,
    /// Allowed Google model names; empty means unrestricted.
    pub google_allowed: Vec<String>,
    /// Allowed Anthropic model names; empty means unrestricted.
    pub anthropic_allowed: Vec<String>,
    /// Globally blocked model names.
    pub blocked_models: Vec<String>,
    /// Disabled name patterns, matched on word boundaries.
    pub disabled_patterns: Vec<String>,
}

impl RestrictionSettings {
    /// Loads restriction lists from environment variables. Missing or
    /// empty variables mean "no restriction".
    pub fn from_env() -> Self {
        Self {
            openai_allowed: split_env("OPENAI_ALLOWED_MODELS"),
            google_allowed: split_env("GOOGLE_ALLOWED_MODELS"),
            anthropic_allowed: split_env("ANTHROPIC_ALLOWED_MODELS"),
            blocked_models: split_env("BLOCKED_MODELS"),
            disabled_patterns: split_env("DISABLED_MODEL_PATTERNS"),
        }
    }
}

/// Reads a comma-separated environment variable into a list.
fn split_env(var: &str) -> Vec<String> {
    env::var(var)
        .map(|value| value.split(',').map(str::to_owned).collect())
        .unwrap_or_default()
}

/// Immutable, normalized restriction state.
///
/// Reloading restrictions means constructing a fresh policy; in-flight
/// requests keep reading their stale-but-consistent snapshot.
#[derive(Debug)]
pub struct RestrictionPolicy {
    /// Per-family allow-lists, lower-cased and trimmed. Absent or empty
    /// entries mean the family is unrestricted.
    allowed: HashMap<Provider, HashSet<String>>,
    /// Globally blocked names, lower-cased.
    blocked: HashSet<String>,
    /// Compiled word-boundary patterns, paired with their source text
    /// for logging.
    disabled: Vec<(String, Regex)>,
}

impl RestrictionPolicy {
    /// Builds a policy from raw settings, normalizing every entry.
    /// Malformed entries are dropped with a warning; an empty
    /// configuration means "everything allowed".
    pub fn new(settings: &RestrictionSettings) -> Self {
        let mut allowed = HashMap::new();
        for (provider, list) in [
            (Provider::OpenAi, &settings.openai_allowed),
            (Provider::Google, &settings.google_allowed),
            (Provider::Anthropic, &settings.anthropic_allowed),
        ] {
            let set = normalize(list);
            if !set.is_empty() {
                allowed.insert(provider, set);
            }
        }

        let blocked = normalize(&settings.blocked_models);

        let mut disabled = Vec::new();
        for pattern in &settings.disabled_patterns {
            let trimmed = pattern.trim().to_lowercase();
            if trimmed.is_empty() {
                continue;
            }
            let source = format!(r"\b{}\b", regex::escape(&trimmed));
            match Regex::new(&source) {
                Ok(regex) => disabled.push((trimmed, regex)),
                Err(error) => warn!("Skipping unusable disabled pattern '{trimmed}': {error}"),
            }
        }

        if !blocked.is_empty() {
            let mut names: Vec<_> = blocked.iter().cloned().collect();
            names.sort_unstable();
            info!("Blocked models: {names:?}");
        }
        if !disabled.is_empty() {
            let patterns: Vec<_> = disabled.iter().map(|(text, _)| text.clone()).collect();
            info!("Disabled patterns: {patterns:?}");
        }

        Self {
            allowed,
            blocked,
            disabled,
        }
    }

    /// Builds a policy from the process environment.
    pub fn from_env() -> Self {
        Self::new(&RestrictionSettings::from_env())
    }

    /// A policy that allows everything.
    pub fn allow_all() -> Self {
        Self::new(&RestrictionSettings::default())
    }

    /// Whether a model may be selected or explicitly requested.
    ///
    /// Pure predicate: no side effects beyond logging, never fails.
    pub fn is_allowed(&self, model_name: &str) -> bool {
        let name = model_name.trim().to_lowercase();

        if self.blocked.contains(&name) {
            debug!("Model {model_name} is globally blocked");
            return false;
        }

        for (pattern, regex) in &self.disabled {
            if regex.is_match(&name) {
                debug!("Model {model_name} matches disabled pattern: {pattern}");
                return false;
            }
        }

        if let Some(provider) = Provider::detect(&name)
            && let Some(allow_list) = self.allowed.get(&provider)
            && !allow_list.contains(&name)
        {
            debug!("{provider} model {model_name} not in allowed list");
            return false;
        }

        true
    }

    /// Whether any restriction is configured at all.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty() && self.blocked.is_empty() && self.disabled.is_empty()
    }
}

/// Lower-cases, trims, and drops empty entries.
fn normalize(entries: &[String]) -> HashSet<String> {
    entries
        .iter()
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(settings: RestrictionSettings) -> RestrictionPolicy {
        RestrictionPolicy::new(&settings)
    }

    #[test]
    fn test_empty_configuration_allows_everything() {
        let policy = RestrictionPolicy::allow_all();
        assert!(policy.is_unrestricted());
        assert!(policy.is_allowed("gemini-2.5-pro"));
        assert!(policy.is_allowed("gpt-4o"));
        assert!(policy.is_allowed("completely-unknown-model"));
    }

    #[test]
    fn test_global_block_wins() {
        let policy = policy(RestrictionSettings {
            blocked_models: vec![" GPT-4o ".to_owned()],
            ..RestrictionSettings::default()
        });
        assert!(!policy.is_allowed("gpt-4o"));
        assert!(!policy.is_allowed("  gpt-4o  "));
        assert!(policy.is_allowed("gpt-4o-mini"));
    }

    #[test]
    fn test_pattern_uses_word_boundaries() {
        // Regression: "mini" must not block "gemini-2.5-pro".
        let policy = policy(RestrictionSettings {
            disabled_patterns: vec!["mini".to_owned()],
            ..RestrictionSettings::default()
        });
        assert!(policy.is_allowed("gemini-2.5-pro"));
        assert!(policy.is_allowed("gemini-2.5-flash"));
        assert!(!policy.is_allowed("gpt-4o-mini"));
        assert!(!policy.is_allowed("o3-mini"));
    }

    #[test]
    fn test_flash_pattern_blocks_whole_word_only() {
        let policy = policy(RestrictionSettings {
            disabled_patterns: vec!["flash".to_owned()],
            ..RestrictionSettings::default()
        });
        assert!(!policy.is_allowed("gemini-2.5-flash"));
        assert!(!policy.is_allowed("gemini-2.0-flash"));
        assert!(policy.is_allowed("gemini-2.5-pro"));
        assert!(policy.is_allowed("flashy-model-x"));
    }

    #[test]
    fn test_provider_allow_list_enforced_when_non_empty() {
        let policy = policy(RestrictionSettings {
            openai_allowed: vec!["gpt-4o-mini".to_owned()],
            ..RestrictionSettings::default()
        });
        assert!(policy.is_allowed("gpt-4o-mini"));
        assert!(!policy.is_allowed("gpt-4o"));
        assert!(!policy.is_allowed("o1"));
        // Other families are untouched.
        assert!(policy.is_allowed("gemini-2.5-pro"));
        assert!(policy.is_allowed("claude-sonnet-4"));
    }

    #[test]
    fn test_unknown_prefix_bypasses_allow_lists() {
        let policy = policy(RestrictionSettings {
            openai_allowed: vec!["gpt-4o".to_owned()],
            google_allowed: vec!["gemini-2.5-flash".to_owned()],
            anthropic_allowed: vec!["claude-sonnet-4".to_owned()],
            ..RestrictionSettings::default()
        });
        assert!(policy.is_allowed("grok-3"));
    }

    #[test]
    fn test_whitespace_only_entries_are_ignored() {
        let policy = policy(RestrictionSettings {
            blocked_models: vec![String::new(), "  ".to_owned()],
            disabled_patterns: vec![String::new()],
            ..RestrictionSettings::default()
        });
        assert!(policy.is_unrestricted());
    }
}
