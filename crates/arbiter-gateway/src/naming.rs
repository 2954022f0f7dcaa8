//! Model-name validation and correction.
//!
//! Humans type model names loosely; the correction table maps common
//! shorthand to canonical catalog names. Names of long-retired models
//! that language models themselves tend to suggest are rejected
//! outright with the current list, never silently substituted.

use tracing::debug;

use arbiter_core::{Error, Result};
use arbiter_routing::{ModelCatalog, Provider};

/// Shorthand and typo variants mapped to canonical names.
const ALIASES: [(&str, &str); 8] = [
    ("flash", "gemini-2.5-flash"),
    ("pro", "gemini-2.5-pro"),
    ("gemini", "gemini-2.5-pro"),
    ("mini", "gpt-4o-mini"),
    ("gpt4o", "gpt-4o"),
    ("sonnet", "claude-sonnet-4"),
    ("claude", "claude-sonnet-4"),
    ("haiku", "claude-3-5-haiku"),
];

/// Retired model names rejected with an error instead of dispatched.
const DEPRECATED: [&str; 6] = [
    "gemini-pro",
    "gemini-1.0-pro",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
    "claude-2",
    "claude-instant",
];

/// Outcome of model-name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedModel {
    /// The caller deferred the choice to the selector.
    Auto,
    /// An explicit, validated model name.
    Explicit(String),
}

/// Lower-cases a raw name and collapses spaces and underscores to
/// hyphens.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}

/// Resolves a caller-supplied model name.
///
/// `None`, an empty string, and `"auto"` all defer to the selector.
/// Everything else is normalized, alias-corrected, checked against the
/// deprecation deny-list, and canonicalized through the catalog. Names
/// absent from the catalog pass through when a provider family can be
/// detected for them (aggregator and custom-endpoint models are not
/// enumerable).
///
/// # Errors
/// Returns [`Error::Validation`] for deprecated or unroutable names;
/// the message enumerates currently valid catalog names.
pub fn resolve(raw: Option<&str>, catalog: &ModelCatalog) -> Result<ResolvedModel> {
    let raw = raw.unwrap_or_default();
    let normalized = normalize(raw);
    if normalized.is_empty() || normalized == "auto" {
        return Ok(ResolvedModel::Auto);
    }

    let corrected = ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(normalized.as_str(), |&(_, canonical)| {
            debug!("Corrected model alias '{normalized}' to '{canonical}'");
            canonical
        });

    if DEPRECATED.contains(&corrected) {
        return Err(Error::Validation(format!(
            "Model '{corrected}' is deprecated and no longer served. Valid models: {}",
            catalog.names().join(", ")
        )));
    }

    if let Some(descriptor) = catalog.get(corrected) {
        return Ok(ResolvedModel::Explicit(descriptor.name.clone()));
    }
    if Provider::detect(corrected).is_some() {
        return Ok(ResolvedModel::Explicit(corrected.to_owned()));
    }

    Err(Error::Validation(format!(
        "Unknown model '{raw}'. Valid models: {} (or 'auto')",
        catalog.names().join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        ModelCatalog::with_defaults()
    }

    #[test]
    fn test_auto_and_empty_defer_to_selector() {
        assert_eq!(resolve(None, &catalog()).unwrap(), ResolvedModel::Auto);
        assert_eq!(resolve(Some(""), &catalog()).unwrap(), ResolvedModel::Auto);
        assert_eq!(
            resolve(Some(" AUTO "), &catalog()).unwrap(),
            ResolvedModel::Auto
        );
    }

    #[test]
    fn test_shorthand_corrected_to_canonical() {
        assert_eq!(
            resolve(Some("flash"), &catalog()).unwrap(),
            ResolvedModel::Explicit("gemini-2.5-flash".to_owned())
        );
        assert_eq!(
            resolve(Some("Sonnet"), &catalog()).unwrap(),
            ResolvedModel::Explicit("claude-sonnet-4".to_owned())
        );
    }

    #[test]
    fn test_spacing_and_case_variants_normalized() {
        assert_eq!(
            resolve(Some("GPT 4o Mini"), &catalog()).unwrap(),
            ResolvedModel::Explicit("gpt-4o-mini".to_owned())
        );
        assert_eq!(
            resolve(Some("claude_sonnet_4"), &catalog()).unwrap(),
            ResolvedModel::Explicit("claude-sonnet-4".to_owned())
        );
    }

    #[test]
    fn test_deprecated_names_rejected_with_valid_list() {
        let error = resolve(Some("gpt-3.5-turbo"), &catalog()).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert!(error.to_string().contains("gemini-2.5-flash"));
    }

    #[test]
    fn test_aggregator_names_pass_through() {
        assert_eq!(
            resolve(Some("deepseek/deepseek-chat"), &catalog()).unwrap(),
            ResolvedModel::Explicit("deepseek/deepseek-chat".to_owned())
        );
    }

    #[test]
    fn test_unroutable_name_rejected() {
        let error = resolve(Some("totally-made-up"), &catalog()).unwrap_err();
        assert!(error.to_string().contains("auto"));
    }
}
