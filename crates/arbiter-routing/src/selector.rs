//! Scoring-based model selection.
//!
//! Given a task's mode, size, and conversation context, the selector
//! classifies the task into a complexity tier, scores every permitted
//! catalog model, and returns the winner with human-readable reasoning.
//! Selection never fails: when restrictions exclude the whole catalog
//! it degrades through a fixed fallback chain to a last-resort default.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use arbiter_core::Mode;
use arbiter_core::token::CHARS_PER_TOKEN;

use crate::catalog::{Complexity, CostTier, ModelCatalog, ModelDescriptor, SpeedTier};
use crate::restrictions::RestrictionPolicy;

/// Cheap models tried in order when scoring produced no candidate.
const FALLBACK_MODELS: [&str; 3] = ["gemini-2.5-flash", "gpt-4o-mini", "claude-3-5-haiku"];

/// Returned when even the fallback chain is fully restricted. Selection
/// must always produce a name; the dispatch layer surfaces the real
/// failure if this model is unusable too.
const LAST_RESORT_MODEL: &str = "gemini-2.5-flash";

/// Complexity classification cut-offs.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// File count at or above which a task is high complexity.
    pub high_file_count: usize,
    /// Token estimate at or above which a task is high complexity.
    pub high_tokens: usize,
    /// File count at or above which a task is at least medium.
    pub medium_file_count: usize,
    /// Token estimate at or above which a task is at least medium.
    pub medium_tokens: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_file_count: 5,
            high_tokens: 50_000,
            medium_file_count: 2,
            medium_tokens: 10_000,
        }
    }
}

/// Outcome of one selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen model name, always non-empty.
    pub model: String,
    /// Human-readable explanation suitable for logs and audit.
    pub reasoning: String,
    /// Complexity tier the task resolved to.
    pub complexity: Complexity,
    /// Approximate token count of prompt plus conversation context.
    pub estimated_tokens: usize,
}

/// Picks a model for a task when the caller asked for `"auto"`.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    catalog: Arc<ModelCatalog>,
    policy: Arc<RestrictionPolicy>,
    thresholds: Thresholds,
}

impl ModelSelector {
    /// Creates a selector over a catalog and restriction policy.
    pub fn new(catalog: Arc<ModelCatalog>, policy: Arc<RestrictionPolicy>) -> Self {
        Self {
            catalog,
            policy,
            thresholds: Thresholds::default(),
        }
    }

    /// Overrides the complexity thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Selects the best model for a task.
    ///
    /// `prompt_chars` and `context_chars` are character counts; tokens
    /// are approximated as characters over four, not tokenized exactly.
    /// `allowed` further restricts the candidate set when the caller
    /// carries its own allow-list.
    ///
    /// Never fails: always returns a non-empty model name and a
    /// non-empty reasoning string.
    pub fn select(
        &self,
        mode: Mode,
        prompt_chars: usize,
        file_count: usize,
        context_chars: usize,
        allowed: Option<&HashSet<String>>,
    ) -> Selection {
        let estimated_tokens = (prompt_chars + context_chars) / CHARS_PER_TOKEN;
        let complexity = self.classify(mode, estimated_tokens, file_count);

        let candidates: Vec<&ModelDescriptor> = self
            .catalog
            .iter()
            .filter(|descriptor| {
                allowed.is_none_or(|set| {
                    set.iter()
                        .any(|name| name.eq_ignore_ascii_case(&descriptor.name))
                })
            })
            .filter(|descriptor| self.policy.is_allowed(&descriptor.name))
            .collect();

        if candidates.is_empty() {
            return self.fall_back(mode, complexity, estimated_tokens, file_count);
        }

        let mut scored: Vec<(&ModelDescriptor, f64)> = candidates
            .into_iter()
            .map(|descriptor| {
                let score = score_model(descriptor, mode, complexity, estimated_tokens);
                debug!("Scored {} at {score:.1} for {mode}", descriptor.name);
                (descriptor, score)
            })
            .collect();

        // Deterministic order: best score, then lowest priority number,
        // then lexical name.
        scored.sort_by(|left, right| {
            right
                .1
                .total_cmp(&left.1)
                .then_with(|| left.0.selection_priority.cmp(&right.0.selection_priority))
                .then_with(|| left.0.name.cmp(&right.0.name))
        });
        let (winner, _) = scored[0];

        if !self.policy.is_allowed(&winner.name) {
            // Filtering above should make this unreachable; degrade
            // rather than crash if the policy and catalog disagree.
            warn!("Winner {} failed the restriction re-check", winner.name);
            return self.fall_back(mode, complexity, estimated_tokens, file_count);
        }

        let mut notes = Vec::new();
        if winner.preferred_modes.contains(&mode) {
            notes.push("preferred for mode");
        }
        if estimated_tokens >= self.thresholds.high_tokens {
            notes.push("large context");
        }
        let suffix = if notes.is_empty() {
            String::new()
        } else {
            format!("; {}", notes.join("; "))
        };

        Selection {
            model: winner.name.clone(),
            reasoning: format!(
                "Selected for: mode={mode}, complexity={complexity}, \
                 ~{estimated_tokens} tokens, {file_count} files{suffix}"
            ),
            complexity,
            estimated_tokens,
        }
    }

    /// Classifies a task into a complexity tier.
    pub fn classify(&self, mode: Mode, estimated_tokens: usize, file_count: usize) -> Complexity {
        if file_count >= self.thresholds.high_file_count
            || estimated_tokens >= self.thresholds.high_tokens
            || matches!(mode, Mode::Think | Mode::Analyze)
        {
            Complexity::High
        } else if file_count >= self.thresholds.medium_file_count
            || estimated_tokens >= self.thresholds.medium_tokens
            || matches!(
                mode,
                Mode::Debug | Mode::Review | Mode::Plan | Mode::Refactor | Mode::Test
            )
        {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    /// Walks the fallback chain, returning the first allowed model or
    /// the hard-coded last resort.
    fn fall_back(
        &self,
        mode: Mode,
        complexity: Complexity,
        estimated_tokens: usize,
        file_count: usize,
    ) -> Selection {
        let model = FALLBACK_MODELS
            .iter()
            .find(|name| self.policy.is_allowed(name))
            .copied()
            .unwrap_or(LAST_RESORT_MODEL);
        warn!("No allowed models for mode={mode}; falling back to {model}");

        Selection {
            model: model.to_owned(),
            reasoning: format!(
                "No allowed models available; falling back to {model} \
                 (mode={mode}, complexity={complexity}, \
                 ~{estimated_tokens} tokens, {file_count} files)"
            ),
            complexity,
            estimated_tokens,
        }
    }
}

/// Computes the additive score for one candidate.
fn score_model(
    descriptor: &ModelDescriptor,
    mode: Mode,
    complexity: Complexity,
    estimated_tokens: usize,
) -> f64 {
    let mut score = 0.0;

    if descriptor.preferred_modes.contains(&mode) {
        score += 3.0;
    } else if descriptor.suitable_modes.contains(&mode) {
        score += 1.0;
    }

    if complexity == descriptor.complexity_optimal {
        score += 2.0;
    } else if complexity >= descriptor.complexity_min {
        score += 1.0;
    }

    // Hard penalty: the model cannot serve the request at all.
    if estimated_tokens > descriptor.context_limit {
        score -= 5.0;
    }

    // Premium models are wasted on tiny tasks.
    if estimated_tokens < descriptor.context_limit / 10 && descriptor.cost == CostTier::VeryHigh {
        score -= 1.0;
    }

    score += (10.0 - f64::from(descriptor.selection_priority)) * 0.5;

    if complexity == Complexity::Low && descriptor.speed == SpeedTier::VeryFast {
        score += 1.0;
    }

    score
}
