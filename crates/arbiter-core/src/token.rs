//! Approximate token counting.
//!
//! The gateway never tokenizes exactly; routing and file budgets only
//! need a stable rough estimate, and callers must not assume otherwise.

/// Average characters per token assumed by the estimator.
pub const CHARS_PER_TOKEN: usize = 4;

/// Fraction of a model's context window reserved for its response.
const RESPONSE_RESERVE: f64 = 0.3;

/// Estimates the token count of a piece of text.
pub fn estimate_str(text: &str) -> usize {
    text.len() / CHARS_PER_TOKEN
}

/// Token budget available for embedding file content, given a model's
/// context limit. Reserves a share of the window for the response.
pub fn file_token_budget(context_limit: usize) -> usize {
    ((context_limit as f64) * (1.0 - RESPONSE_RESERVE)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_matches_quarter_length() {
        assert_eq!(estimate_str(""), 0);
        assert_eq!(estimate_str("abcd"), 1);
        assert_eq!(estimate_str(&"x".repeat(200_000)), 50_000);
    }

    #[test]
    fn test_budget_reserves_response_share() {
        assert_eq!(file_token_budget(100_000), 70_000);
        assert_eq!(file_token_budget(0), 0);
    }
}
