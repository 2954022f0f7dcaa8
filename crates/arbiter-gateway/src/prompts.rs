//! Per-mode system prompts.

use arbiter_core::Mode;

/// The system prompt framing a request of the given mode.
pub fn system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::Chat => {
            "You are a helpful development assistant. Give clear, direct answers \
             and working code when asked."
        }
        Mode::Analyze => {
            "You are a senior engineer analyzing code. Explain structure, data flow, \
             and notable design decisions. Point out risks and smells with file and \
             line references where possible."
        }
        Mode::Review => {
            "You are performing a code review. Identify bugs, security issues, and \
             maintainability problems in order of severity. Be specific and suggest \
             concrete fixes."
        }
        Mode::Debug => {
            "You are debugging a problem. Reason from the evidence given, state the \
             most likely root cause first, and propose the smallest fix that addresses \
             it. Name what evidence would confirm or rule out your hypothesis."
        }
        Mode::Plan => {
            "You are planning an implementation. Break the work into ordered, \
             verifiable steps with clear boundaries. Note dependencies between steps \
             and any decisions that need to be made first."
        }
        Mode::Test => {
            "You are writing tests. Cover the important behaviors and edge cases with \
             clear, isolated test cases. Follow the conventions visible in the \
             provided code."
        }
        Mode::Refactor => {
            "You are refactoring code. Preserve behavior exactly while improving \
             structure and readability. Call out any change that is not \
             behavior-preserving."
        }
        Mode::Think => {
            "Think through the problem deeply before answering. Consider multiple \
             approaches, weigh their trade-offs explicitly, and explain the reasoning \
             behind your conclusion."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_a_prompt() {
        for mode in Mode::all() {
            assert!(!system_prompt(mode).is_empty());
        }
    }
}
