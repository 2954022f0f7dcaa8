//! Task modes.
//!
//! A mode is a coarse task category that drives the system prompt, the
//! default temperature, and model scoring.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Operation mode for a task request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// General development discussion and Q&A.
    #[default]
    Chat,
    /// Code and architecture analysis.
    Analyze,
    /// Code review for bugs, security, and quality.
    Review,
    /// Debug issues and find root causes.
    Debug,
    /// Project planning and task breakdown.
    Plan,
    /// Generate comprehensive tests.
    Test,
    /// Suggest code improvements.
    Refactor,
    /// Deep reasoning for complex problems.
    Think,
}

impl Mode {
    /// All modes in declaration order.
    pub const fn all() -> [Self; 8] {
        [
            Self::Chat,
            Self::Analyze,
            Self::Review,
            Self::Debug,
            Self::Plan,
            Self::Test,
            Self::Refactor,
            Self::Think,
        ]
    }

    /// Default sampling temperature when the caller does not supply one.
    pub const fn default_temperature(self) -> f32 {
        match self {
            Self::Chat => 0.7,
            Self::Analyze | Self::Review => 0.3,
            Self::Debug => 0.2,
            Self::Plan => 0.5,
            Self::Test | Self::Refactor => 0.4,
            Self::Think => 0.8,
        }
    }

    /// One-line description used in help output.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Chat => "General development discussion and Q&A",
            Self::Analyze => "Code and architecture analysis",
            Self::Review => "Code review for bugs, security, and quality",
            Self::Debug => "Debug issues and find root causes",
            Self::Plan => "Project planning and task breakdown",
            Self::Test => "Generate comprehensive tests",
            Self::Refactor => "Suggest code improvements",
            Self::Think => "Deep reasoning for complex problems",
        }
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Analyze => "analyze",
            Self::Review => "review",
            Self::Debug => "debug",
            Self::Plan => "plan",
            Self::Test => "test",
            Self::Refactor => "refactor",
            Self::Think => "think",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "analyze" => Ok(Self::Analyze),
            "review" => Ok(Self::Review),
            "debug" => Ok(Self::Debug),
            "plan" => Ok(Self::Plan),
            "test" => Ok(Self::Test),
            "refactor" => Ok(Self::Refactor),
            "think" => Ok(Self::Think),
            other => Err(Error::Validation(format!(
                "Unknown mode '{other}'. Valid modes: chat, analyze, review, debug, plan, test, refactor, think"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip() {
        for mode in Mode::all() {
            let parsed: Mode = mode.as_str().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_mode_parse_is_case_insensitive() {
        let mode: Mode = " Analyze ".parse().unwrap();
        assert_eq!(mode, Mode::Analyze);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = "summarize".parse::<Mode>();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_default_temperatures_in_range() {
        for mode in Mode::all() {
            let temperature = mode.default_temperature();
            assert!((0.0..=1.0).contains(&temperature), "{mode}: {temperature}");
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Mode::Refactor).unwrap();
        assert_eq!(json, "\"refactor\"");
    }
}
