//! Status markers for command output

use hookgate_engine::HookOutcome;
use std::fmt;

/// Status icon type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Success,
    Warning,
    Error,
    Info,
}

impl StatusIcon {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "[OK]",
            Self::Warning => "[!]",
            Self::Error => "[X]",
            Self::Info => "[i]",
        }
    }

    /// Marker for a hook outcome
    #[must_use]
    pub fn for_outcome(outcome: HookOutcome) -> Self {
        match outcome {
            HookOutcome::Pass => Self::Success,
            HookOutcome::Fixed => Self::Warning,
            HookOutcome::Fail => Self::Error,
        }
    }
}

impl fmt::Display for StatusIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_icons() {
        assert_eq!(StatusIcon::for_outcome(HookOutcome::Pass), StatusIcon::Success);
        assert_eq!(StatusIcon::for_outcome(HookOutcome::Fixed), StatusIcon::Warning);
        assert_eq!(StatusIcon::for_outcome(HookOutcome::Fail), StatusIcon::Error);
        assert_eq!(StatusIcon::Error.to_string(), "[X]");
    }
}
