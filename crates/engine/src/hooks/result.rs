//! Hook results and the run report

use hookgate_core::RelPath;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Category of a problem found by a hook
///
/// Variants are ordered by severity, the most severe last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// Formatting issue that a fixer can correct
    ContentWarning,
    /// The file does not parse
    SyntaxError,
    /// Case-conflicting paths or unresolved merge markers
    NameConflict,
}

impl FindingKind {
    /// Fatal findings need manual resolution and lock the file against fixers
    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::ContentWarning)
    }

    /// Short label shown in reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ContentWarning => "content warning",
            Self::SyntaxError => "syntax error",
            Self::NameConflict => "name conflict",
        }
    }

    /// What the user has to do about findings of this kind
    #[must_use]
    pub fn resolution(self) -> &'static str {
        match self {
            Self::ContentWarning => {
                "Files were modified by the hooks. Review the changes, stage them and commit again."
            }
            Self::SyntaxError => {
                "Some files do not parse. Fix the reported syntax errors and commit again."
            }
            Self::NameConflict => {
                "Some files need manual resolution. Resolve the reported conflicts and commit again."
            }
        }
    }
}

/// One problem reported by a hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<RelPath>,
    /// 1-based line number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Finding {
    /// A finding attached to a file
    pub fn new(kind: FindingKind, path: &RelPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.clone()),
            line: None,
            message: message.into(),
        }
    }

    /// Attach a 1-based line number
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn syntax(path: &RelPath, message: impl Into<String>) -> Self {
        Self::new(FindingKind::SyntaxError, path, message)
    }

    pub fn warning(path: &RelPath, message: impl Into<String>) -> Self {
        Self::new(FindingKind::ContentWarning, path, message)
    }

    pub fn conflict(path: &RelPath, message: impl Into<String>) -> Self {
        Self::new(FindingKind::NameConflict, path, message)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{path}:{line}: {}", self.message),
            (Some(path), None) => write!(f, "{path}: {}", self.message),
            (None, _) => f.write_str(&self.message),
        }
    }
}

/// Final state of one hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookOutcome {
    Pass,
    Fail,
    /// Files were modified; the commit must be re-staged
    Fixed,
}

impl HookOutcome {
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

/// Result of running one hook
#[derive(Debug, Clone, Serialize)]
pub struct HookResult {
    pub hook_id: String,
    pub name: String,
    pub outcome: HookOutcome,
    pub modified_files: BTreeSet<RelPath>,
    pub findings: Vec<Finding>,
    /// Number of files the hook was applied to
    pub files_checked: usize,
    /// Combined stdout/stderr of external tools
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(skip)]
    pub duration: Duration,
}

impl HookResult {
    /// A passing result for a hook that had nothing to look at
    #[must_use]
    pub fn skipped(hook_id: &str, name: &str) -> Self {
        Self {
            hook_id: hook_id.to_string(),
            name: name.to_string(),
            outcome: HookOutcome::Pass,
            modified_files: BTreeSet::new(),
            findings: Vec::new(),
            files_checked: 0,
            output: String::new(),
            duration: Duration::ZERO,
        }
    }

    /// Most severe finding kind, if any
    #[must_use]
    pub fn most_severe(&self) -> Option<FindingKind> {
        self.findings.iter().map(|f| f.kind).max()
    }
}

/// Results of one pipeline run, in declaration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<HookResult>,
}

impl RunReport {
    /// Whether every hook passed without modifying anything
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_pass())
    }

    /// Process exit code for this run: 0 on success, 1 otherwise
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// Every file modified by any hook
    #[must_use]
    pub fn modified_files(&self) -> BTreeSet<&RelPath> {
        self.results
            .iter()
            .flat_map(|r| r.modified_files.iter())
            .collect()
    }

    /// Most severe finding kind across the run
    #[must_use]
    pub fn most_severe(&self) -> Option<FindingKind> {
        self.results.iter().filter_map(HookResult::most_severe).max()
    }

    /// Closing sentence of the report
    #[must_use]
    pub fn resolution(&self) -> &'static str {
        if self.passed() {
            return "All hooks passed.";
        }
        match self.most_severe() {
            Some(kind) => kind.resolution(),
            None => "A hook failed. Read its output above, fix the problem and commit again.",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn rel(path: &str) -> RelPath {
        RelPath::from_slash(path).unwrap()
    }

    fn result(outcome: HookOutcome, findings: Vec<Finding>) -> HookResult {
        HookResult {
            outcome,
            findings,
            ..HookResult::skipped("hook", "hook")
        }
    }

    #[test]
    fn test_severity_order() {
        assert!(FindingKind::ContentWarning < FindingKind::SyntaxError);
        assert!(FindingKind::SyntaxError < FindingKind::NameConflict);
        assert!(!FindingKind::ContentWarning.is_fatal());
        assert!(FindingKind::SyntaxError.is_fatal());
        assert!(FindingKind::NameConflict.is_fatal());
    }

    #[test]
    fn test_finding_display() {
        let path = rel("a/b.json");
        assert_eq!(
            Finding::syntax(&path, "Expecting value").at_line(3).to_string(),
            "a/b.json:3: Expecting value"
        );
        assert_eq!(
            Finding::warning(&path, "Fixing").to_string(),
            "a/b.json: Fixing"
        );
    }

    #[test]
    fn test_empty_report_passes() {
        let report = RunReport::default();
        assert!(report.passed());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.resolution(), "All hooks passed.");
    }

    #[test]
    fn test_fixed_is_not_a_pass() {
        let path = rel("x.txt");
        let mut fixed = result(HookOutcome::Fixed, vec![Finding::warning(&path, "Fixing x.txt")]);
        fixed.modified_files.insert(path.clone());

        let report = RunReport {
            results: vec![result(HookOutcome::Pass, Vec::new()), fixed],
        };
        assert!(!report.passed());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.modified_files().into_iter().collect::<Vec<_>>(), vec![&path]);
        assert_eq!(report.most_severe(), Some(FindingKind::ContentWarning));
    }

    #[test]
    fn test_resolution_follows_most_severe() {
        let path = rel("x.py");
        let report = RunReport {
            results: vec![
                result(HookOutcome::Fixed, vec![Finding::warning(&path, "Fixing")]),
                result(HookOutcome::Fail, vec![Finding::conflict(&path, "Merge conflict")]),
                result(HookOutcome::Fail, vec![Finding::syntax(&path, "invalid syntax")]),
            ],
        };
        assert_eq!(report.resolution(), FindingKind::NameConflict.resolution());
    }

    #[test]
    fn test_failure_without_findings() {
        let report = RunReport {
            results: vec![result(HookOutcome::Fail, Vec::new())],
        };
        assert!(report.resolution().starts_with("A hook failed"));
    }
}
