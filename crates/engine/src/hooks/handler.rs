//! Capability-typed hook handlers
//!
//! Every declared hook resolves to exactly one of three capabilities before
//! the pipeline starts. Validators inspect a batch of files, fixers rewrite one
//! file at a time, external commands are opaque child processes.

use super::external::ExternalCommand;
use super::result::Finding;
use crate::fileset::FileRef;
use hookgate_core::{RelPath, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// What a handler is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Validator,
    Fixer,
    External,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Validator => "validator",
            Self::Fixer => "fixer",
            Self::External => "external",
        })
    }
}

/// Repository-wide information a validator may need beyond file content
pub struct ValidationContext<'a> {
    /// Repository root
    pub root: &'a Path,
    /// Every path known to the repository (tracked files plus the run's files)
    pub known_paths: &'a BTreeSet<RelPath>,
}

/// Inspects files and reports findings without modifying anything
pub trait Validator: Send + Sync {
    /// Check a batch of files
    ///
    /// # Errors
    ///
    /// Returns an error only for operational failures (e.g. a tool that cannot
    /// be started); problems in the files are reported as findings.
    fn validate(&self, files: &[FileRef<'_>], ctx: &ValidationContext<'_>)
    -> Result<Vec<Finding>>;
}

/// Result of applying a fixer to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// Content already conforms
    Unchanged,
    /// Replacement content
    Fixed(Vec<u8>),
    /// The file violates the rule and the fixer was told not to modify it
    Rejected(Finding),
}

/// Rewrites a single file
pub trait Fixer: Send + Sync {
    /// Compute the fixed content of `file`
    ///
    /// # Errors
    ///
    /// Returns an error only for operational failures.
    fn fix(&self, file: FileRef<'_>) -> Result<FixOutcome>;
}

/// A resolved hook implementation
pub enum Handler {
    Validator(Box<dyn Validator>),
    Fixer(Box<dyn Fixer>),
    External(ExternalCommand),
}

impl Handler {
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Self::Validator(_) => Capability::Validator,
            Self::Fixer(_) => Capability::Fixer,
            Self::External(_) => Capability::External,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::External(cmd) => f.debug_tuple("External").field(cmd).finish(),
            other => write!(f, "{}", other.capability()),
        }
    }
}
