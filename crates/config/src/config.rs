//! Pipeline configuration
//!
//! This module handles loading and validating `.pre-commit-config.yaml`.
//! The configuration is loaded once per invocation and never mutated afterwards;
//! it is handed to the engine by reference.

use crate::Result;
use hookgate_core::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up at the repository root
pub const DEFAULT_CONFIG_FILE: &str = ".pre-commit-config.yaml";

/// Repository whose hooks ship with hookgate
pub const BUILTIN_HOOKS_REPO: &str = "https://github.com/pre-commit/pre-commit-hooks";

/// Starter configuration printed by `hookgate sample-config`
pub const SAMPLE_CONFIG: &str = r"default_language_version:
  python: python3.8
repos:
  - repo: https://github.com/psf/black
    rev: '22.3.0'
    hooks:
      - id: black
  - repo: https://github.com/pycqa/isort
    rev: '5.10.1'
    hooks:
      - id: isort
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v4.3.0
    hooks:
      # autocrlf can result in files getting committed with CRLF line endings
      - id: mixed-line-ending
        args:
          - --fix=lf
      - id: trailing-whitespace
      - id: end-of-file-fixer
      - id: check-ast
      - id: check-json
      - id: pretty-format-json
        args:
          - --autofix
          - --indent=4
          - --no-sort-keys
      - id: check-toml
      - id: check-yaml
      - id: check-case-conflict
      - id: check-merge-conflict
";

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tool versions to prefer (e.g. `python: python3.8`)
    #[serde(default)]
    pub default_language_version: IndexMap<String, String>,

    /// Stop after the first hook that does not pass
    #[serde(default)]
    pub fail_fast: bool,

    /// Global include regex applied before any hook filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Global exclude regex applied before any hook filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Hook repositories in declaration order
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
}

/// One `repos:` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository URL, or `local` / `meta`
    pub repo: String,

    /// Pinned revision (tag or commit), required for remote repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Hooks declared from this repository
    #[serde(default)]
    pub hooks: Vec<HookDeclaration>,
}

impl RepoConfig {
    /// The pinned source every hook of this repository resolves against
    #[must_use]
    pub fn source(&self) -> HookSource {
        HookSource::new(self.repo.clone(), self.rev.clone())
    }
}

/// A single hook declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDeclaration {
    /// Hook identifier, resolved against the declaring repository
    pub id: String,

    /// Display name (defaults to the id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Arguments passed to the hook, in order
    #[serde(default)]
    pub args: Vec<String>,

    /// Include regex matched against `/`-separated repository paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Exclude regex matched against `/`-separated repository paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// File type tags that must all match (e.g. `python`, `json`, `text`)
    #[serde(default)]
    pub types: Vec<String>,

    /// Command line for local hooks, or a program override for remote ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Language of an external hook (informational, `system` is assumed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Append the matched file names to the command line
    #[serde(default = "default_pass_filenames")]
    pub pass_filenames: bool,

    /// Run even when no file matches
    #[serde(default)]
    pub always_run: bool,
}

impl HookDeclaration {
    /// Name shown in reports
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

fn default_pass_filenames() -> bool {
    true
}

/// Where a hook comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The bundled pre-commit-hooks repository
    Builtin,
    /// `repo: local`, the command comes from `entry`
    Local,
    /// `repo: meta`
    Meta,
    /// Any other remote repository, resolved to a tool on PATH
    Remote,
}

/// A repository reference pinned to a revision
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSource {
    url: String,
    rev: Option<String>,
}

impl HookSource {
    /// Create a source from a repository URL and its pinned revision
    #[must_use]
    pub fn new(url: String, rev: Option<String>) -> Self {
        Self { url, rev }
    }

    /// Repository URL as declared
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pinned revision, absent for `local` and `meta`
    #[must_use]
    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }

    /// Classify the repository
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self.url.as_str() {
            "local" => SourceKind::Local,
            "meta" => SourceKind::Meta,
            url if normalize_url(url) == BUILTIN_HOOKS_REPO => SourceKind::Builtin,
            _ => SourceKind::Remote,
        }
    }
}

impl std::fmt::Display for HookSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rev {
            Some(rev) => write!(f, "{}@{}", self.url, rev),
            None => f.write_str(&self.url),
        }
    }
}

fn normalize_url(url: &str) -> &str {
    let url = url.trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url)
}

impl PipelineConfig {
    /// Load configuration from a file and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, is not valid YAML,
    /// or fails validation (see [`PipelineConfig::validate`]).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::Config(format!(
                "{} not found. Create one with `hookgate sample-config > {}`",
                path.display(),
                DEFAULT_CONFIG_FILE
            )));
        }

        let content = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml_str(&content).map_err(|e| match e {
            Error::ConfigParse { message, .. } => Error::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            repos = config.repos.len(),
            hooks = config.hook_count(),
            "Loaded pipeline configuration"
        );

        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or validation fails.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
            path: DEFAULT_CONFIG_FILE.into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate repository pins, hook declarations and file filters
    ///
    /// # Errors
    ///
    /// Returns an error if a remote repository has no revision, a hook id is empty,
    /// a local hook has no entry, or a filter regex does not compile.
    pub fn validate(&self) -> Result<()> {
        check_regex("files", self.files.as_deref())?;
        check_regex("exclude", self.exclude.as_deref())?;

        for repo in &self.repos {
            let source = repo.source();

            if repo.repo.trim().is_empty() {
                return Err(Error::Config("Repository URL cannot be empty".to_string()));
            }

            match source.kind() {
                SourceKind::Builtin | SourceKind::Remote => match source.rev() {
                    None => {
                        return Err(Error::Config(format!(
                            "Repository '{}' must pin a revision with 'rev'",
                            repo.repo
                        )));
                    }
                    Some(rev) if rev.trim().is_empty() || rev.contains(char::is_whitespace) => {
                        return Err(Error::Config(format!(
                            "Repository '{}' has invalid revision '{}'",
                            repo.repo, rev
                        )));
                    }
                    Some(_) => {}
                },
                SourceKind::Local | SourceKind::Meta => {
                    if let Some(rev) = source.rev() {
                        tracing::warn!(
                            repo = %repo.repo,
                            rev = %rev,
                            "Revision is ignored for this repository"
                        );
                    }
                }
            }

            for hook in &repo.hooks {
                if hook.id.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "Hook id cannot be empty (repository '{}')",
                        repo.repo
                    )));
                }

                if source.kind() == SourceKind::Local
                    && hook.entry.as_deref().is_none_or(|e| e.trim().is_empty())
                {
                    return Err(Error::Config(format!(
                        "Local hook '{}' must have an 'entry'",
                        hook.id
                    )));
                }

                check_regex(&format!("{}.files", hook.id), hook.files.as_deref())?;
                check_regex(&format!("{}.exclude", hook.id), hook.exclude.as_deref())?;
            }
        }

        Ok(())
    }

    /// Iterate over every hook declaration in order, paired with its source
    pub fn declarations(&self) -> impl Iterator<Item = (HookSource, &HookDeclaration)> {
        self.repos
            .iter()
            .flat_map(|repo| repo.hooks.iter().map(move |hook| (repo.source(), hook)))
    }

    /// Total number of declared hooks
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.repos.iter().map(|r| r.hooks.len()).sum()
    }

    /// Preferred version for a tool from `default_language_version`
    #[must_use]
    pub fn language_version(&self, tool: &str) -> Option<&str> {
        self.default_language_version.get(tool).map(String::as_str)
    }
}

fn check_regex(field: &str, pattern: Option<&str>) -> Result<()> {
    if let Some(pattern) = pattern {
        regex::Regex::new(pattern)
            .map_err(|e| Error::Config(format!("Invalid regex in '{field}': {e}")))?;
    }
    Ok(())
}
