//! Common types shared across CLI commands

use anyhow::{Context, Result};
use hookgate_config::{DEFAULT_CONFIG_FILE, PipelineConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locate the working tree for `start`
///
/// Inside a git repository this is the top of the working tree; anywhere else
/// `start` itself is used and files are discovered by walking it.
///
/// # Errors
///
/// Returns an error if `start` does not exist.
pub fn resolve_repo_root(start: &Path) -> Result<PathBuf> {
    let start = std::fs::canonicalize(start)
        .with_context(|| format!("Failed to resolve directory: {}", start.display()))?;

    match hookgate_engine::git::discover_root(&start) {
        Ok(root) => Ok(std::fs::canonicalize(&root).unwrap_or(root)),
        Err(e) => {
            tracing::debug!(error = %e, "Not inside a git repository");
            Ok(start)
        }
    }
}

/// Configuration file for `repo_root`: the explicit path if given, the default file otherwise
#[must_use]
pub fn config_path(repo_root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| repo_root.join(DEFAULT_CONFIG_FILE), Path::to_path_buf)
}

/// Runtime context for CLI commands
///
/// The configuration is loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Loaded, validated configuration
    pub config: Arc<PipelineConfig>,
    repo_root: PathBuf,
    config_path: PathBuf,
}

impl RuntimeContext {
    /// Load the configuration and build a context
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or validated.
    pub fn load(repo_root: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = PipelineConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        Ok(Self::from_parts(Arc::new(config), repo_root, config_path))
    }

    /// Create a context from an already loaded configuration
    #[must_use]
    pub fn from_parts(config: Arc<PipelineConfig>, repo_root: PathBuf, config_path: PathBuf) -> Self {
        Self {
            config,
            repo_root,
            config_path,
        }
    }

    /// Working tree root; every hook runs here
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
