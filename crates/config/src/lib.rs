//! Configuration management for hookgate
//!
//! This crate handles:
//! - Loading `.pre-commit-config.yaml` into an immutable [`PipelineConfig`]
//! - Validating repository pins, hook declarations and file filters
//! - Logging initialization

pub mod config;
pub mod logging;

// Re-export error types from core
pub use hookgate_core::{Error, Result};

// Re-export main types
pub use config::{
    BUILTIN_HOOKS_REPO, DEFAULT_CONFIG_FILE, HookDeclaration, HookSource, PipelineConfig,
    RepoConfig, SAMPLE_CONFIG, SourceKind,
};
