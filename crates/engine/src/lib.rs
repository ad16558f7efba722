//! # Hookgate Engine
//!
//! Core library for the hookgate pre-commit pipeline.
//!
//! - **FileSet**: the files under consideration for one run, with write-through updates
//! - **Git**: repository discovery, staged and tracked file listing
//! - **Filters**: `files`/`exclude` regexes and file type tags
//! - **Hooks**: capability-typed handlers, the registry resolving declarations to
//!   handlers, external tool execution and the sequential pipeline runner
//! - **Builtin**: the bundled fixers and validators

pub mod builtin;
pub mod fileset;
pub mod filter;
pub mod git;
pub mod hooks;

// Re-export path types from core
pub use hookgate_core::path::{AbsPath, RelPath};

// Re-export error types from core
pub use hookgate_core::{Error, Result};

// Re-export commonly used types
pub use fileset::{FileRef, FileSet};
pub use filter::FileFilter;
pub use hooks::{
    Capability, Finding, FindingKind, HookOutcome, HookRegistry, HookResult, PipelineRunner,
    ResolvedHook, RunReport,
};
