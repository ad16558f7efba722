//! Hook resolution
//!
//! The registry maps hook ids to capability-typed constructors. Every
//! declaration is resolved to a [`ResolvedHook`] before anything runs, so an
//! unknown hook, a bad argument or a missing tool aborts the run up front.

use super::external::ExternalCommand;
use super::handler::{Capability, Handler};
use crate::builtin::{BUILTINS, BuildContext, BuiltinSpec};
use crate::filter::FileFilter;
use hookgate_config::{HookDeclaration, HookSource, PipelineConfig, SourceKind};
use hookgate_core::{Error, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Tools known to operate on Python sources, used when a remote hook declares no types
const PYTHON_TOOLS: &[&str] = &[
    "autopep8", "bandit", "black", "flake8", "isort", "mypy", "pylint", "pyupgrade", "ruff",
];

const PYTHON_TYPES: &[&str] = &["python"];
const NO_TYPES: &[&str] = &[];

/// A declaration bound to its handler, ready to run
#[derive(Debug)]
pub struct ResolvedHook {
    pub id: String,
    /// Display name
    pub name: String,
    pub source: HookSource,
    pub args: Vec<String>,
    /// Per-hook file selection (declared or default types)
    pub filter: FileFilter,
    pub always_run: bool,
    pub handler: Handler,
}

impl ResolvedHook {
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.handler.capability()
    }
}

/// Registry of hook constructors
pub struct HookRegistry {
    builtins: IndexMap<&'static str, &'static BuiltinSpec>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Registry populated with every bundled hook
    #[must_use]
    pub fn new() -> Self {
        Self {
            builtins: BUILTINS.iter().map(|b| (b.id, b)).collect(),
        }
    }

    /// Look up a bundled hook
    #[must_use]
    pub fn builtin(&self, id: &str) -> Option<&'static BuiltinSpec> {
        self.builtins.get(id).copied()
    }

    /// Ids of the bundled hooks, in registration order
    pub fn builtin_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.keys().copied()
    }

    /// Resolve every declaration of `config`, in declaration order
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure: an unknown bundled hook, invalid
    /// arguments, an unknown file type, an unsupported repository or a tool
    /// that is not installed.
    #[tracing::instrument(skip(self, config), fields(hooks = config.hook_count()))]
    pub fn resolve(&self, config: &PipelineConfig, root: &Path) -> Result<Vec<ResolvedHook>> {
        config
            .declarations()
            .map(|(source, decl)| self.resolve_one(config, source, decl, root))
            .collect()
    }

    fn resolve_one(
        &self,
        config: &PipelineConfig,
        source: HookSource,
        decl: &HookDeclaration,
        root: &Path,
    ) -> Result<ResolvedHook> {
        let unresolved = |reason: String| Error::HookResolution {
            hook_id: decl.id.clone(),
            repo: source.to_string(),
            reason,
        };

        let (handler, default_types): (Handler, &[&str]) = match source.kind() {
            SourceKind::Builtin => {
                let builtin = self.builtin(&decl.id).ok_or_else(|| {
                    unresolved("no such hook in the bundled repository".to_string())
                })?;
                let ctx = BuildContext {
                    hook_id: &decl.id,
                    args: &decl.args,
                    config,
                };
                ((builtin.build)(&ctx)?, builtin.default_types)
            }
            SourceKind::Local => {
                let entry = decl.entry.as_deref().unwrap_or_default();
                let (program, mut args) = split_entry(entry).map_err(&unresolved)?;
                args.extend(decl.args.iter().cloned());
                let program = locate(&program, root).map_err(&unresolved)?;
                (
                    Handler::External(ExternalCommand::new(program, args, decl.pass_filenames)),
                    NO_TYPES,
                )
            }
            SourceKind::Remote => {
                let entry = decl.entry.as_deref().unwrap_or(&decl.id);
                let (program, mut args) = split_entry(entry).map_err(&unresolved)?;
                args.extend(decl.args.iter().cloned());
                let types = if PYTHON_TOOLS.contains(&program.as_str()) {
                    PYTHON_TYPES
                } else {
                    NO_TYPES
                };
                let program = locate(&program, root).map_err(&unresolved)?;
                (
                    Handler::External(ExternalCommand::new(program, args, decl.pass_filenames)),
                    types,
                )
            }
            SourceKind::Meta => {
                return Err(unresolved("meta hooks are not supported".to_string()));
            }
        };

        let types: Vec<String> = if decl.types.is_empty() {
            default_types.iter().map(ToString::to_string).collect()
        } else {
            decl.types.clone()
        };
        let filter = FileFilter::new(decl.files.as_deref(), decl.exclude.as_deref(), &types)
            .map_err(|e| Error::Config(format!("Hook '{}': {e}", decl.id)))?;

        tracing::debug!(
            hook = %decl.id,
            capability = %handler.capability(),
            source = %source,
            "Resolved hook"
        );

        Ok(ResolvedHook {
            id: decl.id.clone(),
            name: decl.display_name().to_string(),
            source,
            args: decl.args.clone(),
            filter,
            always_run: decl.always_run,
            handler,
        })
    }
}

/// Split an entry into program and leading arguments
fn split_entry(entry: &str) -> std::result::Result<(String, Vec<String>), String> {
    let mut parts = shell_words::split(entry)
        .map_err(|e| format!("cannot parse entry '{entry}': {e}"))?
        .into_iter();
    let program = parts
        .next()
        .ok_or_else(|| "entry is empty".to_string())?;
    Ok((program, parts.collect()))
}

/// Find the program: paths are taken relative to the repository root, bare names are looked up on `PATH`
fn locate(program: &str, root: &Path) -> std::result::Result<PathBuf, String> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        let full = root.join(path);
        return if full.is_file() {
            Ok(full)
        } else {
            Err(format!("'{}' does not exist", full.display()))
        };
    }

    which::which(program).map_err(|_| format!("'{program}' not found on PATH"))
}
