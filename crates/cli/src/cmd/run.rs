//! Run command implementation
//!
//! Runs the configured hooks over the staged files, every tracked file, or
//! an explicit list of files.

use anyhow::Context;
use clap::Args;
use hookgate_core::path::AbsPath;
use hookgate_engine::git::{self, FileProvider};
use hookgate_engine::{FileFilter, FileSet, HookRegistry, PipelineRunner, RelPath, RunReport};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui::{self, Palette};

/// Run the hook pipeline
#[derive(Debug, Default, Args)]
pub struct RunCommand {
    /// Run on every tracked file instead of the staged ones
    #[arg(short, long, conflicts_with = "files")]
    pub all_files: bool,

    /// Run on these files only
    #[arg(long, value_name = "PATH", num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Run only the hook with this id
    #[arg(long, value_name = "ID")]
    pub hook: Option<String>,

    /// Print a diff of every change hooks made when the run does not pass
    #[arg(long)]
    pub show_diff_on_failure: bool,
}

impl Command for RunCommand {
    type Output = RunReport;

    fn execute(&self, context: &RuntimeContext) -> Result<RunReport> {
        let palette = Palette::for_stdout();
        let (report, files) = self.run_pipeline(context)?;

        let mut stdout = std::io::stdout().lock();
        ui::render_report(&mut stdout, &report, palette)?;
        if self.show_diff_on_failure && !report.passed() {
            ui::render_changes(&mut stdout, &files, palette)?;
        }
        stdout.flush()?;

        Ok(report)
    }
}

impl RunCommand {
    /// Resolve hooks, collect files and run the pipeline without printing anything
    ///
    /// Returns the report and the file set in its final state.
    pub fn run_pipeline(&self, context: &RuntimeContext) -> Result<(RunReport, FileSet)> {
        let root = context.repo_root();
        let config = &context.config;

        let mut hooks = HookRegistry::new()
            .resolve(config, root)
            .context("Failed to resolve hooks")?;
        if let Some(id) = &self.hook {
            hooks.retain(|hook| &hook.id == id);
            if hooks.is_empty() {
                return Err(CommandError::UnknownHook(id.clone()));
            }
        }

        let provider = git::provider_for(root);
        let tracked = provider.tracked().context("Failed to list repository files")?;
        let paths = if self.all_files {
            tracked.clone()
        } else if self.files.is_empty() {
            let staged = provider.staged().context("Failed to list staged files")?;
            warn_partially_staged(&staged, provider.as_ref())?;
            staged
        } else {
            explicit_paths(&self.files, root)?
        };

        let mut files = FileSet::load(root, paths)?;
        info!(files = files.len(), hooks = hooks.len(), "Running pipeline");

        let report = PipelineRunner::builder(&hooks)
            .fail_fast(config.fail_fast)
            .global_filter(FileFilter::global(config)?)
            .known_paths(tracked)
            .build()
            .run(&mut files)?;

        info!(
            passed = report.passed(),
            modified = report.modified_files().len(),
            "Pipeline finished"
        );
        Ok((report, files))
    }
}

/// Hooks read the working tree; warn about staged files with further unstaged edits
fn warn_partially_staged(staged: &[RelPath], provider: &dyn FileProvider) -> Result<()> {
    let unstaged = provider
        .unstaged()
        .context("Failed to compare the index with the working tree")?;
    for path in staged.iter().filter(|p| unstaged.contains(p)) {
        warn!(path = %path, "Partially staged, hooks check the working-tree content");
    }
    Ok(())
}

/// Convert user-provided paths (relative to the current directory) into repository paths
fn explicit_paths(files: &[PathBuf], root: &Path) -> Result<Vec<RelPath>> {
    let root_abs = AbsPath::new(root.to_path_buf())?;
    let cwd = std::env::current_dir()?;

    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        let joined = if file.is_absolute() {
            file.clone()
        } else {
            cwd.join(file)
        };
        let resolved = std::fs::canonicalize(&joined)
            .with_context(|| format!("Failed to resolve path: {}", joined.display()))?;

        let rel = AbsPath::new(resolved.clone())?
            .relative_to(&root_abs)
            .map_err(|_| CommandError::PathOutsideRepository {
                path: resolved,
                root: root.to_path_buf(),
            })?;
        paths.push(rel);
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}
