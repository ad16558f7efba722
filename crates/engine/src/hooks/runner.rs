//! Sequential pipeline runner

use super::external::ExternalCommand;
use super::handler::{FixOutcome, Fixer, Handler, ValidationContext, Validator};
use super::registry::ResolvedHook;
use super::result::{Finding, HookOutcome, HookResult, RunReport};
use crate::fileset::{FileRef, FileSet};
use crate::filter::FileFilter;
use hookgate_core::{RelPath, Result};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

/// Runs resolved hooks in declaration order over a [`FileSet`]
///
/// Hooks never run concurrently: fixers write through to the working tree and
/// later hooks (including external tools) must observe their output.
pub struct PipelineRunner<'a> {
    hooks: &'a [ResolvedHook],
    fail_fast: bool,
    global_filter: FileFilter,
    known_paths: BTreeSet<RelPath>,
}

/// Builder for [`PipelineRunner`]
pub struct PipelineRunnerBuilder<'a> {
    hooks: &'a [ResolvedHook],
    fail_fast: bool,
    global_filter: FileFilter,
    known_paths: BTreeSet<RelPath>,
}

impl<'a> PipelineRunnerBuilder<'a> {
    /// Create a new builder with required parameters
    ///
    /// This is typically called via [`PipelineRunner::builder`].
    pub fn new(hooks: &'a [ResolvedHook]) -> Self {
        Self {
            hooks,
            fail_fast: false,
            global_filter: FileFilter::default(),
            known_paths: BTreeSet::new(),
        }
    }

    /// Stop after the first hook that does not pass
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Top-level `files`/`exclude` filter applied before every hook filter
    #[must_use]
    pub fn global_filter(mut self, filter: FileFilter) -> Self {
        self.global_filter = filter;
        self
    }

    /// Paths known to the repository besides the run's files
    ///
    /// Used by validators that compare against the whole tree
    /// (`check-case-conflict`).
    #[must_use]
    pub fn known_paths<I: IntoIterator<Item = RelPath>>(mut self, paths: I) -> Self {
        self.known_paths.extend(paths);
        self
    }

    pub fn build(self) -> PipelineRunner<'a> {
        PipelineRunner {
            hooks: self.hooks,
            fail_fast: self.fail_fast,
            global_filter: self.global_filter,
            known_paths: self.known_paths,
        }
    }
}

/// Findings of the preflight validation pass
struct Preflight {
    /// Content generation the findings were computed against
    generation: u64,
    /// Findings per hook index
    findings: HashMap<usize, Vec<Finding>>,
}

impl<'a> PipelineRunner<'a> {
    /// Create a runner with default settings
    pub fn new(hooks: &'a [ResolvedHook]) -> Self {
        Self::builder(hooks).build()
    }

    /// Create a builder for configuring a `PipelineRunner`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let runner = PipelineRunner::builder(&hooks)
    ///     .fail_fast(config.fail_fast)
    ///     .global_filter(FileFilter::global(&config)?)
    ///     .known_paths(tracked)
    ///     .build();
    /// let report = runner.run(&mut files)?;
    /// ```
    pub fn builder(hooks: &'a [ResolvedHook]) -> PipelineRunnerBuilder<'a> {
        PipelineRunnerBuilder::new(hooks)
    }

    /// Run every hook over `files`
    ///
    /// # Errors
    ///
    /// Returns an error on operational failures: a file that cannot be written,
    /// an external tool that cannot be started. Problems found in files are
    /// reported through the [`RunReport`].
    #[tracing::instrument(skip_all, fields(hooks = self.hooks.len(), files = files.len()))]
    pub fn run(&self, files: &mut FileSet) -> Result<RunReport> {
        let mut known = self.known_paths.clone();
        known.extend(files.paths().cloned());

        let (preflight, mut locked) = self.preflight(files, &known)?;
        if !locked.is_empty() {
            tracing::info!(
                files = locked.len(),
                "Files with fatal findings will not be modified"
            );
        }

        let mut report = RunReport::default();

        for (index, hook) in self.hooks.iter().enumerate() {
            let _span = tracing::info_span!("hook", id = %hook.id).entered();
            let started = Instant::now();

            let selected = self.select(hook, files);
            if selected.is_empty() && !hook.always_run {
                tracing::debug!("No files to check, skipping");
                report.results.push(HookResult::skipped(&hook.id, &hook.name));
                continue;
            }

            let mut result = match &hook.handler {
                Handler::Validator(validator) => {
                    let cached = (files.generation() == preflight.generation)
                        .then(|| preflight.findings.get(&index).cloned())
                        .flatten();
                    let findings = match cached {
                        Some(findings) => findings,
                        None => Self::validate(validator.as_ref(), files, &selected, &known)?,
                    };
                    lock_fatal(&findings, &mut locked);
                    Self::validator_result(hook, selected.len(), findings)
                }
                Handler::Fixer(fixer) => {
                    Self::apply_fixer(hook, fixer.as_ref(), files, &selected, &mut locked)?
                }
                Handler::External(command) => {
                    Self::run_external(hook, command, files, &selected, &locked)?
                }
            };
            result.duration = started.elapsed();

            tracing::debug!(
                outcome = ?result.outcome,
                findings = result.findings.len(),
                modified = result.modified_files.len(),
                "Hook finished"
            );

            let stop = self.fail_fast && !result.outcome.is_pass();
            report.results.push(result);
            if stop {
                tracing::info!("Stopping after first failure (fail_fast)");
                break;
            }
        }

        Ok(report)
    }

    /// Files of the set the hook applies to, in path order
    fn select(&self, hook: &ResolvedHook, files: &FileSet) -> Vec<RelPath> {
        files
            .iter()
            .filter(|f| self.global_filter.matches(*f) && hook.filter.matches(*f))
            .map(|f| f.path.clone())
            .collect()
    }

    /// Run every validator over the initial content
    ///
    /// Returns the findings and the files that carry a fatal one.
    fn preflight(
        &self,
        files: &FileSet,
        known: &BTreeSet<RelPath>,
    ) -> Result<(Preflight, BTreeSet<RelPath>)> {
        let mut preflight = Preflight {
            generation: files.generation(),
            findings: HashMap::new(),
        };
        let mut locked = BTreeSet::new();

        for (index, hook) in self.hooks.iter().enumerate() {
            let Handler::Validator(validator) = &hook.handler else {
                continue;
            };
            let selected = self.select(hook, files);
            if selected.is_empty() && !hook.always_run {
                continue;
            }

            let findings = Self::validate(validator.as_ref(), files, &selected, known)?;
            lock_fatal(&findings, &mut locked);
            preflight.findings.insert(index, findings);
        }

        Ok((preflight, locked))
    }

    fn validate(
        validator: &dyn Validator,
        files: &FileSet,
        selected: &[RelPath],
        known: &BTreeSet<RelPath>,
    ) -> Result<Vec<Finding>> {
        let refs: Vec<FileRef<'_>> = selected.iter().filter_map(|p| files.get(p)).collect();
        let ctx = ValidationContext {
            root: files.root(),
            known_paths: known,
        };
        validator.validate(&refs, &ctx)
    }

    fn validator_result(hook: &ResolvedHook, checked: usize, findings: Vec<Finding>) -> HookResult {
        HookResult {
            outcome: if findings.is_empty() {
                HookOutcome::Pass
            } else {
                HookOutcome::Fail
            },
            findings,
            files_checked: checked,
            ..HookResult::skipped(&hook.id, &hook.name)
        }
    }

    fn apply_fixer(
        hook: &ResolvedHook,
        fixer: &dyn Fixer,
        files: &mut FileSet,
        selected: &[RelPath],
        locked: &mut BTreeSet<RelPath>,
    ) -> Result<HookResult> {
        let mut result = HookResult::skipped(&hook.id, &hook.name);
        let mut rejected = false;

        for path in selected {
            if locked.contains(path) {
                tracing::debug!(path = %path, "Not fixing file with fatal findings");
                continue;
            }

            let outcome = match files.get(path) {
                Some(file) => fixer.fix(file)?,
                None => continue,
            };
            result.files_checked += 1;

            match outcome {
                FixOutcome::Unchanged => {}
                FixOutcome::Fixed(content) => {
                    if files.replace(path, content)? {
                        tracing::debug!(path = %path, "Fixed file");
                        result.modified_files.insert(path.clone());
                        result.findings.push(Finding::warning(path, "Fixed"));
                    }
                }
                FixOutcome::Rejected(finding) => {
                    rejected = true;
                    if finding.kind.is_fatal() {
                        locked.insert(path.clone());
                    }
                    result.findings.push(finding);
                }
            }
        }

        result.outcome = if rejected {
            HookOutcome::Fail
        } else if result.modified_files.is_empty() {
            HookOutcome::Pass
        } else {
            HookOutcome::Fixed
        };
        Ok(result)
    }

    fn run_external(
        hook: &ResolvedHook,
        command: &ExternalCommand,
        files: &mut FileSet,
        selected: &[RelPath],
        locked: &BTreeSet<RelPath>,
    ) -> Result<HookResult> {
        let mut result = HookResult::skipped(&hook.id, &hook.name);

        let targets: Vec<RelPath> = selected
            .iter()
            .filter(|p| !locked.contains(*p))
            .cloned()
            .collect();
        if targets.is_empty() && !hook.always_run {
            tracing::debug!("Every selected file is locked, skipping");
            return Ok(result);
        }

        let run = command.run(files.root(), &targets)?;
        result.files_checked = targets.len();
        result.output = run.output;

        // Tools that do not take file names may touch anything in the set
        let candidates: Vec<RelPath> = if command.pass_filenames() {
            targets
        } else {
            files.paths().cloned().collect()
        };
        for path in candidates {
            if files.refresh(&path)? {
                if locked.contains(&path) {
                    tracing::warn!(path = %path, "External hook modified a file with fatal findings");
                }
                result.findings.push(Finding::warning(&path, "Fixed"));
                result.modified_files.insert(path);
            }
        }

        result.outcome = if !run.success {
            HookOutcome::Fail
        } else if result.modified_files.is_empty() {
            HookOutcome::Pass
        } else {
            HookOutcome::Fixed
        };
        Ok(result)
    }
}

fn lock_fatal(findings: &[Finding], locked: &mut BTreeSet<RelPath>) {
    for finding in findings {
        if finding.kind.is_fatal()
            && let Some(path) = &finding.path
        {
            locked.insert(path.clone());
        }
    }
}
