//! External tool execution
//!
//! Third-party formatters and linters run as child processes in the repository
//! root. They are opaque: the runner only sees their exit status, their output
//! and whatever they changed on disk.

use hookgate_core::{Error, RelPath, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Upper bound on the bytes of one command line
///
/// Stays well below the smallest common `ARG_MAX` (Windows: 32767 UTF-16 units).
const ARG_BUDGET: usize = 30_000;

/// A resolved external command
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
    pass_filenames: bool,
}

/// Outcome of running an external command over all its batches
#[derive(Debug, Clone, Default)]
pub struct ExternalRun {
    /// Every invocation exited with status zero
    pub success: bool,
    /// Combined stdout and stderr of all invocations
    pub output: String,
    /// Number of invocations
    pub invocations: usize,
}

impl ExternalCommand {
    #[must_use]
    pub fn new(program: PathBuf, args: Vec<String>, pass_filenames: bool) -> Self {
        Self {
            program,
            args,
            pass_filenames,
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn pass_filenames(&self) -> bool {
        self.pass_filenames
    }

    /// Split file arguments into batches that fit the argument budget
    ///
    /// There is always at least one batch, so an `always_run` hook with no
    /// matching files still runs once.
    fn batches(&self, files: &[RelPath]) -> Vec<Vec<String>> {
        if !self.pass_filenames || files.is_empty() {
            return vec![Vec::new()];
        }

        let base = self.program.as_os_str().len()
            + self.args.iter().map(|a| a.len() + 1).sum::<usize>();

        let mut batches = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut size = base;

        for file in files {
            let arg = file.to_slash();
            let cost = arg.len() + 1;
            if !current.is_empty() && size + cost > ARG_BUDGET {
                batches.push(std::mem::take(&mut current));
                size = base;
            }
            size += cost;
            current.push(arg);
        }

        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    /// Run the command in `root` over `files`
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started. A non-zero exit
    /// status is not an error; it is reported through [`ExternalRun::success`].
    #[tracing::instrument(skip(self, files), fields(program = %self.program.display(), files = files.len()))]
    pub fn run(&self, root: &Path, files: &[RelPath]) -> Result<ExternalRun> {
        let mut run = ExternalRun {
            success: true,
            ..ExternalRun::default()
        };

        for batch in self.batches(files) {
            let argv: Vec<OsString> = self
                .args
                .iter()
                .chain(batch.iter())
                .map(OsString::from)
                .collect();

            tracing::debug!("Executing {} {:?}", self.program.display(), self.args);

            let output = duct::cmd(&self.program, argv)
                .dir(root)
                .stderr_to_stdout()
                .stdout_capture()
                .unchecked()
                .run()
                .map_err(|e| {
                    Error::HookExecution(format!(
                        "Failed to start '{}': {}",
                        self.program.display(),
                        e
                    ))
                })?;

            run.invocations += 1;
            run.output.push_str(&String::from_utf8_lossy(&output.stdout));
            if !output.status.success() {
                tracing::debug!(status = ?output.status.code(), "Command exited with failure");
                run.success = false;
            }
        }

        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn files(count: usize, len: usize) -> Vec<RelPath> {
        (0..count)
            .map(|i| {
                let name = format!("{i:0>len$}.py");
                RelPath::from_slash(&name).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_single_batch_for_small_input() {
        let cmd = ExternalCommand::new("black".into(), vec!["--quiet".into()], true);
        let batches = cmd.batches(&files(3, 4));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["0000.py", "0001.py", "0002.py"]);
    }

    #[test]
    fn test_batches_respect_budget_and_order() {
        let cmd = ExternalCommand::new("black".into(), Vec::new(), true);
        let input = files(400, 200);
        let batches = cmd.batches(&input);

        assert!(batches.len() > 1);
        for batch in &batches {
            let size: usize = batch.iter().map(|a| a.len() + 1).sum();
            assert!(size <= ARG_BUDGET);
        }
        let flattened: Vec<_> = batches.into_iter().flatten().collect();
        let expected: Vec<_> = input.iter().map(RelPath::to_slash).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_no_filenames_runs_once() {
        let cmd = ExternalCommand::new("mypy".into(), vec![".".into()], false);
        let batches = cmd.batches(&files(5, 3));
        assert_eq!(batches, vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_no_files_still_runs_once() {
        let cmd = ExternalCommand::new("black".into(), Vec::new(), true);
        assert_eq!(cmd.batches(&[]), vec![Vec::<String>::new()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_output_and_status() {
        let temp = tempfile::TempDir::new().unwrap();
        let sh = which::which("sh").unwrap();
        let ok = ExternalCommand::new(
            sh.clone(),
            vec!["-c".into(), "echo out; echo err >&2".into()],
            false,
        );
        let run = ok.run(temp.path(), &[]).unwrap();
        assert!(run.success);
        assert!(run.output.contains("out"));
        assert!(run.output.contains("err"));

        let failing = ExternalCommand::new(sh, vec!["-c".into(), "exit 3".into()], false);
        assert!(!failing.run(temp.path(), &[]).unwrap().success);
    }

    #[test]
    fn test_missing_program_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let cmd = ExternalCommand::new("hookgate-no-such-tool".into(), Vec::new(), false);
        assert!(cmd.run(temp.path(), &[]).is_err());
    }
}
